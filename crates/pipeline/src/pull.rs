//! crates/pipeline/src/pull.rs
//! Pull-based sources and the blocking adapter that hides transient stalls.

use logging::trace_source;

/// Outcome of a single pull from a [`PullSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pull<T> {
    /// An element is available.
    Ready(T),
    /// No data yet; the same pull should be attempted again.
    Retry,
    /// The source has no more elements.
    Exhausted,
}

/// A producer that can stall transiently.
///
/// Unlike [`Iterator`], a pull may report [`Pull::Retry`] when the source has
/// nothing to hand out *yet*. Hard failures travel through the `Err` side and
/// are terminal.
pub trait PullSource {
    /// Element type produced by the source.
    type Item;
    /// Error type for hard failures.
    type Error;

    /// Attempts to produce the next element.
    fn pull(&mut self) -> Result<Pull<Self::Item>, Self::Error>;
}

impl<S> PullSource for Box<S>
where
    S: PullSource + ?Sized,
{
    type Item = S::Item;
    type Error = S::Error;

    fn pull(&mut self) -> Result<Pull<Self::Item>, Self::Error> {
        (**self).pull()
    }
}

/// Iterator over a [`PullSource`] that retries transient stalls internally.
///
/// Retries are unbounded: a stalled source stalls the caller. After the source
/// reports exhaustion or a hard failure, the adapter is fused and no longer
/// pulls.
#[derive(Debug)]
pub struct Blocking<S> {
    source: S,
    retries: u64,
    done: bool,
}

impl<S> Blocking<S> {
    /// Wraps `source`.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            retries: 0,
            done: false,
        }
    }

    /// Number of transient stalls absorbed so far.
    #[must_use]
    pub const fn retries(&self) -> u64 {
        self.retries
    }

    /// Borrows the wrapped source.
    #[must_use]
    pub const fn get_ref(&self) -> &S {
        &self.source
    }

    /// Consumes the adapter and returns the wrapped source.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S> Iterator for Blocking<S>
where
    S: PullSource,
{
    type Item = Result<S::Item, S::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.source.pull() {
                Ok(Pull::Ready(item)) => return Some(Ok(item)),
                Ok(Pull::Retry) => {
                    self.retries += 1;
                    trace_source!(retries = self.retries, "source not ready, retrying");
                }
                Ok(Pull::Exhausted) => {
                    self.done = true;
                    return None;
                }
                Err(error) => {
                    self.done = true;
                    return Some(Err(error));
                }
            }
        }
    }
}

/// A [`PullSource`] yielding exactly one element, then exhaustion.
#[derive(Debug)]
pub struct Once<T, E> {
    item: Option<T>,
    _error: std::marker::PhantomData<fn() -> E>,
}

impl<T, E> Once<T, E> {
    /// Creates a source that will hand out `item` once.
    #[must_use]
    pub const fn new(item: T) -> Self {
        Self {
            item: Some(item),
            _error: std::marker::PhantomData,
        }
    }
}

impl<T, E> PullSource for Once<T, E> {
    type Item = T;
    type Error = E;

    fn pull(&mut self) -> Result<Pull<T>, E> {
        Ok(self.item.take().map_or(Pull::Exhausted, Pull::Ready))
    }
}
