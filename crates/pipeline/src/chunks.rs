//! crates/pipeline/src/chunks.rs
//! Fixed-capacity batching over a fallible stream.

use std::fmt;
use std::num::NonZeroUsize;

use logging::trace_chunk;

/// Default number of elements per chunk, sized to stay below the bulk limits
/// of common metadata stores.
pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = match NonZeroUsize::new(1 << 12) {
    Some(size) => size,
    None => panic!("chunk size must be non-zero"),
};

/// Splits a stream of `Result<T, E>` into consecutive [`Chunk`]s.
///
/// One element is pulled ahead before a chunk is handed out, which is what
/// lets [`next_chunk`](Self::next_chunk) report end-of-stream instead of an
/// empty trailing chunk.
pub struct Chunks<I, T, E>
where
    I: Iterator<Item = Result<T, E>>,
{
    iter: I,
    size: NonZeroUsize,
    peeked: Option<T>,
    skip: usize,
    exhausted: bool,
    produced: u64,
}

impl<I, T, E> Chunks<I, T, E>
where
    I: Iterator<Item = Result<T, E>>,
{
    /// Creates a batcher yielding chunks of at most `size` elements.
    #[must_use]
    pub fn new(iter: I, size: NonZeroUsize) -> Self {
        Self {
            iter,
            size,
            peeked: None,
            skip: 0,
            exhausted: false,
            produced: 0,
        }
    }

    /// Configured chunk capacity.
    #[must_use]
    pub const fn size(&self) -> NonZeroUsize {
        self.size
    }

    /// Number of chunks handed out so far.
    #[must_use]
    pub const fn produced(&self) -> u64 {
        self.produced
    }

    /// Borrows the upstream stream.
    #[must_use]
    pub const fn get_ref(&self) -> &I {
        &self.iter
    }

    /// Returns the next chunk.
    ///
    /// `Ok(None)` means upstream is cleanly exhausted, now and for every later
    /// call. An `Err` is either a failure hit while looking ahead or one met
    /// while skipping what a dropped chunk left unconsumed.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk<'_, I, T, E>>, E> {
        self.skip_remainder()?;
        if self.peeked.is_none() {
            if self.exhausted {
                return Ok(None);
            }
            match self.iter.next() {
                None => {
                    self.exhausted = true;
                    return Ok(None);
                }
                Some(Err(error)) => {
                    self.exhausted = true;
                    return Err(error);
                }
                Some(Ok(item)) => self.peeked = Some(item),
            }
        }

        self.produced += 1;
        trace_chunk!(chunk = self.produced, capacity = self.size.get(), "starting chunk");
        let remaining = self.size.get();
        Ok(Some(Chunk {
            parent: self,
            remaining,
            yielded: 0,
        }))
    }
}

impl<I, T, E> Chunks<I, T, E>
where
    I: Iterator<Item = Result<T, E>>,
{
    /// Pulls and discards the elements a dropped chunk did not consume.
    fn skip_remainder(&mut self) -> Result<(), E> {
        let skip = std::mem::take(&mut self.skip);
        if skip == 0 || self.exhausted {
            return Ok(());
        }
        trace_chunk!(debug: skip, "skipping unconsumed chunk remainder");
        for _ in 0..skip {
            match self.iter.next() {
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    self.exhausted = true;
                    return Err(error);
                }
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }
        Ok(())
    }
}

impl<I, T, E> fmt::Debug for Chunks<I, T, E>
where
    I: Iterator<Item = Result<T, E>>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunks")
            .field("size", &self.size)
            .field("peeked", &self.peeked.is_some())
            .field("skip", &self.skip)
            .field("exhausted", &self.exhausted)
            .field("produced", &self.produced)
            .finish_non_exhaustive()
    }
}

/// A bounded, lazily consumed slice of the upstream stream.
///
/// The chunk stops after its capacity is reached, at upstream exhaustion, or
/// right after yielding an upstream error. Dropping it early pulls nothing:
/// the unconsumed remainder is skipped by the next
/// [`next_chunk`](Chunks::next_chunk) call.
pub struct Chunk<'a, I, T, E>
where
    I: Iterator<Item = Result<T, E>>,
{
    parent: &'a mut Chunks<I, T, E>,
    remaining: usize,
    yielded: usize,
}

impl<I, T, E> Chunk<'_, I, T, E>
where
    I: Iterator<Item = Result<T, E>>,
{
    /// Number of elements yielded by this chunk so far.
    #[must_use]
    pub const fn yielded(&self) -> usize {
        self.yielded
    }
}

impl<I, T, E> Iterator for Chunk<'_, I, T, E>
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let next = match self.parent.peeked.take() {
            Some(item) => Some(Ok(item)),
            None if self.parent.exhausted => None,
            None => self.parent.iter.next(),
        };

        match next {
            Some(Ok(item)) => {
                self.remaining -= 1;
                self.yielded += 1;
                Some(Ok(item))
            }
            Some(Err(error)) => {
                self.parent.exhausted = true;
                self.remaining = 0;
                Some(Err(error))
            }
            None => {
                self.parent.exhausted = true;
                self.remaining = 0;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let lower = usize::from(self.parent.peeked.is_some());
        (lower, Some(self.remaining))
    }
}

impl<I, T, E> Drop for Chunk<'_, I, T, E>
where
    I: Iterator<Item = Result<T, E>>,
{
    fn drop(&mut self) {
        if self.remaining == 0 || self.parent.exhausted {
            return;
        }
        let mut remaining = self.remaining;
        if self.parent.peeked.take().is_some() {
            remaining -= 1;
        }
        self.parent.skip = remaining;
        trace_chunk!(remaining, "deferred unconsumed chunk remainder");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).expect("non-zero")
    }

    fn ok_stream(n: u32) -> impl Iterator<Item = Result<u32, String>> {
        (0..n).map(Ok)
    }

    fn collect_chunks<I>(chunks: &mut Chunks<I, u32, String>) -> Result<Vec<Vec<u32>>, String>
    where
        I: Iterator<Item = Result<u32, String>>,
    {
        let mut out = Vec::new();
        while let Some(chunk) = chunks.next_chunk()? {
            out.push(chunk.collect::<Result<Vec<_>, _>>()?);
        }
        Ok(out)
    }

    #[test]
    fn splits_into_bounded_chunks() {
        let mut chunks = Chunks::new(ok_stream(7), size(3));
        let batches = collect_chunks(&mut chunks).expect("no errors");

        assert_eq!(batches, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]);
        assert_eq!(chunks.produced(), 3);
    }

    #[test]
    fn exact_multiple_has_no_trailing_chunk() {
        let mut chunks = Chunks::new(ok_stream(4), size(4));
        let batches = collect_chunks(&mut chunks).expect("no errors");

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 4);
    }

    #[test]
    fn empty_stream_yields_no_chunk() {
        let mut chunks = Chunks::new(ok_stream(0), size(4));

        assert!(chunks.next_chunk().expect("clean end").is_none());
        assert!(chunks.next_chunk().expect("still clean").is_none());
    }

    #[test]
    fn lookahead_error_is_reported_by_next_chunk() {
        let items = vec![Ok(1), Ok(2), Err("boom".to_owned())];
        let mut chunks = Chunks::new(items.into_iter(), size(2));

        let first: Vec<_> = chunks.next_chunk().expect("first").expect("some").collect();
        assert_eq!(first, vec![Ok(1), Ok(2)]);

        let error = chunks.next_chunk().err().expect("lookahead failure");
        assert_eq!(error, "boom");
        assert!(chunks.next_chunk().expect("fused").is_none());
    }

    #[test]
    fn error_inside_a_chunk_ends_it() {
        let items = vec![Ok(1), Err("bad".to_owned()), Ok(3)];
        let mut chunks = Chunks::new(items.into_iter(), size(8));

        let chunk: Vec<_> = chunks.next_chunk().expect("first").expect("some").collect();
        assert_eq!(chunk, vec![Ok(1), Err("bad".to_owned())]);
        assert!(chunks.next_chunk().expect("fused").is_none());
    }

    #[test]
    fn dropping_a_partial_chunk_keeps_boundaries() {
        let mut chunks = Chunks::new(ok_stream(6), size(3));

        {
            let mut chunk = chunks.next_chunk().expect("first").expect("some");
            assert_eq!(chunk.next(), Some(Ok(0)));
        }

        let second: Vec<_> = chunks.next_chunk().expect("second").expect("some").collect();
        assert_eq!(second, vec![Ok(3), Ok(4), Ok(5)]);
    }

    #[test]
    fn error_met_while_draining_is_not_lost() {
        let items = vec![Ok(1), Ok(2), Err("late".to_owned()), Ok(4)];
        let mut chunks = Chunks::new(items.into_iter(), size(4));

        {
            let mut chunk = chunks.next_chunk().expect("first").expect("some");
            assert_eq!(chunk.next(), Some(Ok(1)));
        }

        assert_eq!(chunks.next_chunk().err(), Some("late".to_owned()));
        assert!(chunks.next_chunk().expect("fused").is_none());
    }

    #[test]
    fn dropping_a_chunk_pulls_nothing_until_the_next_chunk() {
        let pulled = std::cell::Cell::new(0_u32);
        let stream = (0..6).map(Ok::<u32, String>).inspect(|_| pulled.set(pulled.get() + 1));
        let mut chunks = Chunks::new(stream, size(3));

        {
            let mut chunk = chunks.next_chunk().expect("first").expect("some");
            assert_eq!(chunk.next(), Some(Ok(0)));
        }
        assert_eq!(pulled.get(), 1);

        let second: Vec<_> = chunks.next_chunk().expect("second").expect("some").collect();
        assert_eq!(second, vec![Ok(3), Ok(4), Ok(5)]);
        assert_eq!(pulled.get(), 6);
    }

    #[test]
    fn dropping_an_untouched_chunk_skips_it_whole() {
        let mut chunks = Chunks::new(ok_stream(5), size(2));

        drop(chunks.next_chunk().expect("first").expect("some"));

        let rest = collect_chunks(&mut chunks).expect("no errors");
        assert_eq!(rest, vec![vec![2, 3], vec![4]]);
    }

    #[test]
    fn chunk_tracks_yielded_count() {
        let mut chunks = Chunks::new(ok_stream(5), size(4));
        let mut chunk = chunks.next_chunk().expect("first").expect("some");

        chunk.next();
        chunk.next();
        assert_eq!(chunk.yielded(), 2);
        assert_eq!(chunk.size_hint(), (0, Some(2)));
    }
}
