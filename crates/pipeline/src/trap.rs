//! crates/pipeline/src/trap.rs
//! Adapter that separates the error channel from a fallible stream.

/// Yields the `Ok` values of a fallible stream and stops at the first error,
/// which is parked in a caller-owned slot.
///
/// Consumers that only understand plain elements (such as a destination
/// store) can read the stream; the owner of the slot checks it afterwards to
/// tell a clean end from an upstream failure.
#[derive(Debug)]
pub struct Trap<'a, I, E> {
    inner: I,
    slot: &'a mut Option<E>,
}

impl<'a, I, E> Trap<'a, I, E> {
    /// Wraps `inner`, parking its first error in `slot`.
    pub fn new(inner: I, slot: &'a mut Option<E>) -> Self {
        Self { inner, slot }
    }
}

impl<I, T, E> Iterator for Trap<'_, I, E>
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.slot.is_some() {
            return None;
        }
        match self.inner.next()? {
            Ok(item) => Some(item),
            Err(error) => {
                *self.slot = Some(error);
                None
            }
        }
    }
}
