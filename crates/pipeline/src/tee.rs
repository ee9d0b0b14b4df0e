//! crates/pipeline/src/tee.rs
//! Two independent cursors over one stream, sharing a reference-counted buffer.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

struct Shared<I: Iterator> {
    source: I,
    /// Elements pulled by the leading cursor that the lagging one has not seen.
    buffer: VecDeque<Rc<I::Item>>,
    /// Which cursor is ahead while `buffer` is non-empty.
    ahead: Option<usize>,
    alive: [bool; 2],
    exhausted: bool,
}

impl<I: Iterator> Shared<I> {
    fn next_for(&mut self, side: usize) -> Option<Rc<I::Item>> {
        let other = 1 - side;
        if self.ahead == Some(other) {
            if let Some(item) = self.buffer.pop_front() {
                if self.buffer.is_empty() {
                    self.ahead = None;
                }
                return Some(item);
            }
        }

        if self.exhausted {
            return None;
        }
        let Some(item) = self.source.next() else {
            self.exhausted = true;
            return None;
        };

        let item = Rc::new(item);
        if self.alive[other] {
            self.buffer.push_back(Rc::clone(&item));
            self.ahead = Some(side);
        }
        Some(item)
    }

    fn release(&mut self, side: usize) {
        self.alive[side] = false;
        if self.ahead != Some(side) {
            // The departing cursor was lagging: nobody will read the buffer.
            self.buffer.clear();
            self.ahead = None;
        }
    }
}

/// One of the two cursors returned by [`tee`].
///
/// Each element is pulled from the source once and handed to both cursors as
/// an [`Rc`]; it is freed once both cursors have moved past it (or been
/// dropped). Only elements seen by one cursor but not yet by the other are
/// buffered.
pub struct Tee<I: Iterator> {
    shared: Rc<RefCell<Shared<I>>>,
    side: usize,
    consumed: usize,
}

impl<I: Iterator> Tee<I> {
    /// Number of elements this cursor has yielded.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of elements buffered for the lagging cursor.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.shared.borrow().buffer.len()
    }
}

impl<I: Iterator> Iterator for Tee<I> {
    type Item = Rc<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.shared.borrow_mut().next_for(self.side);
        if item.is_some() {
            self.consumed += 1;
        }
        item
    }
}

impl<I: Iterator> Drop for Tee<I> {
    fn drop(&mut self) {
        self.shared.borrow_mut().release(self.side);
    }
}

impl<I: Iterator> fmt::Debug for Tee<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tee")
            .field("side", &self.side)
            .field("consumed", &self.consumed)
            .finish_non_exhaustive()
    }
}

/// Splits `iter` into two cursors that can be consumed at independent rates.
pub fn tee<I: Iterator>(iter: I) -> (Tee<I>, Tee<I>) {
    let shared = Rc::new(RefCell::new(Shared {
        source: iter,
        buffer: VecDeque::new(),
        ahead: None,
        alive: [true, true],
        exhausted: false,
    }));
    let first = Tee {
        shared: Rc::clone(&shared),
        side: 0,
        consumed: 0,
    };
    let second = Tee {
        shared,
        side: 1,
        consumed: 0,
    };
    (first, second)
}
