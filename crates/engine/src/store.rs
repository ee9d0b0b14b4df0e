//! crates/engine/src/store.rs
//! Interfaces a metadata store implements to take part in a run.

use std::rc::Rc;

use fsentry::{FsEntry, Projection};
use fsevent::FsEvent;
use pipeline::PullSource;

use crate::error::SyncError;
use crate::mode::Locator;

/// A type-erased entry source borrowed from a [`Source`].
pub type BoxedEntrySource<'a> = Box<dyn PullSource<Item = FsEntry, Error = SyncError> + 'a>;

/// A store entries are read from.
///
/// The projection is a hint: a store may return more fields than asked,
/// since every entry is projected again before conversion.
pub trait Source {
    /// Backend name used in diagnostics.
    fn name(&self) -> &str;

    /// Every entry of the store.
    fn entries(&self, projection: &Projection) -> Result<BoxedEntrySource<'_>, SyncError>;

    /// The entry at `at` and everything below it, parents before children.
    fn branch(
        &self,
        at: &Locator,
        projection: &Projection,
    ) -> Result<BoxedEntrySource<'_>, SyncError>;

    /// The single entry at `at`.
    fn root(&self, at: &Locator, projection: &Projection) -> Result<FsEntry, SyncError>;
}

/// A store events are applied to.
pub trait Destination {
    /// Backend name used in diagnostics.
    fn name(&self) -> &str;

    /// Applies a batch of events in order and returns how many were applied.
    ///
    /// Implementations are expected to read `events` to the end. Store
    /// failures should be reported as [`SyncError::Backend`].
    fn update(&mut self, events: &mut dyn Iterator<Item = Rc<FsEvent>>) -> Result<usize, SyncError>;
}
