//! crates/engine/src/options.rs
//! Run configuration.

use std::num::NonZeroUsize;

use fsentry::Projection;
use pipeline::DEFAULT_CHUNK_SIZE;

use crate::mode::SyncMode;

/// Knobs of one sync run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncOptions {
    /// Fields copied from source to destination.
    pub projection: Projection,
    /// Upper bound on events per destination update.
    pub chunk_size: NonZeroUsize,
    /// Which source entries are read.
    pub mode: SyncMode,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            projection: Projection::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            mode: SyncMode::Tree,
        }
    }
}

impl SyncOptions {
    /// Replaces the projection.
    #[must_use]
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Replaces the batch capacity.
    #[must_use]
    pub const fn with_chunk_size(mut self, chunk_size: NonZeroUsize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Replaces the traversal mode.
    #[must_use]
    pub fn with_mode(mut self, mode: SyncMode) -> Self {
        self.mode = mode;
        self
    }
}
