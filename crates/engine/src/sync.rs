//! crates/engine/src/sync.rs
//! The orchestrator owning the stage chain of one run.

use std::fmt;
use std::num::NonZeroUsize;

use fsentry::{FsEntry, Projected, Projection, Projector};
use fsevent::{ConvertStats, Converter, FsEvent};
use logging::trace_sync;
use pipeline::{Blocking, Chunks, Once};

use crate::commit::commit;
use crate::error::SyncError;
use crate::mode::SyncMode;
use crate::options::SyncOptions;
use crate::stats::SyncStats;
use crate::store::{BoxedEntrySource, Destination, Source};

type Events<'a> = Converter<Projected<Blocking<BoxedEntrySource<'a>>>>;

/// Source → projector → converter → batcher, plus the destination batches
/// are committed to.
///
/// Dropping a pipeline at any point releases every stage and whatever they
/// buffer.
pub struct Pipeline<'a> {
    chunks: Chunks<Events<'a>, FsEvent, SyncError>,
    destination: &'a mut dyn Destination,
}

impl<'a> Pipeline<'a> {
    /// Assembles the stages over an already opened entry source.
    pub fn new(
        entries: BoxedEntrySource<'a>,
        projection: Projection,
        chunk_size: NonZeroUsize,
        destination: &'a mut dyn Destination,
    ) -> Self {
        let projected = Projected::new(Blocking::new(entries), Projector::new(projection));
        Self {
            chunks: Chunks::new(Converter::new(projected), chunk_size),
            destination,
        }
    }

    /// Opens `source` according to `options.mode` and assembles the stages.
    pub fn open(
        source: &'a dyn Source,
        destination: &'a mut dyn Destination,
        options: &SyncOptions,
    ) -> Result<Self, SyncError> {
        let projection = &options.projection;
        let entries: BoxedEntrySource<'a> = match &options.mode {
            SyncMode::Tree => source.entries(projection)?,
            SyncMode::Branch(at) => source.branch(at, projection)?,
            SyncMode::One(at) => {
                let root = source.root(at, projection)?;
                Box::new(Once::<FsEntry, SyncError>::new(root))
            }
        };
        trace_sync!(
            debug: source = source.name(),
            destination = destination.name(),
            mode = %options.mode,
            chunk_size = options.chunk_size.get(),
            "pipeline assembled"
        );
        Ok(Self::new(
            entries,
            options.projection.clone(),
            options.chunk_size,
            destination,
        ))
    }

    /// Conversion counters so far.
    pub fn convert_stats(&self) -> ConvertStats {
        self.chunks.get_ref().stats()
    }

    /// Commits batches until the source is exhausted.
    pub fn run(mut self) -> Result<SyncStats, SyncError> {
        let mut stats = SyncStats::default();
        while let Some(chunk) = self.chunks.next_chunk()? {
            stats += commit(chunk, &mut *self.destination)?;
        }

        let converted = self.convert_stats();
        stats.converted = converted.converted;
        stats.skipped = converted.skipped();
        stats.retries = self.chunks.get_ref().get_ref().get_ref().retries();
        trace_sync!(debug: %stats, "source exhausted");
        Ok(stats)
    }
}

impl fmt::Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("destination", &self.destination.name())
            .field("chunk_size", &self.chunks.size())
            .field("batches", &self.chunks.produced())
            .finish_non_exhaustive()
    }
}

/// Copies `source` into `destination` as `options` describe.
pub fn sync(
    source: &dyn Source,
    destination: &mut dyn Destination,
    options: &SyncOptions,
) -> Result<SyncStats, SyncError> {
    Pipeline::open(source, destination, options)?.run()
}
