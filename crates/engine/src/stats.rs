//! crates/engine/src/stats.rs
//! Counters reported by a run.

use std::fmt;
use std::ops::AddAssign;

/// Outcome of delivering one batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Events in the batch.
    pub submitted: usize,
    /// Events the destination reported as applied.
    pub applied: usize,
    /// Upsert events in the batch.
    pub upserts: usize,
    /// Link events in the batch.
    pub links: usize,
}

/// Totals for a whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Entries that produced at least one event.
    pub converted: u64,
    /// Entries that produced none.
    pub skipped: u64,
    /// Batches delivered.
    pub batches: u64,
    /// Events handed to the destination.
    pub submitted: u64,
    /// Events the destination reported as applied.
    pub applied: u64,
    /// Upsert events delivered.
    pub upserts: u64,
    /// Link events delivered.
    pub links: u64,
    /// Transient stalls absorbed while reading the source.
    pub retries: u64,
}

impl AddAssign<CommitReport> for SyncStats {
    fn add_assign(&mut self, report: CommitReport) {
        self.batches += 1;
        self.submitted += report.submitted as u64;
        self.applied += report.applied as u64;
        self.upserts += report.upserts as u64;
        self.links += report.links as u64;
    }
}

impl fmt::Display for SyncStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries converted, {} skipped, {} events in {} batches ({} upserts, {} links), {} applied, {} retries",
            self.converted,
            self.skipped,
            self.submitted,
            self.batches,
            self.upserts,
            self.links,
            self.applied,
            self.retries,
        )
    }
}
