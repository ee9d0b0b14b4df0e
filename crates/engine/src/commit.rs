//! crates/engine/src/commit.rs
//! Delivery of one batch to a destination.

use fsevent::FsEvent;
use logging::trace_commit;
use pipeline::{Trap, tee};

use crate::error::SyncError;
use crate::stats::CommitReport;
use crate::store::Destination;

/// Hands `batch` to `destination` and accounts for every event in it.
///
/// The batch is split in two: one cursor feeds [`Destination::update`], the
/// other is drained afterwards to count and release every event. Failures
/// are ranked: an upstream error in the batch first, then the destination's
/// own error, then events the destination left unread.
pub fn commit<I>(batch: I, destination: &mut dyn Destination) -> Result<CommitReport, SyncError>
where
    I: Iterator<Item = Result<FsEvent, SyncError>>,
{
    let mut upstream = None;
    let (outcome, consumed, report) = {
        let (mut store_side, account_side) = tee(Trap::new(batch, &mut upstream));
        let outcome = destination.update(&mut store_side);
        let consumed = store_side.consumed();
        drop(store_side);

        let mut report = CommitReport::default();
        for event in account_side {
            report.submitted += 1;
            if event.is_upsert() {
                report.upserts += 1;
            } else {
                report.links += 1;
            }
        }
        (outcome, consumed, report)
    };

    if let Some(error) = upstream {
        trace_commit!(warn: submitted = report.submitted, "batch cut short by upstream failure");
        return Err(error);
    }
    let applied = outcome.inspect_err(|error| {
        trace_commit!(warn: backend = destination.name(), %error, "destination rejected batch");
    })?;
    if consumed < report.submitted {
        return Err(SyncError::Incomplete {
            submitted: report.submitted,
            consumed,
        });
    }

    let report = CommitReport { applied, ..report };
    trace_commit!(
        submitted = report.submitted,
        applied = report.applied,
        upserts = report.upserts,
        links = report.links,
        "batch committed"
    );
    Ok(report)
}
