//! End-to-end runs of the pipeline over scripted sources and a recording
//! destination.

use std::cell::Cell;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::rc::Rc;

use engine::{
    BoxedEntrySource, Destination, Locator, Pipeline, Source, SyncError, SyncMode, SyncOptions,
    sync,
};
use fsentry::{FieldMask, FsEntry, Id, Projection, Statx};
use fsevent::FsEvent;
use pipeline::{Pull, PullSource};

// ============================================================================
// Helper Types
// ============================================================================

/// Replays a fixed script of pull outcomes.
struct Script(VecDeque<Result<Pull<FsEntry>, SyncError>>);

impl Script {
    fn new(steps: impl IntoIterator<Item = Result<Pull<FsEntry>, SyncError>>) -> Self {
        Self(steps.into_iter().collect())
    }

    fn ready(entries: impl IntoIterator<Item = FsEntry>) -> Self {
        Self::new(entries.into_iter().map(|entry| Ok(Pull::Ready(entry))))
    }

    fn boxed<'a>(self) -> BoxedEntrySource<'a> {
        Box::new(self)
    }
}

impl PullSource for Script {
    type Item = FsEntry;
    type Error = SyncError;

    fn pull(&mut self) -> Result<Pull<FsEntry>, SyncError> {
        self.0.pop_front().unwrap_or(Ok(Pull::Exhausted))
    }
}

/// Counts the pulls made on a [`Script`].
struct Counted {
    script: Script,
    pulls: Rc<Cell<usize>>,
}

impl PullSource for Counted {
    type Item = FsEntry;
    type Error = SyncError;

    fn pull(&mut self) -> Result<Pull<FsEntry>, SyncError> {
        self.pulls.set(self.pulls.get() + 1);
        self.script.pull()
    }
}

/// Reads one event of each batch, then rejects it.
struct Rejecting;

impl Destination for Rejecting {
    fn name(&self) -> &str {
        "rejecting"
    }

    fn update(&mut self, events: &mut dyn Iterator<Item = Rc<FsEvent>>) -> Result<usize, SyncError> {
        let _ = events.next();
        Err(SyncError::backend("rejecting", "constraint violated"))
    }
}

/// Keeps every batch it is handed.
#[derive(Default)]
struct Recorder {
    batches: Vec<Vec<FsEvent>>,
}

impl Recorder {
    fn events(&self) -> Vec<FsEvent> {
        self.batches.concat()
    }
}

impl Destination for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn update(&mut self, events: &mut dyn Iterator<Item = Rc<FsEvent>>) -> Result<usize, SyncError> {
        let batch: Vec<FsEvent> = events.map(|event| (*event).clone()).collect();
        let applied = batch.len();
        self.batches.push(batch);
        Ok(applied)
    }
}

/// A flat list of entries resolvable by identifier.
struct Listing(Vec<FsEntry>);

impl Source for Listing {
    fn name(&self) -> &str {
        "listing"
    }

    fn entries(&self, _projection: &Projection) -> Result<BoxedEntrySource<'_>, SyncError> {
        Ok(Script::ready(self.0.clone()).boxed())
    }

    fn branch(
        &self,
        at: &Locator,
        projection: &Projection,
    ) -> Result<BoxedEntrySource<'_>, SyncError> {
        let root = self.root(at, projection)?;
        Ok(Script::ready([root]).boxed())
    }

    fn root(&self, at: &Locator, _projection: &Projection) -> Result<FsEntry, SyncError> {
        let Locator::Id(wanted) = at else {
            return Err(SyncError::NotFound(at.clone()));
        };
        self.0
            .iter()
            .find(|entry| entry.id.as_ref() == Some(wanted))
            .cloned()
            .ok_or_else(|| SyncError::NotFound(at.clone()))
    }
}

fn capacity(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).expect("non-zero capacity")
}

fn link(id: u64, parent: u64, name: &str) -> FsEntry {
    FsEntry::new(id).with_parent(parent, name)
}

fn run(script: Script, projection: Projection, size: usize) -> (Result<engine::SyncStats, SyncError>, Recorder) {
    let mut recorder = Recorder::default();
    let outcome = Pipeline::new(script.boxed(), projection, capacity(size), &mut recorder).run();
    (outcome, recorder)
}

// ============================================================================
// Conversion Scenarios
// ============================================================================

#[test]
fn default_projection_scenario() {
    let script = Script::ready([
        FsEntry::new(1_u64)
            .with_parent(0_u64, "a")
            .with_statx(Statx::new().with_size(10)),
        FsEntry::new(2_u64),
    ]);

    let (outcome, recorder) = run(script, Projection::default(), 4096);
    let stats = outcome.expect("clean end");

    assert_eq!(
        recorder.batches,
        vec![vec![
            FsEvent::Upsert {
                id: Id::from(1_u64),
                statx: Some(Statx::new().with_size(10)),
                symlink: None,
                xattrs: None,
            },
            FsEvent::Link {
                id: Id::from(1_u64),
                parent_id: Id::from(0_u64),
                name: "a".to_owned(),
                xattrs: None,
            },
        ]]
    );
    assert_eq!(stats.converted, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.submitted, 2);
    assert_eq!(stats.applied, 2);
}

#[test]
fn transient_stalls_are_invisible() {
    let script = Script::new([
        Ok(Pull::Retry),
        Ok(Pull::Retry),
        Ok(Pull::Retry),
        Ok(Pull::Ready(link(5, 0, "e"))),
        Ok(Pull::Exhausted),
    ]);

    let (outcome, recorder) = run(script, Projection::default(), 8);
    let stats = outcome.expect("clean end");

    assert_eq!(recorder.batches.len(), 1);
    assert_eq!(recorder.events().len(), 1);
    assert_eq!(stats.retries, 3);
}

#[test]
fn entries_without_id_are_skipped_not_fatal() {
    let script = Script::ready([
        FsEntry::default().with_symlink("dangling"),
        link(1, 0, "a"),
    ]);

    let (outcome, recorder) = run(script, Projection::default(), 8);

    assert_eq!(outcome.expect("clean end").skipped, 1);
    assert_eq!(recorder.events().len(), 1);
}

#[test]
fn projection_limits_what_is_delivered() {
    let script = Script::ready([FsEntry::new(1_u64)
        .with_parent(0_u64, "a")
        .with_statx(Statx::new().with_size(10))
        .with_symlink("t")]);
    let projection = Projection::of(FieldMask::ID | FieldMask::PARENT_ID | FieldMask::NAME);

    let (outcome, recorder) = run(script, projection, 8);

    assert_eq!(outcome.expect("clean end").upserts, 0);
    assert!(recorder.events().iter().all(FsEvent::is_link));
}

// ============================================================================
// Batching
// ============================================================================

#[test]
fn exactly_capacity_events_make_one_batch() {
    let script = Script::ready([link(1, 0, "a"), link(2, 0, "b"), link(3, 0, "c")]);

    let (outcome, recorder) = run(script, Projection::default(), 3);

    assert_eq!(outcome.expect("clean end").batches, 1);
    assert_eq!(recorder.batches.len(), 1);
    assert_eq!(recorder.batches[0].len(), 3);
}

#[test]
fn batches_respect_capacity_and_order() {
    let script = Script::ready((1..=7).map(|n| link(n, 0, &format!("f{n}"))));

    let (outcome, recorder) = run(script, Projection::default(), 3);
    let stats = outcome.expect("clean end");

    let sizes: Vec<usize> = recorder.batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, [3, 3, 1]);
    let ids: Vec<Id> = recorder.events().iter().map(|event| event.id().clone()).collect();
    assert_eq!(ids, (1_u64..=7).map(Id::from).collect::<Vec<_>>());
    assert_eq!(stats.batches, 3);
}

#[test]
fn empty_source_commits_nothing() {
    let (outcome, recorder) = run(Script::ready([]), Projection::default(), 3);

    assert_eq!(outcome.expect("clean end").batches, 0);
    assert!(recorder.batches.is_empty());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn source_failure_aborts_after_committed_batches() {
    let script = Script::new([
        Ok(Pull::Ready(link(1, 0, "a"))),
        Ok(Pull::Ready(link(2, 0, "b"))),
        Ok(Pull::Ready(link(3, 0, "c"))),
        Err(SyncError::backend("script", "connection lost")),
        Ok(Pull::Ready(link(4, 0, "d"))),
    ]);

    let (outcome, recorder) = run(script, Projection::default(), 2);
    let error = outcome.expect_err("failure surfaces");

    assert!(error.is_backend());
    assert_eq!(error.to_string(), "script: connection lost");
    assert_eq!(recorder.batches[0].len(), 2);
    assert!(recorder.events().iter().all(|event| *event.id() != Id::from(4_u64)));
}

#[test]
fn store_failure_mid_batch_stops_the_run() {
    let pulls = Rc::new(Cell::new(0));
    let source = Counted {
        script: Script::ready((1..=5).map(|n| link(n, 0, &format!("f{n}")))),
        pulls: Rc::clone(&pulls),
    };
    let mut destination = Rejecting;

    let outcome = Pipeline::new(Box::new(source), Projection::default(), capacity(2), &mut destination).run();
    let error = outcome.expect_err("store failure surfaces");

    assert!(error.is_backend());
    assert_eq!(error.to_string(), "rejecting: constraint violated");
    assert_eq!(pulls.get(), 2);
}

#[test]
fn overlong_symlink_is_a_generic_failure() {
    let script = Script::ready([FsEntry::new(1_u64).with_symlink("x".repeat(fsentry::SYMLINK_MAX + 1))]);

    let (outcome, _) = run(script, Projection::default(), 8);

    assert!(matches!(outcome, Err(SyncError::Projection(_))));
}

// ============================================================================
// Modes
// ============================================================================

#[test]
fn single_root_mode_reads_one_entry() {
    let listing = Listing(vec![link(1, 0, "a"), link(2, 1, "b"), link(3, 1, "c")]);
    let mut recorder = Recorder::default();
    let options = SyncOptions::default().with_mode(SyncMode::One(Locator::Id(Id::from(2_u64))));

    let stats = sync(&listing, &mut recorder, &options).expect("clean end");

    assert_eq!(stats.links, 1);
    assert_eq!(recorder.events()[0].id(), &Id::from(2_u64));
}

#[test]
fn unresolvable_root_fails_before_any_batch() {
    let listing = Listing(vec![link(1, 0, "a")]);
    let mut recorder = Recorder::default();
    let options = SyncOptions::default().with_mode(SyncMode::One(Locator::Id(Id::from(9_u64))));

    let error = sync(&listing, &mut recorder, &options).expect_err("not found");

    assert!(matches!(error, SyncError::NotFound(_)));
    assert!(recorder.batches.is_empty());
}

#[test]
fn tree_mode_reads_everything() {
    let listing = Listing(vec![link(1, 0, "a"), link(2, 1, "b")]);
    let mut recorder = Recorder::default();

    let stats = sync(&listing, &mut recorder, &SyncOptions::default()).expect("clean end");

    assert_eq!(stats.links, 2);
}
