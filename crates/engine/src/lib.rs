#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `engine` runs one synchronisation: it reads entries from a [`Source`],
//! narrows and converts them into events, and commits those events to a
//! [`Destination`] in bounded batches.
//!
//! # Design
//!
//! - [`Pipeline`] owns the whole stage chain: a blocking adapter over the
//!   source, the field projector, the event converter and the batcher. It
//!   borrows the destination for its lifetime.
//! - [`commit`] delivers one batch through an error trap and a tee, so the
//!   destination reads plain events while the engine accounts for every one
//!   of them and still sees upstream failures.
//! - [`SyncMode`] chooses between the whole tree, a branch and a single
//!   entry; single-entry runs wrap the entry in a one-shot source.
//!
//! # Errors
//!
//! Every failure is a [`SyncError`]. Store diagnostics travel verbatim in
//! [`SyncError::Backend`]; [`SyncError::exit_code`] maps errors onto process
//! exit statuses.
//!
//! # Examples
//!
//! ```
//! use std::rc::Rc;
//!
//! use engine::{BoxedEntrySource, Destination, Pipeline, SyncError};
//! use fsentry::{FsEntry, Projection};
//! use fsevent::FsEvent;
//! use pipeline::{DEFAULT_CHUNK_SIZE, Once};
//!
//! #[derive(Default)]
//! struct Collect(Vec<FsEvent>);
//!
//! impl Destination for Collect {
//!     fn name(&self) -> &str {
//!         "collect"
//!     }
//!
//!     fn update(&mut self, events: &mut dyn Iterator<Item = Rc<FsEvent>>) -> Result<usize, SyncError> {
//!         let before = self.0.len();
//!         self.0.extend(events.map(|event| (*event).clone()));
//!         Ok(self.0.len() - before)
//!     }
//! }
//!
//! let entry = FsEntry::new(1_u64).with_parent(0_u64, "a");
//! let source: BoxedEntrySource<'_> = Box::new(Once::<_, SyncError>::new(entry));
//! let mut sink = Collect::default();
//!
//! let stats = Pipeline::new(source, Projection::default(), DEFAULT_CHUNK_SIZE, &mut sink)
//!     .run()
//!     .unwrap();
//! assert_eq!(stats.links, 1);
//! assert!(sink.0[0].is_link());
//! ```

mod commit;
mod error;
mod mode;
mod options;
mod stats;
mod store;
mod sync;

pub use crate::commit::commit;
pub use crate::error::{EXIT_FAILURE, EXIT_OK, EXIT_USAGE, SyncError, SyncResult};
pub use crate::mode::{Locator, SyncMode};
pub use crate::options::SyncOptions;
pub use crate::stats::{CommitReport, SyncStats};
pub use crate::store::{BoxedEntrySource, Destination, Source};
pub use crate::sync::{Pipeline, sync};
