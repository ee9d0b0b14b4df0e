#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `fsevent` turns projected entries into the change events a destination
//! store applies: [`FsEvent::Upsert`] for content and [`FsEvent::Link`] for
//! the namespace position of an object.
//!
//! # Design
//!
//! [`Converter`] is a small state machine (`idle`, `upserting`, `linking`,
//! `done`) wrapped around a fallible entry iterator. Both events of an
//! entry are built when the entry is classified, so the converter never
//! holds more than one entry's worth of output.
//!
//! # Invariants
//!
//! - At most one upsert and one link per entry, upsert first.
//! - Events keep the order of the entries they came from.
//! - Entries without an identifier are skipped with a warning on the
//!   `rbh::convert` target and never surface as errors.
//!
//! # Examples
//!
//! ```
//! use fsentry::{FsEntry, Statx};
//! use fsevent::Converter;
//!
//! let entries = vec![
//!     Ok::<_, std::convert::Infallible>(
//!         FsEntry::new(1_u64).with_parent(0_u64, "a").with_statx(Statx::new().with_size(10)),
//!     ),
//!     Ok(FsEntry::new(2_u64)),
//! ];
//! let kinds: Vec<_> = Converter::new(entries.into_iter())
//!     .map(|event| event.unwrap().kind())
//!     .collect();
//! assert_eq!(kinds, ["upsert", "link"]);
//! ```

mod convert;
mod event;

pub use crate::convert::{ConvertStats, Converter};
pub use crate::event::FsEvent;
