#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `fsentry` defines the sparse metadata record that flows into rbh-sync:
//! [`FsEntry`], its attribute bundle [`Statx`], and the [`Projection`] that
//! narrows an entry to the fields a run asked for.
//!
//! # Design
//!
//! - Every field of an [`FsEntry`] is an `Option`; [`FieldMask`] is derived
//!   from presence rather than stored.
//! - [`Statx`] guards each attribute with a [`StatxMask`] bit and copies
//!   attributes through a single bit-to-field table, so projection, merging
//!   and restriction share one code path.
//! - [`Projector::project`] consumes its input and moves kept values. A
//!   bundle already inside the requested sub-mask is moved whole.
//! - [`fields`] maps textual field names onto projection edits through
//!   declarative tables.
//!
//! # Invariants
//!
//! - Projecting twice with the same [`Projection`] equals projecting once.
//! - A requested extended attribute map stays present even when every key
//!   was filtered out.
//! - Symbolic link targets longer than [`SYMLINK_MAX`] are rejected, never
//!   truncated.
//!
//! # Examples
//!
//! ```
//! use fsentry::{FieldMask, FsEntry, Projection, Statx, StatxMask, project};
//!
//! let entry = FsEntry::new(1_u64)
//!     .with_parent(0_u64, "a")
//!     .with_statx(Statx::new().with_size(10).with_uid(0));
//!
//! let projection = Projection::of(FieldMask::ID | FieldMask::STATX).with_statx(StatxMask::SIZE);
//! let narrowed = project(entry, &projection).unwrap();
//!
//! assert_eq!(narrowed.mask(), FieldMask::ID | FieldMask::STATX);
//! assert_eq!(narrowed.statx.unwrap().uid(), None);
//! ```

mod entry;
pub mod fields;
mod id;
mod projection;
mod statx;

pub use crate::entry::{FieldMask, FsEntry, Xattrs};
pub use crate::fields::{FieldParseError, FieldSelector, parse_field};
pub use crate::id::{Id, IdParseError};
pub use crate::projection::{
    Projected, Projection, ProjectionError, Projector, SYMLINK_MAX, XattrSelection, project,
};
pub use crate::statx::{S_IFMT, Statx, StatxMask, StatxTimestamp};
