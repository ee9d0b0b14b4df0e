//! crates/fsentry/src/projection.rs
//! Narrowing entries to a requested subset of their fields.
//!
//! A [`Projection`] names the fields to keep, the attribute sub-mask for
//! the `statx` bundle, and a per-key selection for each extended attribute
//! map. Projecting is a pure move-based transform: the input entry is
//! consumed and the kept values are moved, not copied, whenever possible.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::entry::{FieldMask, FsEntry, Xattrs};
use crate::statx::{Statx, StatxMask};

/// Longest accepted symbolic link target, in bytes.
pub const SYMLINK_MAX: usize = 4096;

/// Failure to project an entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// A symbolic link target exceeds [`SYMLINK_MAX`].
    #[error("symbolic link target is {len} bytes long, the limit is {SYMLINK_MAX}")]
    SymlinkTooLong {
        /// Length of the offending target.
        len: usize,
    },
}

/// Which keys of an extended attribute map to keep.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum XattrSelection {
    /// Every key.
    #[default]
    All,
    /// Only the listed keys.
    Only(BTreeSet<String>),
    /// Every key but the listed ones.
    Except(BTreeSet<String>),
}

impl XattrSelection {
    /// A selection that keeps nothing.
    #[must_use]
    pub fn none() -> Self {
        Self::Only(BTreeSet::new())
    }

    /// Returns `true` when `key` is kept.
    #[must_use]
    pub fn selects(&self, key: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(keys) => keys.contains(key),
            Self::Except(keys) => !keys.contains(key),
        }
    }

    /// Returns `true` when the selection cannot keep any key.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::Only(keys) if keys.is_empty())
    }

    /// Starts keeping `key`.
    pub fn include(&mut self, key: &str) {
        match self {
            Self::All => {}
            Self::Only(keys) => {
                keys.insert(key.to_owned());
            }
            Self::Except(keys) => {
                keys.remove(key);
            }
        }
    }

    /// Stops keeping `key`.
    pub fn exclude(&mut self, key: &str) {
        match self {
            Self::All => *self = Self::Except(BTreeSet::from([key.to_owned()])),
            Self::Only(keys) => {
                keys.remove(key);
            }
            Self::Except(keys) => {
                keys.insert(key.to_owned());
            }
        }
    }

    fn apply(&self, mut xattrs: Xattrs) -> Xattrs {
        if !matches!(self, Self::All) {
            xattrs.retain(|key| self.selects(key));
        }
        xattrs
    }
}

/// Requested field subset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    /// Top-level fields to keep.
    pub fields: FieldMask,
    /// Attributes to keep from the `statx` bundle.
    pub statx: StatxMask,
    /// Keys to keep from the inode extended attributes.
    pub inode_xattrs: XattrSelection,
    /// Keys to keep from the namespace extended attributes.
    pub ns_xattrs: XattrSelection,
}

/// Everything, with the `statx` bundle limited to [`StatxMask::ALL`].
impl Default for Projection {
    fn default() -> Self {
        Self {
            fields: FieldMask::all(),
            statx: StatxMask::ALL,
            inode_xattrs: XattrSelection::All,
            ns_xattrs: XattrSelection::All,
        }
    }
}

impl Projection {
    /// Requests nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            fields: FieldMask::empty(),
            statx: StatxMask::empty(),
            inode_xattrs: XattrSelection::none(),
            ns_xattrs: XattrSelection::none(),
        }
    }

    /// Requests exactly `fields`, with full sub-selections.
    #[must_use]
    pub fn of(fields: FieldMask) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Replaces the `statx` sub-mask.
    #[must_use]
    pub fn with_statx(mut self, statx: StatxMask) -> Self {
        self.statx = statx;
        self
    }

    /// Returns `true` when `field` is requested.
    #[must_use]
    pub fn requests(&self, field: FieldMask) -> bool {
        self.fields.contains(field)
    }
}

/// Applies a [`Projection`] to entries.
#[derive(Clone, Debug, Default)]
pub struct Projector {
    projection: Projection,
}

impl Projector {
    /// Creates a projector for `projection`.
    #[must_use]
    pub const fn new(projection: Projection) -> Self {
        Self { projection }
    }

    /// The projection applied by this projector.
    #[must_use]
    pub const fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Narrows `entry` to the requested fields.
    pub fn project(&self, entry: FsEntry) -> Result<FsEntry, ProjectionError> {
        let wanted = &self.projection;
        let keep = |field| wanted.requests(field);

        let symlink = match entry.symlink {
            Some(target) if keep(FieldMask::SYMLINK) => {
                if target.len() > SYMLINK_MAX {
                    return Err(ProjectionError::SymlinkTooLong { len: target.len() });
                }
                Some(target)
            }
            _ => None,
        };

        Ok(FsEntry {
            id: entry.id.filter(|_| keep(FieldMask::ID)),
            parent_id: entry.parent_id.filter(|_| keep(FieldMask::PARENT_ID)),
            name: entry.name.filter(|_| keep(FieldMask::NAME)),
            statx: entry
                .statx
                .filter(|_| keep(FieldMask::STATX))
                .and_then(|statx| project_statx(statx, wanted.statx)),
            symlink,
            inode_xattrs: entry
                .inode_xattrs
                .filter(|_| keep(FieldMask::INODE_XATTRS))
                .map(|xattrs| wanted.inode_xattrs.apply(xattrs)),
            ns_xattrs: entry
                .ns_xattrs
                .filter(|_| keep(FieldMask::NAMESPACE_XATTRS))
                .map(|xattrs| wanted.ns_xattrs.apply(xattrs)),
        })
    }
}

fn project_statx(statx: Statx, wanted: StatxMask) -> Option<Statx> {
    if wanted.contains(statx.mask()) {
        return Some(statx);
    }
    let restricted = statx.restrict(wanted);
    (!restricted.is_empty()).then_some(restricted)
}

/// Narrows `entry` to `projection`.
pub fn project(entry: FsEntry, projection: &Projection) -> Result<FsEntry, ProjectionError> {
    Projector::new(projection.clone()).project(entry)
}

/// Iterator adapter projecting every entry of a fallible stream.
///
/// Upstream errors pass through untouched; projection errors convert into
/// the stream's error type.
#[derive(Debug)]
pub struct Projected<I> {
    inner: I,
    projector: Projector,
}

impl<I> Projected<I> {
    /// Wraps `inner`.
    pub const fn new(inner: I, projector: Projector) -> Self {
        Self { inner, projector }
    }

    /// Borrows the wrapped stream.
    pub const fn get_ref(&self) -> &I {
        &self.inner
    }
}

impl<I, E> Iterator for Projected<I>
where
    I: Iterator<Item = Result<FsEntry, E>>,
    E: From<ProjectionError>,
{
    type Item = Result<FsEntry, E>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(error) => return Some(Err(error)),
        };
        Some(self.projector.project(entry).map_err(E::from))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
