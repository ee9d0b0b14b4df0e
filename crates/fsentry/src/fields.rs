//! crates/fsentry/src/fields.rs
//! Textual field names and their mapping onto a [`Projection`].
//!
//! Names are resolved through two declarative tables. A top-level name may
//! carry one `.`-separated suffix: an attribute name for `statx`, or an
//! attribute key for `xattrs` and `ns-xattrs`.
//!
//! | name                 | selects                                  |
//! |----------------------|------------------------------------------|
//! | `id`                 | the identifier                           |
//! | `parent-id`, `name`  | the namespace link                       |
//! | `statx[.ATTR]`       | the whole bundle, or one attribute       |
//! | `symlink`            | the link target                          |
//! | `xattrs[.KEY]`       | inode extended attributes, or one key    |
//! | `ns-xattrs[.KEY]`    | namespace extended attributes, or one key|

use thiserror::Error;

use crate::entry::FieldMask;
use crate::projection::{Projection, XattrSelection};
use crate::statx::StatxMask;

/// Top-level field names.
pub const FIELDS: &[(&str, FieldMask)] = &[
    ("id", FieldMask::ID),
    ("parent-id", FieldMask::PARENT_ID),
    ("name", FieldMask::NAME),
    ("statx", FieldMask::STATX),
    ("symlink", FieldMask::SYMLINK),
    ("xattrs", FieldMask::INODE_XATTRS),
    ("ns-xattrs", FieldMask::NAMESPACE_XATTRS),
];

/// Attribute names accepted after `statx.`.
pub const STATX_FIELDS: &[(&str, StatxMask)] = &[
    ("type", StatxMask::TYPE),
    ("mode", StatxMask::MODE),
    ("nlink", StatxMask::NLINK),
    ("uid", StatxMask::UID),
    ("gid", StatxMask::GID),
    ("atime", StatxMask::ATIME),
    ("atime.sec", StatxMask::ATIME_SEC),
    ("atime.nsec", StatxMask::ATIME_NSEC),
    ("btime", StatxMask::BTIME),
    ("btime.sec", StatxMask::BTIME_SEC),
    ("btime.nsec", StatxMask::BTIME_NSEC),
    ("ctime", StatxMask::CTIME),
    ("ctime.sec", StatxMask::CTIME_SEC),
    ("ctime.nsec", StatxMask::CTIME_NSEC),
    ("mtime", StatxMask::MTIME),
    ("mtime.sec", StatxMask::MTIME_SEC),
    ("mtime.nsec", StatxMask::MTIME_NSEC),
    ("ino", StatxMask::INO),
    ("size", StatxMask::SIZE),
    ("blocks", StatxMask::BLOCKS),
    ("blksize", StatxMask::BLKSIZE),
    ("attributes", StatxMask::ATTRIBUTES),
    ("rdev", StatxMask::RDEV),
    ("rdev.major", StatxMask::RDEV_MAJOR),
    ("rdev.minor", StatxMask::RDEV_MINOR),
    ("dev", StatxMask::DEV),
    ("dev.major", StatxMask::DEV_MAJOR),
    ("dev.minor", StatxMask::DEV_MINOR),
    ("mount-id", StatxMask::MNT_ID),
];

/// A parsed field name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldSelector {
    /// A whole top-level field.
    Field(FieldMask),
    /// Some attributes of the `statx` bundle.
    Statx(StatxMask),
    /// One key of an extended attribute map.
    Xattr {
        /// [`FieldMask::INODE_XATTRS`] or [`FieldMask::NAMESPACE_XATTRS`].
        field: FieldMask,
        /// Attribute key.
        key: String,
    },
}

/// Failure to parse a field name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldParseError {
    /// The top-level name is not in [`FIELDS`].
    #[error("unknown field '{0}'")]
    UnknownField(String),
    /// The attribute name is not in [`STATX_FIELDS`].
    #[error("unknown statx attribute '{0}'")]
    UnknownStatxField(String),
    /// A suffix was given to a field that has no sub-fields.
    #[error("field '{0}' has no sub-fields")]
    NoSubfields(String),
    /// An extended attribute selector ended with an empty key.
    #[error("empty extended attribute key in '{0}'")]
    EmptyXattrKey(String),
}

fn lookup<T: Copy>(table: &[(&str, T)], name: &str) -> Option<T> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|&(_, value)| value)
}

/// Parses one field name.
pub fn parse_field(text: &str) -> Result<FieldSelector, FieldParseError> {
    let (head, suffix) = match text.split_once('.') {
        Some((head, suffix)) => (head, Some(suffix)),
        None => (text, None),
    };
    let field = lookup(FIELDS, head).ok_or_else(|| FieldParseError::UnknownField(text.to_owned()))?;

    let Some(suffix) = suffix else {
        return Ok(FieldSelector::Field(field));
    };

    if field == FieldMask::STATX {
        lookup(STATX_FIELDS, suffix)
            .map(FieldSelector::Statx)
            .ok_or_else(|| FieldParseError::UnknownStatxField(suffix.to_owned()))
    } else if field == FieldMask::INODE_XATTRS || field == FieldMask::NAMESPACE_XATTRS {
        if suffix.is_empty() {
            return Err(FieldParseError::EmptyXattrKey(text.to_owned()));
        }
        Ok(FieldSelector::Xattr {
            field,
            key: suffix.to_owned(),
        })
    } else {
        Err(FieldParseError::NoSubfields(head.to_owned()))
    }
}

impl Projection {
    fn selection_mut(&mut self, field: FieldMask) -> Option<&mut XattrSelection> {
        if field == FieldMask::INODE_XATTRS {
            Some(&mut self.inode_xattrs)
        } else if field == FieldMask::NAMESPACE_XATTRS {
            Some(&mut self.ns_xattrs)
        } else {
            None
        }
    }

    /// Starts requesting what `selector` names.
    pub fn add(&mut self, selector: &FieldSelector) {
        match selector {
            FieldSelector::Field(field) => {
                self.fields |= *field;
                if *field == FieldMask::STATX {
                    self.statx |= StatxMask::ALL;
                } else if let Some(selection) = self.selection_mut(*field) {
                    *selection = XattrSelection::All;
                }
            }
            FieldSelector::Statx(mask) => {
                self.fields |= FieldMask::STATX;
                self.statx |= *mask;
            }
            FieldSelector::Xattr { field, key } => {
                let requested = self.fields.contains(*field);
                if let Some(selection) = self.selection_mut(*field) {
                    if !requested {
                        *selection = XattrSelection::none();
                    }
                    selection.include(key);
                }
                self.fields |= *field;
            }
        }
    }

    /// Stops requesting what `selector` names.
    ///
    /// A field whose last sub-field is removed stops being requested.
    pub fn remove(&mut self, selector: &FieldSelector) {
        match selector {
            FieldSelector::Field(field) => {
                self.fields.remove(*field);
                if *field == FieldMask::STATX {
                    self.statx = StatxMask::empty();
                } else if let Some(selection) = self.selection_mut(*field) {
                    *selection = XattrSelection::none();
                }
            }
            FieldSelector::Statx(mask) => {
                self.statx.remove(*mask);
                if self.statx.is_empty() {
                    self.fields.remove(FieldMask::STATX);
                }
            }
            FieldSelector::Xattr { field, key } => {
                let exhausted = self.selection_mut(*field).is_some_and(|selection| {
                    selection.exclude(key);
                    selection.is_none()
                });
                if exhausted {
                    self.fields.remove(*field);
                }
            }
        }
    }
}
