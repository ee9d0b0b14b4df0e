//! crates/fsevent/src/event.rs
//! Change events delivered to a destination store.

use fsentry::{Id, Statx, Xattrs};

/// One change to apply to a destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FsEvent {
    /// The object now has this content.
    Upsert {
        /// Object identifier.
        id: Id,
        /// Attributes to record.
        statx: Option<Statx>,
        /// Symbolic link target.
        symlink: Option<String>,
        /// Inode extended attributes.
        xattrs: Option<Xattrs>,
    },
    /// The object is now named `name` under `parent_id`.
    Link {
        /// Object identifier.
        id: Id,
        /// Identifier of the containing directory.
        parent_id: Id,
        /// Name within the parent.
        name: String,
        /// Namespace extended attributes.
        xattrs: Option<Xattrs>,
    },
}

impl FsEvent {
    /// Identifier of the object the event is about.
    #[must_use]
    pub const fn id(&self) -> &Id {
        match self {
            Self::Upsert { id, .. } | Self::Link { id, .. } => id,
        }
    }

    /// Returns `true` for [`FsEvent::Upsert`].
    #[must_use]
    pub const fn is_upsert(&self) -> bool {
        matches!(self, Self::Upsert { .. })
    }

    /// Returns `true` for [`FsEvent::Link`].
    #[must_use]
    pub const fn is_link(&self) -> bool {
        matches!(self, Self::Link { .. })
    }

    /// Short lowercase kind name used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Upsert { .. } => "upsert",
            Self::Link { .. } => "link",
        }
    }
}
