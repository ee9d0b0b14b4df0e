//! crates/backend/src/memory.rs
//! A metadata store held entirely in memory, keyed by identifier.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;

use engine::{BoxedEntrySource, Destination, Locator, Source, SyncError};
use fsentry::{FsEntry, Id, Projection, Statx, Xattrs};
use fsevent::FsEvent;
use logging::trace_backend;
use pipeline::{Pull, PullSource};

/// Adapts an infallible entry iterator to a [`PullSource`].
struct Listing<I> {
    entries: I,
}

impl<I: Iterator<Item = FsEntry>> PullSource for Listing<I> {
    type Item = FsEntry;
    type Error = SyncError;

    fn pull(&mut self) -> Result<Pull<FsEntry>, SyncError> {
        Ok(self.entries.next().map_or(Pull::Exhausted, Pull::Ready))
    }
}

/// Ordered map of entries with merge-on-update semantics.
///
/// Upserts merge attributes field by field, replace the link target and
/// merge inode extended attributes key by key. Links move the entry under a
/// new parent and name and merge namespace extended attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryBackend {
    fsname: String,
    entries: BTreeMap<Id, FsEntry>,
}

impl MemoryBackend {
    /// Backend name used in URIs and diagnostics.
    pub const NAME: &'static str = "memory";

    /// An empty store.
    #[must_use]
    pub fn new(fsname: impl Into<String>) -> Self {
        Self {
            fsname: fsname.into(),
            entries: BTreeMap::new(),
        }
    }

    /// A store preloaded with `entries`; entries without an identifier are
    /// dropped.
    #[must_use]
    pub fn with_entries(fsname: impl Into<String>, entries: impl IntoIterator<Item = FsEntry>) -> Self {
        let mut store = Self::new(fsname);
        for entry in entries {
            store.insert(entry);
        }
        store
    }

    /// Filesystem name this store was opened with.
    #[must_use]
    pub fn fsname(&self) -> &str {
        &self.fsname
    }

    /// Stores `entry`, replacing any entry with the same identifier.
    ///
    /// Returns `false` when the entry has no identifier.
    pub fn insert(&mut self, entry: FsEntry) -> bool {
        let Some(id) = entry.id.clone() else {
            trace_backend!(warn: fsname = %self.fsname, "ignoring entry without an identifier");
            return false;
        };
        self.entries.insert(id, entry);
        true
    }

    /// Looks up an entry by identifier.
    #[must_use]
    pub fn get(&self, id: &Id) -> Option<&FsEntry> {
        self.entries.get(id)
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the store holds no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &FsEntry> {
        self.entries.values()
    }

    /// The entry without a parent; the lowest identifier wins if several
    /// qualify.
    fn root_entry(&self) -> Option<&FsEntry> {
        self.entries.values().find(|entry| entry.parent_id.is_none())
    }

    fn child(&self, parent: &Id, name: &str) -> Option<&FsEntry> {
        self.entries.values().find(|entry| {
            entry.parent_id.as_ref() == Some(parent) && entry.name.as_deref() == Some(name)
        })
    }

    /// Resolves a locator to an entry.
    ///
    /// Paths are walked from the root entry; `.` is ignored and `..` moves
    /// to the parent.
    pub fn resolve(&self, at: &Locator) -> Result<&FsEntry, SyncError> {
        let not_found = || SyncError::NotFound(at.clone());
        let Some(components) = at.components() else {
            let Locator::Id(id) = at else {
                return Err(not_found());
            };
            return self.get(id).ok_or_else(not_found);
        };

        let mut current = self.root_entry().ok_or_else(not_found)?;
        for component in components {
            current = match component {
                "." => current,
                ".." => match &current.parent_id {
                    Some(parent) => self.get(parent).ok_or_else(not_found)?,
                    None => current,
                },
                name => {
                    let id = current.id.as_ref().ok_or_else(not_found)?;
                    self.child(id, name).ok_or_else(not_found)?
                }
            };
        }
        Ok(current)
    }

    /// Identifiers of `root` and everything below it, parents first.
    fn subtree(&self, root: &Id) -> Vec<Id> {
        let mut children: BTreeMap<&Id, Vec<&Id>> = BTreeMap::new();
        for (id, entry) in &self.entries {
            if let Some(parent) = &entry.parent_id {
                children.entry(parent).or_default().push(id);
            }
        }

        let mut order = Vec::new();
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id.clone());
            if let Some(below) = children.get(id) {
                queue.extend(below.iter().copied());
            }
        }
        order
    }

    fn apply(&mut self, event: FsEvent) -> Result<(), String> {
        match event {
            FsEvent::Upsert {
                id,
                statx,
                symlink,
                xattrs,
            } => {
                let entry = self
                    .entries
                    .entry(id.clone())
                    .or_insert_with(|| FsEntry::new(id));
                if let Some(statx) = statx {
                    entry.statx.get_or_insert_with(Statx::new).merge(&statx);
                }
                if symlink.is_some() {
                    entry.symlink = symlink;
                }
                if let Some(xattrs) = xattrs {
                    entry.inode_xattrs.get_or_insert_with(Xattrs::new).merge(&xattrs);
                }
            }
            FsEvent::Link {
                id,
                parent_id,
                name,
                xattrs,
            } => {
                if name.is_empty() || name.contains('/') || name == "." || name == ".." {
                    return Err(format!("invalid name '{name}' for {id}"));
                }
                if parent_id == id {
                    return Err(format!("{id} cannot be its own parent"));
                }
                let entry = self
                    .entries
                    .entry(id.clone())
                    .or_insert_with(|| FsEntry::new(id));
                entry.parent_id = Some(parent_id);
                entry.name = Some(name);
                if let Some(xattrs) = xattrs {
                    entry.ns_xattrs.get_or_insert_with(Xattrs::new).merge(&xattrs);
                }
            }
        }
        Ok(())
    }

    /// Applies `events` in order, labelling failures with `backend`.
    pub(crate) fn apply_all(
        &mut self,
        backend: &str,
        events: &mut dyn Iterator<Item = Rc<FsEvent>>,
    ) -> Result<usize, SyncError> {
        let mut applied = 0;
        for event in events {
            self.apply(Rc::unwrap_or_clone(event))
                .map_err(|message| SyncError::backend(backend, message))?;
            applied += 1;
        }
        trace_backend!(backend, fsname = %self.fsname, applied, "update applied");
        Ok(applied)
    }
}

impl Source for MemoryBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn entries(&self, _projection: &Projection) -> Result<BoxedEntrySource<'_>, SyncError> {
        Ok(Box::new(Listing {
            entries: self.entries.values().cloned(),
        }))
    }

    fn branch(&self, at: &Locator, _projection: &Projection) -> Result<BoxedEntrySource<'_>, SyncError> {
        let root = self.resolve(at)?.id.clone().ok_or_else(|| SyncError::NotFound(at.clone()))?;
        let order = self.subtree(&root);
        trace_backend!(fsname = %self.fsname, %at, entries = order.len(), "branch resolved");
        Ok(Box::new(Listing {
            entries: order
                .into_iter()
                .filter_map(move |id| self.entries.get(&id).cloned()),
        }))
    }

    fn root(&self, at: &Locator, _projection: &Projection) -> Result<FsEntry, SyncError> {
        self.resolve(at).cloned()
    }
}

impl Destination for MemoryBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn update(&mut self, events: &mut dyn Iterator<Item = Rc<FsEvent>>) -> Result<usize, SyncError> {
        self.apply_all(Self::NAME, events)
    }
}
