//! crates/fsentry/src/entry.rs
//! Sparse entry records and their extended attribute maps.

use std::collections::BTreeMap;

use bitflags::bitflags;

use crate::id::Id;
use crate::statx::Statx;

bitflags! {
    /// Presence bits for the top-level fields of an [`FsEntry`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct FieldMask: u8 {
        /// [`FsEntry::id`].
        const ID = 1 << 0;
        /// [`FsEntry::parent_id`].
        const PARENT_ID = 1 << 1;
        /// [`FsEntry::name`].
        const NAME = 1 << 2;
        /// [`FsEntry::statx`].
        const STATX = 1 << 3;
        /// [`FsEntry::symlink`].
        const SYMLINK = 1 << 4;
        /// [`FsEntry::inode_xattrs`].
        const INODE_XATTRS = 1 << 5;
        /// [`FsEntry::ns_xattrs`].
        const NAMESPACE_XATTRS = 1 << 6;
    }
}

/// Extended attributes: string keys, raw byte values.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Xattrs(BTreeMap<String, Vec<u8>>);

impl Xattrs {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces one attribute.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder form of [`Xattrs::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.insert(key, value);
        self
    }

    /// Looks up one attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the map holds no attribute.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keeps only the attributes whose key satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|key, _| keep(key));
    }

    /// Inserts every attribute of `other`, replacing existing keys.
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Iterates attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_slice()))
    }
}

impl<K: Into<String>, V: Into<Vec<u8>>> FromIterator<(K, V)> for Xattrs {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Values travel as base64 so binary attributes survive text formats.
#[cfg(feature = "serde")]
impl serde::Serialize for Xattrs {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use base64::Engine as _;
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, &base64::engine::general_purpose::STANDARD.encode(value))?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Xattrs {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use base64::Engine as _;

        let encoded = BTreeMap::<String, String>::deserialize(deserializer)?;
        encoded
            .into_iter()
            .map(|(key, value)| {
                base64::engine::general_purpose::STANDARD
                    .decode(value)
                    .map(|bytes| (key, bytes))
                    .map_err(serde::de::Error::custom)
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Self)
    }
}

/// Sparse metadata record of one filesystem object.
///
/// Each field is independently present or absent; [`FsEntry::mask`] derives
/// the presence bits. Entries without an [`Id`] cannot become events.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FsEntry {
    /// Identifier of the object.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub id: Option<Id>,
    /// Identifier of the containing directory; meaningful only with `name`.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub parent_id: Option<Id>,
    /// Name within the parent.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    /// Attribute bundle.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub statx: Option<Statx>,
    /// Symbolic link target.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub symlink: Option<String>,
    /// Extended attributes of the inode.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub inode_xattrs: Option<Xattrs>,
    /// Extended attributes of the namespace entry.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub ns_xattrs: Option<Xattrs>,
}

impl FsEntry {
    /// An entry carrying only an identifier.
    #[must_use]
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Sets the parent and name together.
    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<Id>, name: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self.name = Some(name.into());
        self
    }

    /// Sets the attribute bundle.
    #[must_use]
    pub fn with_statx(mut self, statx: Statx) -> Self {
        self.statx = Some(statx);
        self
    }

    /// Sets the symbolic link target.
    #[must_use]
    pub fn with_symlink(mut self, target: impl Into<String>) -> Self {
        self.symlink = Some(target.into());
        self
    }

    /// Sets the inode extended attributes.
    #[must_use]
    pub fn with_inode_xattrs(mut self, xattrs: Xattrs) -> Self {
        self.inode_xattrs = Some(xattrs);
        self
    }

    /// Sets the namespace extended attributes.
    #[must_use]
    pub fn with_ns_xattrs(mut self, xattrs: Xattrs) -> Self {
        self.ns_xattrs = Some(xattrs);
        self
    }

    /// Fields present in this entry.
    #[must_use]
    pub fn mask(&self) -> FieldMask {
        let mut mask = FieldMask::empty();
        mask.set(FieldMask::ID, self.id.is_some());
        mask.set(FieldMask::PARENT_ID, self.parent_id.is_some());
        mask.set(FieldMask::NAME, self.name.is_some());
        mask.set(FieldMask::STATX, self.statx.is_some());
        mask.set(FieldMask::SYMLINK, self.symlink.is_some());
        mask.set(FieldMask::INODE_XATTRS, self.inode_xattrs.is_some());
        mask.set(FieldMask::NAMESPACE_XATTRS, self.ns_xattrs.is_some());
        mask
    }
}
