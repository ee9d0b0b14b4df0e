//! crates/fsentry/src/statx.rs
//! Sparse attribute bundle modelled on `statx(2)`.
//!
//! Every attribute is guarded by a bit in [`StatxMask`]. Timestamps and
//! device numbers are split into independently maskable halves so that a
//! projection can request, say, modification seconds without nanoseconds.
//! Copying between bundles goes through a single table mapping each bit to
//! the fields it guards.

use bitflags::bitflags;

/// File type bits of `st_mode`.
pub const S_IFMT: u16 = 0o170_000;

bitflags! {
    /// Presence bits for the attributes of a [`Statx`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct StatxMask: u32 {
        /// File type, the `S_IFMT` part of the mode.
        const TYPE = 1 << 0;
        /// Permission bits, the rest of the mode.
        const MODE = 1 << 1;
        /// Hard link count.
        const NLINK = 1 << 2;
        /// Owner.
        const UID = 1 << 3;
        /// Group.
        const GID = 1 << 4;
        /// Last access, seconds.
        const ATIME_SEC = 1 << 5;
        /// Last modification, seconds.
        const MTIME_SEC = 1 << 6;
        /// Last status change, seconds.
        const CTIME_SEC = 1 << 7;
        /// Inode number.
        const INO = 1 << 8;
        /// Size in bytes.
        const SIZE = 1 << 9;
        /// Allocated 512-byte blocks.
        const BLOCKS = 1 << 10;
        /// Creation, seconds.
        const BTIME_SEC = 1 << 11;
        /// Mount identifier.
        const MNT_ID = 1 << 12;
        /// Preferred I/O block size.
        const BLKSIZE = 1 << 13;
        /// Attribute flags and the mask of supported flags.
        const ATTRIBUTES = 1 << 14;
        /// Last access, nanoseconds.
        const ATIME_NSEC = 1 << 15;
        /// Creation, nanoseconds.
        const BTIME_NSEC = 1 << 16;
        /// Last status change, nanoseconds.
        const CTIME_NSEC = 1 << 17;
        /// Last modification, nanoseconds.
        const MTIME_NSEC = 1 << 18;
        /// Device number of a special file, major half.
        const RDEV_MAJOR = 1 << 19;
        /// Device number of a special file, minor half.
        const RDEV_MINOR = 1 << 20;
        /// Containing filesystem, major half.
        const DEV_MAJOR = 1 << 21;
        /// Containing filesystem, minor half.
        const DEV_MINOR = 1 << 22;

        /// Last access.
        const ATIME = Self::ATIME_SEC.bits() | Self::ATIME_NSEC.bits();
        /// Creation.
        const BTIME = Self::BTIME_SEC.bits() | Self::BTIME_NSEC.bits();
        /// Last status change.
        const CTIME = Self::CTIME_SEC.bits() | Self::CTIME_NSEC.bits();
        /// Last modification.
        const MTIME = Self::MTIME_SEC.bits() | Self::MTIME_NSEC.bits();
        /// Special file device number.
        const RDEV = Self::RDEV_MAJOR.bits() | Self::RDEV_MINOR.bits();
        /// Containing filesystem device number.
        const DEV = Self::DEV_MAJOR.bits() | Self::DEV_MINOR.bits();
        /// Everything except [`StatxMask::MNT_ID`].
        const ALL = (1 << 23) - 1 - Self::MNT_ID.bits();
    }
}

/// A `(seconds, nanoseconds)` point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatxTimestamp {
    /// Seconds since the epoch.
    pub sec: i64,
    /// Nanoseconds within the second.
    pub nsec: u32,
}

impl StatxTimestamp {
    /// Builds a timestamp.
    #[must_use]
    pub const fn new(sec: i64, nsec: u32) -> Self {
        Self { sec, nsec }
    }
}

/// Sparse attribute bundle.
///
/// Values outside [`Statx::mask`] are meaningless and compare equal only
/// because copies always start from a zeroed bundle.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statx {
    mask: StatxMask,
    blksize: u32,
    attributes: u64,
    attributes_mask: u64,
    nlink: u32,
    uid: u32,
    gid: u32,
    mode: u16,
    ino: u64,
    size: u64,
    blocks: u64,
    atime: StatxTimestamp,
    btime: StatxTimestamp,
    ctime: StatxTimestamp,
    mtime: StatxTimestamp,
    rdev_major: u32,
    rdev_minor: u32,
    dev_major: u32,
    dev_minor: u32,
    mnt_id: u64,
}

type CopyFn = fn(&mut Statx, &Statx);

/// One row per atomic mask bit: the bit and how to copy what it guards.
const COPY_TABLE: &[(StatxMask, CopyFn)] = &[
    (StatxMask::TYPE, |dst, src| {
        dst.mode = (dst.mode & !S_IFMT) | (src.mode & S_IFMT);
    }),
    (StatxMask::MODE, |dst, src| {
        dst.mode = (dst.mode & S_IFMT) | (src.mode & !S_IFMT);
    }),
    (StatxMask::NLINK, |dst, src| dst.nlink = src.nlink),
    (StatxMask::UID, |dst, src| dst.uid = src.uid),
    (StatxMask::GID, |dst, src| dst.gid = src.gid),
    (StatxMask::ATIME_SEC, |dst, src| dst.atime.sec = src.atime.sec),
    (StatxMask::ATIME_NSEC, |dst, src| dst.atime.nsec = src.atime.nsec),
    (StatxMask::BTIME_SEC, |dst, src| dst.btime.sec = src.btime.sec),
    (StatxMask::BTIME_NSEC, |dst, src| dst.btime.nsec = src.btime.nsec),
    (StatxMask::CTIME_SEC, |dst, src| dst.ctime.sec = src.ctime.sec),
    (StatxMask::CTIME_NSEC, |dst, src| dst.ctime.nsec = src.ctime.nsec),
    (StatxMask::MTIME_SEC, |dst, src| dst.mtime.sec = src.mtime.sec),
    (StatxMask::MTIME_NSEC, |dst, src| dst.mtime.nsec = src.mtime.nsec),
    (StatxMask::INO, |dst, src| dst.ino = src.ino),
    (StatxMask::SIZE, |dst, src| dst.size = src.size),
    (StatxMask::BLOCKS, |dst, src| dst.blocks = src.blocks),
    (StatxMask::BLKSIZE, |dst, src| dst.blksize = src.blksize),
    (StatxMask::ATTRIBUTES, |dst, src| {
        dst.attributes = src.attributes;
        dst.attributes_mask = src.attributes_mask;
    }),
    (StatxMask::RDEV_MAJOR, |dst, src| dst.rdev_major = src.rdev_major),
    (StatxMask::RDEV_MINOR, |dst, src| dst.rdev_minor = src.rdev_minor),
    (StatxMask::DEV_MAJOR, |dst, src| dst.dev_major = src.dev_major),
    (StatxMask::DEV_MINOR, |dst, src| dst.dev_minor = src.dev_minor),
    (StatxMask::MNT_ID, |dst, src| dst.mnt_id = src.mnt_id),
];

macro_rules! scalar_attribute {
    ($(#[$doc:meta])* $field:ident, $with:ident, $bit:ident, $ty:ty) => {
        $(#[$doc])*
        #[must_use]
        pub fn $field(&self) -> Option<$ty> {
            self.mask.contains(StatxMask::$bit).then_some(self.$field)
        }

        #[doc = concat!("Sets `", stringify!($field), "` and marks it present.")]
        #[must_use]
        pub fn $with(mut self, value: $ty) -> Self {
            self.$field = value;
            self.mask |= StatxMask::$bit;
            self
        }
    };
}

macro_rules! timestamp_attribute {
    ($(#[$doc:meta])* $field:ident, $with:ident, $sec:ident, $nsec:ident, $sec_bit:ident, $nsec_bit:ident) => {
        $(#[$doc])*
        #[must_use]
        pub fn $field(&self) -> Option<StatxTimestamp> {
            self.mask
                .contains(StatxMask::$sec_bit | StatxMask::$nsec_bit)
                .then_some(self.$field)
        }

        #[doc = concat!("Seconds half of `", stringify!($field), "`.")]
        #[must_use]
        pub fn $sec(&self) -> Option<i64> {
            self.mask.contains(StatxMask::$sec_bit).then_some(self.$field.sec)
        }

        #[doc = concat!("Nanoseconds half of `", stringify!($field), "`.")]
        #[must_use]
        pub fn $nsec(&self) -> Option<u32> {
            self.mask.contains(StatxMask::$nsec_bit).then_some(self.$field.nsec)
        }

        #[doc = concat!("Sets both halves of `", stringify!($field), "`.")]
        #[must_use]
        pub fn $with(mut self, value: StatxTimestamp) -> Self {
            self.$field = value;
            self.mask |= StatxMask::$sec_bit | StatxMask::$nsec_bit;
            self
        }
    };
}

impl Statx {
    /// An empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes present in this bundle.
    #[must_use]
    pub const fn mask(&self) -> StatxMask {
        self.mask
    }

    /// Returns `true` when no attribute is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    /// File type bits (`mode & S_IFMT`).
    #[must_use]
    pub fn file_type(&self) -> Option<u16> {
        self.mask
            .contains(StatxMask::TYPE)
            .then_some(self.mode & S_IFMT)
    }

    /// Permission bits (`mode & !S_IFMT`).
    #[must_use]
    pub fn mode(&self) -> Option<u16> {
        self.mask
            .contains(StatxMask::MODE)
            .then_some(self.mode & !S_IFMT)
    }

    /// Sets both the type and permission halves of the mode.
    #[must_use]
    pub fn with_mode(mut self, mode: u16) -> Self {
        self.mode = mode;
        self.mask |= StatxMask::TYPE | StatxMask::MODE;
        self
    }

    /// Attribute flags and the mask of flags the filesystem supports.
    #[must_use]
    pub fn attributes(&self) -> Option<(u64, u64)> {
        self.mask
            .contains(StatxMask::ATTRIBUTES)
            .then_some((self.attributes, self.attributes_mask))
    }

    /// Sets the attribute flags together with their support mask.
    #[must_use]
    pub fn with_attributes(mut self, attributes: u64, supported: u64) -> Self {
        self.attributes = attributes;
        self.attributes_mask = supported;
        self.mask |= StatxMask::ATTRIBUTES;
        self
    }

    /// Device numbers of a special file.
    #[must_use]
    pub fn rdev(&self) -> Option<(u32, u32)> {
        self.mask
            .contains(StatxMask::RDEV)
            .then_some((self.rdev_major, self.rdev_minor))
    }

    /// Sets both halves of the special file device number.
    #[must_use]
    pub fn with_rdev(mut self, major: u32, minor: u32) -> Self {
        self.rdev_major = major;
        self.rdev_minor = minor;
        self.mask |= StatxMask::RDEV;
        self
    }

    /// Device numbers of the containing filesystem.
    #[must_use]
    pub fn dev(&self) -> Option<(u32, u32)> {
        self.mask
            .contains(StatxMask::DEV)
            .then_some((self.dev_major, self.dev_minor))
    }

    /// Sets both halves of the containing filesystem device number.
    #[must_use]
    pub fn with_dev(mut self, major: u32, minor: u32) -> Self {
        self.dev_major = major;
        self.dev_minor = minor;
        self.mask |= StatxMask::DEV;
        self
    }

    scalar_attribute!(
        /// Preferred I/O block size.
        blksize, with_blksize, BLKSIZE, u32
    );
    scalar_attribute!(
        /// Hard link count.
        nlink, with_nlink, NLINK, u32
    );
    scalar_attribute!(
        /// Owner.
        uid, with_uid, UID, u32
    );
    scalar_attribute!(
        /// Group.
        gid, with_gid, GID, u32
    );
    scalar_attribute!(
        /// Inode number.
        ino, with_ino, INO, u64
    );
    scalar_attribute!(
        /// Size in bytes.
        size, with_size, SIZE, u64
    );
    scalar_attribute!(
        /// Allocated 512-byte blocks.
        blocks, with_blocks, BLOCKS, u64
    );
    scalar_attribute!(
        /// Mount identifier.
        mnt_id, with_mnt_id, MNT_ID, u64
    );

    timestamp_attribute!(
        /// Last access time, when both halves are present.
        atime, with_atime, atime_sec, atime_nsec, ATIME_SEC, ATIME_NSEC
    );
    timestamp_attribute!(
        /// Creation time, when both halves are present.
        btime, with_btime, btime_sec, btime_nsec, BTIME_SEC, BTIME_NSEC
    );
    timestamp_attribute!(
        /// Status change time, when both halves are present.
        ctime, with_ctime, ctime_sec, ctime_nsec, CTIME_SEC, CTIME_NSEC
    );
    timestamp_attribute!(
        /// Modification time, when both halves are present.
        mtime, with_mtime, mtime_sec, mtime_nsec, MTIME_SEC, MTIME_NSEC
    );

    /// Copies the attributes of `src` selected by `mask` into `self`.
    fn copy_from(&mut self, src: &Self, mask: StatxMask) {
        let wanted = src.mask & mask;
        for &(bit, copy) in COPY_TABLE {
            if wanted.contains(bit) {
                copy(self, src);
                self.mask |= bit;
            }
        }
    }

    /// Returns a bundle holding only the attributes in `mask`.
    #[must_use]
    pub fn restrict(&self, mask: StatxMask) -> Self {
        let mut out = Self::new();
        out.copy_from(self, mask);
        out
    }

    /// Overwrites attributes with every attribute present in `other`.
    pub fn merge(&mut self, other: &Self) {
        self.copy_from(other, StatxMask::all());
    }
}
