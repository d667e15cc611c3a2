//! Core inode types: identifiers, metadata, stat results.

use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for an inode.
pub type Ino = u64;

/// Mode bits reported for every inode. Callers may request other modes;
/// they are accepted and ignored.
pub const MODE_ALL: u32 = 0o777;

/// Size reported for directories.
pub const DIR_SIZE: u64 = 4096;

/// What an inode is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

/// Metadata shared by all inode variants.
///
/// Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone)]
pub struct Metadata {
    /// Inode number.
    pub ino: Ino,
    /// Permission bits, always [`MODE_ALL`].
    pub mode: u32,
    /// Owner, always 0.
    pub uid: u32,
    /// Group, always 0.
    pub gid: u32,
    /// Directory-entry references to this inode.
    pub nlink: u32,
    /// Last access.
    pub atime: u64,
    /// Last data modification.
    pub mtime: u64,
    /// Last metadata change.
    pub ctime: u64,
    /// Creation.
    pub birthtime: u64,
}

impl Metadata {
    /// Fresh metadata stamped with the current time.
    pub fn new(ino: Ino, nlink: u32) -> Self {
        let now: u64 = now_ms();
        Self {
            ino,
            mode: MODE_ALL,
            uid: 0,
            gid: 0,
            nlink,
            atime: now,
            mtime: now,
            ctime: now,
            birthtime: now,
        }
    }

    /// Record an access.
    pub fn touch_atime(&mut self) {
        self.atime = now_ms();
    }

    /// Record a data mutation.
    pub fn touch_mtime(&mut self) {
        let now: u64 = now_ms();
        self.mtime = now;
        self.ctime = now;
    }

    /// Record a metadata change.
    pub fn touch_ctime(&mut self) {
        self.ctime = now_ms();
    }
}

/// Snapshot of an inode's identity and metadata, the `stat` result.
#[derive(Debug, Clone)]
pub struct FileStat {
    /// Inode number.
    pub ino: Ino,
    /// Inode kind.
    pub kind: NodeKind,
    /// Permission bits.
    pub mode: u32,
    /// Owner.
    pub uid: u32,
    /// Group.
    pub gid: u32,
    /// Hard-link count.
    pub nlink: u32,
    /// Byte length for files, [`DIR_SIZE`] for directories, target length
    /// for symlinks.
    pub size: u64,
    /// Last access, ms since epoch.
    pub atime: u64,
    /// Last data modification, ms since epoch.
    pub mtime: u64,
    /// Last metadata change, ms since epoch.
    pub ctime: u64,
    /// Creation, ms since epoch.
    pub birthtime: u64,
}

impl FileStat {
    /// Whether the inode is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// Whether the inode is a directory.
    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Whether the inode is a symbolic link.
    pub fn is_symbolic_link(&self) -> bool {
        self.kind == NodeKind::Symlink
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
