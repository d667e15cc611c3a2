//! File descriptors: open flags, descriptor state, and the dense table.

use std::collections::HashMap;
use std::str::FromStr;

use bitflags::bitflags;
use thiserror::Error;

use crate::idpool::IdPool;
use crate::inode::Ino;

/// A file descriptor number. Small, reused low-first.
pub type Fd = u64;

bitflags! {
    /// Open semantics flags.
    ///
    /// `READ`/`WRITE` form the access mode; the rest are status and
    /// creation flags with their POSIX meanings.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const APPEND = 1 << 2;
        const TRUNC = 1 << 3;
        const CREATE = 1 << 4;
        const EXCL = 1 << 5;

        const DIRECTORY = 1 << 6;
        const NOFOLLOW = 1 << 7;
    }
}

impl OpenFlags {
    /// Whether reads are permitted on a descriptor opened with these
    /// flags.
    pub fn readable(self) -> bool {
        self.contains(OpenFlags::READ)
    }

    /// Whether writes are permitted.
    pub fn writable(self) -> bool {
        self.contains(OpenFlags::WRITE)
    }
}

/// Raised when an open-mode string is not in the closed table.
///
/// This is an argument error, the caller passed a string outside the
/// enumeration, so it is deliberately not an [`FsError`](crate::FsError).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown file open mode: {0:?}")]
pub struct UnknownOpenMode(pub String);

impl FromStr for OpenFlags {
    type Err = UnknownOpenMode;

    /// The closed short-mode table.
    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        Ok(match mode {
            "r" => OpenFlags::READ,
            "r+" => OpenFlags::READ | OpenFlags::WRITE,
            "w" => OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNC,
            "wx" => OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNC | OpenFlags::EXCL,
            "w+" => OpenFlags::READ | OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNC,
            "wx+" => {
                OpenFlags::READ
                    | OpenFlags::WRITE
                    | OpenFlags::CREATE
                    | OpenFlags::TRUNC
                    | OpenFlags::EXCL
            }
            "a" => OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::APPEND,
            "ax" => OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::APPEND | OpenFlags::EXCL,
            "a+" => OpenFlags::READ | OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::APPEND,
            "ax+" => {
                OpenFlags::READ
                    | OpenFlags::WRITE
                    | OpenFlags::CREATE
                    | OpenFlags::APPEND
                    | OpenFlags::EXCL
            }
            other => return Err(UnknownOpenMode(other.to_string())),
        })
    }
}

/// State behind one open descriptor.
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// The inode this descriptor refers to.
    pub ino: Ino,
    /// Flags fixed at open time.
    pub flags: OpenFlags,
    /// Seek position for non-positional I/O.
    pub position: u64,
}

/// Dense descriptor-number table.
///
/// Ids come from an [`IdPool`], so a freed descriptor number is the next
/// one handed out.
#[derive(Debug)]
pub struct FdTable {
    ids: IdPool,
    open: HashMap<Fd, Descriptor>,
}

impl FdTable {
    /// Empty table.
    pub fn new(shrink_ids: bool) -> Self {
        Self {
            ids: IdPool::with_options(0, crate::idpool::DEFAULT_BLOCK_SIZE, shrink_ids),
            open: HashMap::new(),
        }
    }

    /// Register a descriptor for `ino`, position 0.
    pub fn insert(&mut self, ino: Ino, flags: OpenFlags) -> Fd {
        let fd: Fd = self.ids.allocate();
        self.open.insert(
            fd,
            Descriptor {
                ino,
                flags,
                position: 0,
            },
        );
        fd
    }

    /// Borrow descriptor state.
    pub fn get(&self, fd: Fd) -> Option<&Descriptor> {
        self.open.get(&fd)
    }

    /// Mutably borrow descriptor state.
    pub fn get_mut(&mut self, fd: Fd) -> Option<&mut Descriptor> {
        self.open.get_mut(&fd)
    }

    /// Drop a descriptor, returning its state. The number goes back to
    /// the pool for reuse.
    pub fn remove(&mut self, fd: Fd) -> Option<Descriptor> {
        let desc: Option<Descriptor> = self.open.remove(&fd);
        if desc.is_some() {
            self.ids.deallocate(fd);
        }
        desc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_table() {
        assert_eq!("r".parse::<OpenFlags>().unwrap(), OpenFlags::READ);
        assert_eq!(
            "r+".parse::<OpenFlags>().unwrap(),
            OpenFlags::READ | OpenFlags::WRITE
        );
        assert_eq!(
            "w".parse::<OpenFlags>().unwrap(),
            OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNC
        );
        assert_eq!(
            "ax+".parse::<OpenFlags>().unwrap(),
            OpenFlags::READ
                | OpenFlags::WRITE
                | OpenFlags::CREATE
                | OpenFlags::APPEND
                | OpenFlags::EXCL
        );
    }

    #[test]
    fn test_unknown_mode_is_not_an_fs_error() {
        let err: UnknownOpenMode = "rw".parse::<OpenFlags>().unwrap_err();
        assert_eq!(err, UnknownOpenMode("rw".to_string()));
    }

    #[test]
    fn test_access_predicates() {
        let r: OpenFlags = "r".parse().unwrap();
        assert!(r.readable() && !r.writable());
        let a: OpenFlags = "a".parse().unwrap();
        assert!(!a.readable() && a.writable());
        let rw: OpenFlags = "w+".parse().unwrap();
        assert!(rw.readable() && rw.writable());
    }

    #[test]
    fn test_fd_numbers_are_dense() {
        let mut table: FdTable = FdTable::new(false);
        let a: Fd = table.insert(10, OpenFlags::READ);
        let b: Fd = table.insert(11, OpenFlags::READ);
        let c: Fd = table.insert(12, OpenFlags::READ);
        assert_eq!((a, b, c), (0, 1, 2));
        table.remove(b);
        assert_eq!(table.insert(13, OpenFlags::READ), b);
    }
}
