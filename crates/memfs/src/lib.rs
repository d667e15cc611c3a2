//! In-memory POSIX-like filesystem.
//!
//! Paths are `/`-separated strings; objects are regular files,
//! directories, and symbolic links identified by inode numbers and
//! reached either by path or through integer file descriptors carrying
//! an access mode and a seek position. State lives entirely in memory
//! and is discarded with the owning process.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: Call surfaces (Memfs sync API, CallbackFs, streams)
//! Layer 2: Operations (resolver walk, descriptor table)
//! Layer 1: Primitives (InodeStore, IdPool)
//! ```
//!
//! # Example
//!
//! ```
//! use memfs::Memfs;
//!
//! let fs = Memfs::new();
//! fs.mkdir("/test").unwrap();
//! fs.write_file("/test/hello.txt", b"Hello World").unwrap();
//! fs.symlink("/test", "/link").unwrap();
//! assert_eq!(fs.read_file("/link/hello.txt").unwrap(), b"Hello World");
//! ```

mod error;
mod facade;
mod fd;
mod fs;
mod idpool;
mod inode;
mod options;
mod resolver;
mod stream;

pub use error::{FsError, Result};
pub use facade::CallbackFs;
pub use fd::{Fd, OpenFlags, UnknownOpenMode};
pub use fs::Memfs;
pub use idpool::{IdPool, DEFAULT_BLOCK_SIZE};
pub use inode::{FileStat, Ino, NodeKind};
pub use options::{MemfsOptions, DEFAULT_MAX_FILE_SIZE};
pub use stream::{ReadStream, ReadStreamOptions, WriteStream};

// Re-export the catalogue so callers can match on error kinds.
pub use memfs_errno::Errno;
