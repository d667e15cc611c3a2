//! POSIX error-code catalogue.
//!
//! This crate is a small, dependency-free table of the errno values the
//! filesystem crates surface. Each entry carries the symbolic code string
//! (`"ENOENT"`), the classic positive errno integer, and a default human
//! message. Higher layers attach context (the paths involved) on top.

use std::fmt;

/// A POSIX-style error number.
///
/// The set is closed: it contains exactly the kinds the filesystem core
/// raises, plus a couple of catalogue entries (`EMFILE`, `ENAMETOOLONG`)
/// kept for callers that map host errors through the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Errno {
    /// No such file or directory.
    ENOENT,
    /// File exists.
    EEXIST,
    /// Is a directory.
    EISDIR,
    /// Not a directory.
    ENOTDIR,
    /// Directory not empty.
    ENOTEMPTY,
    /// Resource busy.
    EBUSY,
    /// Operation not permitted.
    EPERM,
    /// Invalid argument.
    EINVAL,
    /// Too many levels of symbolic links.
    ELOOP,
    /// Bad file descriptor.
    EBADF,
    /// Permission denied.
    EACCES,
    /// No space left on device.
    ENOSPC,
    /// Too many open files.
    EMFILE,
    /// File name too long.
    ENAMETOOLONG,
}

impl Errno {
    /// The symbolic code string, e.g. `"ENOENT"`.
    pub const fn code(self) -> &'static str {
        match self {
            Errno::ENOENT => "ENOENT",
            Errno::EEXIST => "EEXIST",
            Errno::EISDIR => "EISDIR",
            Errno::ENOTDIR => "ENOTDIR",
            Errno::ENOTEMPTY => "ENOTEMPTY",
            Errno::EBUSY => "EBUSY",
            Errno::EPERM => "EPERM",
            Errno::EINVAL => "EINVAL",
            Errno::ELOOP => "ELOOP",
            Errno::EBADF => "EBADF",
            Errno::EACCES => "EACCES",
            Errno::ENOSPC => "ENOSPC",
            Errno::EMFILE => "EMFILE",
            Errno::ENAMETOOLONG => "ENAMETOOLONG",
        }
    }

    /// The classic positive errno integer.
    pub const fn errno(self) -> i32 {
        match self {
            Errno::EPERM => 1,
            Errno::ENOENT => 2,
            Errno::EBADF => 9,
            Errno::EACCES => 13,
            Errno::EBUSY => 16,
            Errno::EEXIST => 17,
            Errno::ENOTDIR => 20,
            Errno::EISDIR => 21,
            Errno::EINVAL => 22,
            Errno::EMFILE => 24,
            Errno::ENOSPC => 28,
            Errno::ENAMETOOLONG => 36,
            Errno::ENOTEMPTY => 39,
            Errno::ELOOP => 40,
        }
    }

    /// Default human-readable message for this code.
    pub const fn message(self) -> &'static str {
        match self {
            Errno::ENOENT => "no such file or directory",
            Errno::EEXIST => "file already exists",
            Errno::EISDIR => "illegal operation on a directory",
            Errno::ENOTDIR => "not a directory",
            Errno::ENOTEMPTY => "directory not empty",
            Errno::EBUSY => "resource busy or locked",
            Errno::EPERM => "operation not permitted",
            Errno::EINVAL => "invalid argument",
            Errno::ELOOP => "too many symbolic links encountered",
            Errno::EBADF => "bad file descriptor",
            Errno::EACCES => "permission denied",
            Errno::ENOSPC => "no space left on device",
            Errno::EMFILE => "too many open files",
            Errno::ENAMETOOLONG => "file name too long",
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
