//! Filesystem error type.
//!
//! Every failing operation raises exactly one [`FsError`]: an [`Errno`]
//! from the shared catalogue plus the paths involved. The catalogue
//! supplies the symbolic code and errno integer; this type adds context.

use memfs_errno::Errno;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FsError>;

/// A filesystem operation failure.
#[derive(Debug, Clone, Error)]
#[error("{errno}{}", fmt_paths(.paths))]
pub struct FsError {
    /// The error kind from the shared catalogue.
    errno: Errno,
    /// Paths involved in the failing operation, in argument order.
    paths: Vec<String>,
}

impl FsError {
    /// Create an error with no path context.
    pub fn bare(errno: Errno) -> Self {
        Self {
            errno,
            paths: Vec::new(),
        }
    }

    /// Create an error naming a single path.
    pub fn path(errno: Errno, path: impl Into<String>) -> Self {
        Self {
            errno,
            paths: vec![path.into()],
        }
    }

    /// Create an error naming two paths (link, rename).
    pub fn paths(errno: Errno, a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            errno,
            paths: vec![a.into(), b.into()],
        }
    }

    /// The catalogue entry.
    pub fn kind(&self) -> Errno {
        self.errno
    }

    /// The symbolic code string, e.g. `"ENOENT"`.
    pub fn code(&self) -> &'static str {
        self.errno.code()
    }

    /// The classic errno integer.
    pub fn errno(&self) -> i32 {
        self.errno.errno()
    }

    /// The paths involved in the failing operation.
    pub fn involved_paths(&self) -> &[String] {
        &self.paths
    }
}

impl From<FsError> for std::io::Error {
    fn from(err: FsError) -> Self {
        let kind: std::io::ErrorKind = match err.kind() {
            Errno::ENOENT => std::io::ErrorKind::NotFound,
            Errno::EEXIST => std::io::ErrorKind::AlreadyExists,
            Errno::EACCES | Errno::EPERM => std::io::ErrorKind::PermissionDenied,
            Errno::EINVAL => std::io::ErrorKind::InvalidInput,
            _ => std::io::ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}

fn fmt_paths(paths: &[String]) -> String {
    if paths.is_empty() {
        String::new()
    } else {
        format!(" '{}'", paths.join("' -> '"))
    }
}
