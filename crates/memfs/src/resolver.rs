//! Path resolution.
//!
//! [`navigate`] walks a path string from the root and reports where the
//! walk stopped as a four-field outcome: the directory under which
//! resolution stopped, the resolved inode (if any), the final segment
//! name, and any unconsumed suffix. Create operations use the "name
//! reserved but empty" outcome; read operations use the bound outcome.
//!
//! Canonicalisation is deliberately shallow: leading `/` runs and at most
//! one leading `./` or `../` are stripped, nothing else. `a/../b` is not
//! simplified; it walks the real `..` entry that every directory holds,
//! which lands in the same place. Interior `/` runs collapse during the
//! walk and a trailing `/` is tolerated.

use std::collections::HashSet;

use memfs_errno::Errno;

use crate::error::{FsError, Result};
use crate::inode::{Ino, InodeStore, Node, NodeData};

/// Where a walk stopped.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Directory under which resolution stopped.
    pub dir: Ino,
    /// The resolved inode, when the full path named one.
    pub target: Option<Ino>,
    /// The final segment name. `Some` with `target: None` means the name
    /// is free under `dir` and may be created there. `None` for the root.
    pub name: Option<String>,
    /// Unconsumed path suffix. Nonempty means an intermediate component
    /// was missing or not traversable.
    pub remaining: String,
}

impl Resolved {
    fn bound(dir: Ino, target: Ino, name: Option<String>) -> Self {
        Self {
            dir,
            target: Some(target),
            name,
            remaining: String::new(),
        }
    }
}

/// Resolve `path` from the root.
///
/// # Arguments
/// * `store` - Inode store to walk
/// * `path` - POSIX-style path, absolute or relative to the root
/// * `resolve_last` - Whether a symlink in the final position is followed
///
/// # Errors
/// `ENOENT` for an empty path, `ELOOP` when a symlink is revisited while
/// expanding one call. All other interpretation belongs to the caller.
pub fn navigate(store: &InodeStore, path: &str, resolve_last: bool) -> Result<Resolved> {
    if path.is_empty() {
        return Err(FsError::path(Errno::ENOENT, path));
    }

    let root: Ino = store.root();
    let mut cur: Ino = root;
    let mut rest: String = canonicalize(path).to_string();
    // Symlink inodes already expanded in this call; revisiting one means
    // the expansion can never terminate.
    let mut active: HashSet<Ino> = HashSet::new();

    loop {
        if rest.is_empty() {
            // The canonical empty path denotes the current directory
            // itself, which is the root unless a symlink walked us here.
            return Ok(Resolved::bound(cur, cur, None));
        }

        let (seg, tail) = split_segment(&rest);
        let seg: String = seg.to_string();
        let tail: String = tail.to_string();

        let dir_node = store
            .get(cur)
            .and_then(Node::as_dir)
            .expect("walk position is a live directory");

        let child: Ino = match dir_node.get(&seg) {
            Some(child) => child,
            None => {
                return Ok(if tail.is_empty() {
                    Resolved {
                        dir: cur,
                        target: None,
                        name: Some(seg),
                        remaining: String::new(),
                    }
                } else {
                    Resolved {
                        dir: cur,
                        target: None,
                        name: None,
                        remaining: tail,
                    }
                });
            }
        };

        let node: &Node = store.get(child).expect("entry refers to a live inode");
        match &node.data {
            NodeData::File(_) => {
                return Ok(if tail.is_empty() {
                    Resolved::bound(cur, child, Some(seg))
                } else {
                    // Traversal through a file; report the stop point and
                    // let the caller raise.
                    Resolved {
                        dir: cur,
                        target: None,
                        name: None,
                        remaining: tail,
                    }
                });
            }
            NodeData::Dir(_) => {
                if tail.is_empty() {
                    return Ok(Resolved::bound(cur, child, Some(seg)));
                }
                cur = child;
                rest = tail;
            }
            NodeData::Symlink(link) => {
                if tail.is_empty() && !resolve_last {
                    return Ok(Resolved::bound(cur, child, Some(seg)));
                }
                if !active.insert(child) {
                    return Err(FsError::path(Errno::ELOOP, path));
                }
                let target: &str = link.target();
                let joined: String = if tail.is_empty() {
                    target.to_string()
                } else {
                    format!("{}/{}", target, tail)
                };
                if target.starts_with('/') {
                    cur = root;
                    rest = joined.trim_start_matches('/').to_string();
                } else {
                    // Relative targets continue from the current
                    // directory; `.` and `..` are real entries, so no
                    // rewriting is needed.
                    rest = joined;
                }
            }
        }
    }
}

/// Strip leading `/` runs and at most one leading `./` or `../`.
pub(crate) fn canonicalize(mut path: &str) -> &str {
    path = path.trim_start_matches('/');
    if let Some(rest) = path.strip_prefix("./") {
        path = rest;
    } else if let Some(rest) = path.strip_prefix("../") {
        path = rest;
    }
    path.trim_start_matches('/')
}

/// First segment and the remainder with its leading `/` run removed.
fn split_segment(path: &str) -> (&str, &str) {
    match path.find('/') {
        Some(i) => (&path[..i], path[i..].trim_start_matches('/')),
        None => (path, ""),
    }
}
