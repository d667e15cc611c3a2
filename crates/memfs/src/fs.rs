//! The filesystem: top-level operations over the store, resolver, and
//! descriptor table.
//!
//! [`Memfs`] is a cheap-clone handle; clones share the same tree. Every
//! operation takes the single state lock once, runs to completion, and
//! either succeeds or raises exactly one [`FsError`] with no partial
//! mutation left behind. One logical agent, one lock: no operation can
//! observe another half-applied.

use std::sync::Arc;

use memfs_errno::Errno;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{FsError, Result};
use crate::fd::{Fd, FdTable, OpenFlags};
use crate::inode::{FileStat, Ino, InodeStore, Node, NodeData, NodeKind};
use crate::options::MemfsOptions;
use crate::resolver::{navigate, Resolved};

/// Chunk size for whole-file descriptor reads.
const READ_CHUNK: usize = 8192;

/// An in-memory POSIX-like filesystem.
#[derive(Debug, Clone)]
pub struct Memfs {
    inner: Arc<Mutex<FsState>>,
}

#[derive(Debug)]
struct FsState {
    store: InodeStore,
    fds: FdTable,
    options: MemfsOptions,
}

impl Memfs {
    /// Fresh filesystem holding only an empty root directory.
    pub fn new() -> Self {
        Self::with_options(MemfsOptions::default())
    }

    /// Fresh filesystem with explicit options.
    pub fn with_options(options: MemfsOptions) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FsState {
                store: InodeStore::new(options.shrink_ids),
                fds: FdTable::new(options.shrink_ids),
                options,
            })),
        }
    }

    // ========================================================================
    // Descriptor operations
    // ========================================================================

    /// Open `path`, returning a descriptor.
    pub fn open(&self, path: &str, flags: OpenFlags) -> Result<Fd> {
        self.inner.lock().open(path, flags)
    }

    /// Close a descriptor. The inode is destroyed here if the descriptor
    /// was the last thing keeping an unlinked inode alive.
    pub fn close(&self, fd: Fd) -> Result<()> {
        self.inner.lock().close(fd)
    }

    /// Read up to `buf.len()` bytes.
    ///
    /// With `position: None` the descriptor position is used and advanced
    /// by the bytes read; an explicit position leaves the descriptor
    /// position untouched. Returns 0 at or past end of file.
    pub fn read(&self, fd: Fd, buf: &mut [u8], position: Option<u64>) -> Result<usize> {
        self.inner.lock().read(fd, buf, position)
    }

    /// Write `data`, returning the bytes written.
    ///
    /// An `APPEND` descriptor writes at the current file size and moves
    /// its position to the new end regardless of `position`. Otherwise
    /// the bytes land at `position` when given, or at the descriptor
    /// position; the descriptor position itself does not move.
    pub fn write(&self, fd: Fd, data: &[u8], position: Option<u64>) -> Result<usize> {
        self.inner.lock().write(fd, data, position)
    }

    /// Metadata of the inode behind `fd`.
    pub fn fstat(&self, fd: Fd) -> Result<FileStat> {
        self.inner.lock().fstat(fd)
    }

    /// Resize the file behind a writable descriptor.
    pub fn ftruncate(&self, fd: Fd, len: u64) -> Result<()> {
        self.inner.lock().ftruncate(fd, len)
    }

    /// Set access and modification times through a descriptor.
    pub fn futimes(&self, fd: Fd, atime_ms: u64, mtime_ms: u64) -> Result<()> {
        self.inner.lock().futimes(fd, atime_ms, mtime_ms)
    }

    /// Accepted and ignored; the descriptor must be valid.
    pub fn fchmod(&self, fd: Fd, _mode: u32) -> Result<()> {
        self.inner.lock().require_fd(fd)
    }

    /// Accepted and ignored; the descriptor must be valid.
    pub fn fchown(&self, fd: Fd, _uid: u32, _gid: u32) -> Result<()> {
        self.inner.lock().require_fd(fd)
    }

    /// Nothing to flush; the descriptor must be valid.
    pub fn fsync(&self, fd: Fd) -> Result<()> {
        self.inner.lock().require_fd(fd)
    }

    /// Nothing to flush; the descriptor must be valid.
    pub fn fdatasync(&self, fd: Fd) -> Result<()> {
        self.inner.lock().require_fd(fd)
    }

    /// Read from the descriptor position to end of file, advancing it.
    pub fn read_file_fd(&self, fd: Fd) -> Result<Vec<u8>> {
        self.inner.lock().read_file_fd(fd)
    }

    /// Write the whole buffer through an open descriptor.
    pub fn write_file_fd(&self, fd: Fd, data: &[u8]) -> Result<()> {
        self.inner.lock().write(fd, data, None).map(|_| ())
    }

    // ========================================================================
    // Path operations
    // ========================================================================

    /// Metadata for `path`, following a final symlink.
    pub fn stat(&self, path: &str) -> Result<FileStat> {
        self.inner.lock().stat(path, true)
    }

    /// Metadata for `path` without following a final symlink.
    pub fn lstat(&self, path: &str) -> Result<FileStat> {
        self.inner.lock().stat(path, false)
    }

    /// Whether `path` names anything. Never raises.
    pub fn exists(&self, path: &str) -> bool {
        let state = self.inner.lock();
        match navigate(&state.store, path, true) {
            Ok(nav) => nav.target.is_some(),
            Err(_) => false,
        }
    }

    /// Existence check; every inode carries mode `0o777`, so any
    /// requested access is granted on anything that resolves.
    pub fn access(&self, path: &str, _mode: u32) -> Result<()> {
        self.inner.lock().require_target(path, true).map(|_| ())
    }

    /// Create a directory.
    pub fn mkdir(&self, path: &str) -> Result<()> {
        self.inner.lock().mkdir(path)
    }

    /// Create a directory and any missing ancestors.
    pub fn mkdirp(&self, path: &str) -> Result<()> {
        self.inner.lock().mkdirp(path)
    }

    /// Remove an empty directory.
    pub fn rmdir(&self, path: &str) -> Result<()> {
        self.inner.lock().rmdir(path)
    }

    /// Remove a directory entry. Removing a symlink never touches its
    /// target.
    pub fn unlink(&self, path: &str) -> Result<()> {
        self.inner.lock().unlink(path)
    }

    /// Create a hard link: `new_path` becomes another name for the inode
    /// behind `existing`.
    pub fn link(&self, existing: &str, new_path: &str) -> Result<()> {
        self.inner.lock().link(existing, new_path)
    }

    /// Create a symbolic link at `path` pointing at `target`.
    pub fn symlink(&self, target: &str, path: &str) -> Result<()> {
        self.inner.lock().symlink(target, path)
    }

    /// The target string of a symlink.
    pub fn read_link(&self, path: &str) -> Result<String> {
        self.inner.lock().read_link(path)
    }

    /// Move and/or rename.
    pub fn rename(&self, old_path: &str, new_path: &str) -> Result<()> {
        self.inner.lock().rename(old_path, new_path)
    }

    /// Entry names in insertion order, `.` and `..` excluded.
    pub fn readdir(&self, path: &str) -> Result<Vec<String>> {
        self.inner.lock().readdir(path)
    }

    /// Whole-file read, following symlinks.
    pub fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        self.inner.lock().read_file(path)
    }

    /// Create or replace the file at `path` with `data`.
    pub fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.inner.lock().write_file(path, data)
    }

    /// Append `data` to the file at `path`, creating it if missing.
    pub fn append_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.inner.lock().append_file(path, data)
    }

    /// Resize the file at `path`.
    pub fn truncate(&self, path: &str, len: u64) -> Result<()> {
        self.inner.lock().truncate(path, len)
    }

    /// Accepted and ignored; the path must resolve.
    pub fn chmod(&self, path: &str, _mode: u32) -> Result<()> {
        self.inner.lock().require_target(path, true).map(|_| ())
    }

    /// Accepted and ignored; the path must resolve to a symlink or
    /// anything else, unfollowed.
    pub fn lchmod(&self, path: &str, _mode: u32) -> Result<()> {
        self.inner.lock().require_target(path, false).map(|_| ())
    }

    /// Accepted and ignored; the path must resolve.
    pub fn chown(&self, path: &str, _uid: u32, _gid: u32) -> Result<()> {
        self.inner.lock().require_target(path, true).map(|_| ())
    }

    /// Accepted and ignored; the final symlink is not followed.
    pub fn lchown(&self, path: &str, _uid: u32, _gid: u32) -> Result<()> {
        self.inner.lock().require_target(path, false).map(|_| ())
    }

    /// Set access and modification times (milliseconds since epoch).
    pub fn utimes(&self, path: &str, atime_ms: u64, mtime_ms: u64) -> Result<()> {
        self.inner.lock().utimes(path, atime_ms, mtime_ms)
    }
}

impl Default for Memfs {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Core implementation, one lock-holder at a time
// ============================================================================

impl FsState {
    fn require_fd(&self, fd: Fd) -> Result<()> {
        self.fds
            .get(fd)
            .map(|_| ())
            .ok_or_else(|| FsError::bare(Errno::EBADF))
    }

    /// Resolve `path` all the way to an inode or fail with `ENOENT`.
    fn require_target(&self, path: &str, resolve_last: bool) -> Result<Ino> {
        let nav: Resolved = navigate(&self.store, path, resolve_last)?;
        nav.target
            .ok_or_else(|| FsError::path(Errno::ENOENT, path))
    }

    fn node(&self, ino: Ino) -> &Node {
        self.store.get(ino).expect("resolved inode is live")
    }

    /// Place a freshly created inode under `dir`. The create call already
    /// counted this one name, so the insert is non-counting.
    fn attach_new(&mut self, dir: Ino, name: &str, ino: Ino) {
        self.store
            .get_mut(dir)
            .and_then(Node::as_dir_mut)
            .expect("attach parent is a directory")
            .insert(name, ino);
    }

    fn open(&mut self, path: &str, flags: OpenFlags) -> Result<Fd> {
        let mut nav: Resolved = navigate(&self.store, path, false)?;

        if let Some(ino) = nav.target {
            if self.node(ino).kind() == NodeKind::Symlink {
                if flags.contains(OpenFlags::NOFOLLOW) {
                    return Err(FsError::path(Errno::ELOOP, path));
                }
                if flags.contains(OpenFlags::CREATE | OpenFlags::EXCL) {
                    return Err(FsError::path(Errno::EEXIST, path));
                }
                nav = navigate(&self.store, path, true)?;
            }
        }

        let ino: Ino = match (nav.target, nav.name) {
            (Some(ino), _) => {
                if flags.contains(OpenFlags::CREATE | OpenFlags::EXCL) {
                    return Err(FsError::path(Errno::EEXIST, path));
                }
                let node: &Node = self.node(ino);
                if node.kind() == NodeKind::Directory {
                    if flags.writable() {
                        return Err(FsError::path(Errno::EISDIR, path));
                    }
                } else if flags.contains(OpenFlags::DIRECTORY) {
                    return Err(FsError::path(Errno::ENOTDIR, path));
                }
                if flags.contains(OpenFlags::TRUNC) && flags.writable() {
                    let node: &mut Node = self.store.get_mut(ino).expect("resolved inode is live");
                    let truncated: bool = match node.as_file_mut() {
                        Some(file) => {
                            file.truncate(0);
                            true
                        }
                        None => false,
                    };
                    if truncated {
                        node.meta.touch_mtime();
                    }
                }
                ino
            }
            (None, Some(name)) => {
                // Name is free under nav.dir; only O_CREAT may claim it.
                if !flags.contains(OpenFlags::CREATE) {
                    return Err(FsError::path(Errno::ENOENT, path));
                }
                let ino: Ino = self.store.create_file(Vec::new());
                self.attach_new(nav.dir, &name, ino);
                debug!(path, ino, "file created via open");
                ino
            }
            (None, None) => return Err(FsError::path(Errno::ENOENT, path)),
        };

        self.store.open_ref(ino);
        Ok(self.fds.insert(ino, flags))
    }

    fn close(&mut self, fd: Fd) -> Result<()> {
        let desc = self.fds.remove(fd).ok_or_else(|| FsError::bare(Errno::EBADF))?;
        self.store.close_ref(desc.ino);
        Ok(())
    }

    fn read(&mut self, fd: Fd, buf: &mut [u8], position: Option<u64>) -> Result<usize> {
        let desc = self
            .fds
            .get(fd)
            .cloned()
            .ok_or_else(|| FsError::bare(Errno::EBADF))?;
        if !desc.flags.readable() {
            return Err(FsError::bare(Errno::EBADF));
        }
        let node: &mut Node = self
            .store
            .get_mut(desc.ino)
            .ok_or_else(|| FsError::bare(Errno::EBADF))?;
        let read: usize = match &node.data {
            NodeData::Dir(_) => return Err(FsError::bare(Errno::EISDIR)),
            NodeData::Symlink(_) => return Err(FsError::bare(Errno::EBADF)),
            NodeData::File(file) => {
                let pos: u64 = position.unwrap_or(desc.position);
                file.read_at(pos, buf)
            }
        };
        node.meta.touch_atime();
        if position.is_none() {
            let desc = self.fds.get_mut(fd).expect("descriptor checked above");
            desc.position += read as u64;
        }
        Ok(read)
    }

    fn write(&mut self, fd: Fd, data: &[u8], position: Option<u64>) -> Result<usize> {
        let desc = self
            .fds
            .get(fd)
            .cloned()
            .ok_or_else(|| FsError::bare(Errno::EBADF))?;
        if !desc.flags.writable() {
            return Err(FsError::bare(Errno::EBADF));
        }
        let max_file_size: usize = self.options.max_file_size;
        let node: &mut Node = self
            .store
            .get_mut(desc.ino)
            .ok_or_else(|| FsError::bare(Errno::EBADF))?;
        let file = match node.as_file_mut() {
            Some(file) => file,
            // Writable descriptors only ever reference regular files.
            None => return Err(FsError::bare(Errno::EBADF)),
        };

        let append: bool = desc.flags.contains(OpenFlags::APPEND);
        let pos: u64 = if append {
            file.size()
        } else {
            position.unwrap_or(desc.position)
        };
        let start: usize = usize::try_from(pos).map_err(|_| FsError::bare(Errno::ENOSPC))?;
        let end: usize = start
            .checked_add(data.len())
            .ok_or_else(|| FsError::bare(Errno::ENOSPC))?;
        if end > max_file_size {
            return Err(FsError::bare(Errno::ENOSPC));
        }

        let new_size: u64 = file.write_at(pos, data);
        node.meta.touch_mtime();
        if append {
            let desc = self.fds.get_mut(fd).expect("descriptor checked above");
            desc.position = new_size;
        }
        Ok(data.len())
    }

    fn fstat(&self, fd: Fd) -> Result<FileStat> {
        let desc = self.fds.get(fd).ok_or_else(|| FsError::bare(Errno::EBADF))?;
        Ok(self.node(desc.ino).stat())
    }

    fn ftruncate(&mut self, fd: Fd, len: u64) -> Result<()> {
        let desc = self
            .fds
            .get(fd)
            .cloned()
            .ok_or_else(|| FsError::bare(Errno::EBADF))?;
        if !desc.flags.writable() {
            return Err(FsError::bare(Errno::EINVAL));
        }
        if usize::try_from(len).map_or(true, |len| len > self.options.max_file_size) {
            return Err(FsError::bare(Errno::ENOSPC));
        }
        let node: &mut Node = self
            .store
            .get_mut(desc.ino)
            .ok_or_else(|| FsError::bare(Errno::EBADF))?;
        match node.as_file_mut() {
            Some(file) => file.truncate(len),
            None => return Err(FsError::bare(Errno::EBADF)),
        }
        node.meta.touch_mtime();
        Ok(())
    }

    fn futimes(&mut self, fd: Fd, atime_ms: u64, mtime_ms: u64) -> Result<()> {
        let desc = self.fds.get(fd).cloned().ok_or_else(|| FsError::bare(Errno::EBADF))?;
        let node: &mut Node = self
            .store
            .get_mut(desc.ino)
            .ok_or_else(|| FsError::bare(Errno::EBADF))?;
        node.meta.atime = atime_ms;
        node.meta.mtime = mtime_ms;
        node.meta.touch_ctime();
        Ok(())
    }

    fn read_file_fd(&mut self, fd: Fd) -> Result<Vec<u8>> {
        let mut out: Vec<u8> = Vec::new();
        let mut chunk: [u8; READ_CHUNK] = [0; READ_CHUNK];
        loop {
            let n: usize = self.read(fd, &mut chunk, None)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }

    fn stat(&self, path: &str, resolve_last: bool) -> Result<FileStat> {
        let ino: Ino = self.require_target(path, resolve_last)?;
        Ok(self.node(ino).stat())
    }

    fn mkdir(&mut self, path: &str) -> Result<()> {
        let nav: Resolved = navigate(&self.store, path, false)?;
        if nav.target.is_some() {
            return Err(FsError::path(Errno::EEXIST, path));
        }
        let name: String = match nav.name {
            Some(name) => name,
            None => return Err(FsError::path(Errno::ENOENT, path)),
        };
        let ino: Ino = self.store.create_dir(nav.dir);
        self.attach_new(nav.dir, &name, ino);
        debug!(path, ino, "directory created");
        Ok(())
    }

    fn mkdirp(&mut self, path: &str) -> Result<()> {
        if path.is_empty() {
            return Err(FsError::path(Errno::ENOENT, path));
        }
        let mut cur: Ino = self.store.root();
        let canonical: String = crate::resolver::canonicalize(path).to_string();
        for seg in canonical.split('/').filter(|seg| !seg.is_empty()) {
            let existing: Option<Ino> = self
                .node(cur)
                .as_dir()
                .expect("mkdirp walk position is a directory")
                .get(seg);
            match existing {
                Some(child) => {
                    if self.node(child).kind() != NodeKind::Directory {
                        return Err(FsError::path(Errno::ENOTDIR, path));
                    }
                    cur = child;
                }
                None => {
                    let ino: Ino = self.store.create_dir(cur);
                    self.attach_new(cur, seg, ino);
                    cur = ino;
                }
            }
        }
        Ok(())
    }

    fn rmdir(&mut self, path: &str) -> Result<()> {
        let nav: Resolved = navigate(&self.store, path, false)?;
        let ino: Ino = nav.target.ok_or_else(|| FsError::path(Errno::ENOENT, path))?;
        let node: &Node = self.node(ino);
        let dir = match node.as_dir() {
            Some(dir) => dir,
            None => return Err(FsError::path(Errno::ENOTDIR, path)),
        };
        if ino == self.store.root() {
            return Err(FsError::path(Errno::EBUSY, path));
        }
        if !dir.is_empty() {
            return Err(FsError::path(Errno::ENOTEMPTY, path));
        }
        let name: String = nav.name.expect("non-root directory has a name");
        if name == "." || name == ".." {
            return Err(FsError::path(Errno::EINVAL, path));
        }
        self.store
            .get_mut(nav.dir)
            .and_then(Node::as_dir_mut)
            .expect("rmdir parent is a directory")
            .remove(&name);
        // Once for the parent entry, once for the `.` self link.
        self.store.unlink(ino);
        self.store.unlink(ino);
        debug!(path, ino, "directory removed");
        Ok(())
    }

    fn unlink(&mut self, path: &str) -> Result<()> {
        let nav: Resolved = navigate(&self.store, path, false)?;
        let ino: Ino = nav.target.ok_or_else(|| FsError::path(Errno::ENOENT, path))?;
        if self.node(ino).kind() == NodeKind::Directory {
            return Err(FsError::path(Errno::EISDIR, path));
        }
        let name: String = nav.name.expect("bound non-directory has a name");
        self.store
            .get_mut(nav.dir)
            .and_then(Node::as_dir_mut)
            .expect("unlink parent is a directory")
            .remove(&name);
        self.store.unlink(ino);
        debug!(path, ino, "entry unlinked");
        Ok(())
    }

    fn link(&mut self, existing: &str, new_path: &str) -> Result<()> {
        let src_nav: Resolved = navigate(&self.store, existing, false)?;
        let src: Ino = src_nav
            .target
            .ok_or_else(|| FsError::paths(Errno::ENOENT, existing, new_path))?;
        if self.node(src).kind() == NodeKind::Directory {
            return Err(FsError::paths(Errno::EPERM, existing, new_path));
        }
        let new_nav: Resolved = navigate(&self.store, new_path, false)?;
        if new_nav.target.is_some() {
            return Err(FsError::paths(Errno::EEXIST, existing, new_path));
        }
        let name: String = new_nav
            .name
            .ok_or_else(|| FsError::paths(Errno::ENOENT, existing, new_path))?;
        self.store
            .get_mut(new_nav.dir)
            .and_then(Node::as_dir_mut)
            .expect("link parent is a directory")
            .insert(name, src);
        self.store.link(src);
        debug!(existing, new_path, "hard link created");
        Ok(())
    }

    fn symlink(&mut self, target: &str, path: &str) -> Result<()> {
        if target.is_empty() {
            return Err(FsError::paths(Errno::ENOENT, target, path));
        }
        let nav: Resolved = navigate(&self.store, path, false)?;
        if nav.target.is_some() {
            return Err(FsError::paths(Errno::EEXIST, target, path));
        }
        let name: String = nav
            .name
            .ok_or_else(|| FsError::paths(Errno::ENOENT, target, path))?;
        let ino: Ino = self.store.create_symlink(target);
        self.attach_new(nav.dir, &name, ino);
        debug!(path, ino, link_target = target, "symlink created");
        Ok(())
    }

    fn read_link(&self, path: &str) -> Result<String> {
        let ino: Ino = self.require_target(path, false)?;
        match self.node(ino).as_symlink() {
            Some(link) => Ok(link.target().to_string()),
            None => Err(FsError::path(Errno::EINVAL, path)),
        }
    }

    fn rename(&mut self, old_path: &str, new_path: &str) -> Result<()> {
        let old_nav: Resolved = navigate(&self.store, old_path, false)?;
        let src: Ino = old_nav
            .target
            .ok_or_else(|| FsError::paths(Errno::ENOENT, old_path, new_path))?;
        let old_name: String = match old_nav.name {
            Some(name) => name,
            None => return Err(FsError::paths(Errno::EBUSY, old_path, new_path)),
        };
        if old_name == "." || old_name == ".." {
            return Err(FsError::paths(Errno::EINVAL, old_path, new_path));
        }
        let src_is_dir: bool = self.node(src).kind() == NodeKind::Directory;

        let new_nav: Resolved = navigate(&self.store, new_path, false)?;
        let new_name: String = match new_nav.name {
            Some(name) => name,
            None => {
                // Root when bound, missing intermediate otherwise.
                let errno: Errno = if new_nav.target.is_some() {
                    Errno::EBUSY
                } else {
                    Errno::ENOENT
                };
                return Err(FsError::paths(errno, old_path, new_path));
            }
        };
        if new_name == "." || new_name == ".." {
            return Err(FsError::paths(Errno::EINVAL, old_path, new_path));
        }

        if let Some(dst) = new_nav.target {
            if dst == src {
                // Both names already refer to the same inode.
                return Ok(());
            }
            let dst_is_dir: bool = self.node(dst).kind() == NodeKind::Directory;
            if !src_is_dir && dst_is_dir {
                return Err(FsError::paths(Errno::EISDIR, old_path, new_path));
            }
            if src_is_dir && !dst_is_dir {
                return Err(FsError::paths(Errno::ENOTDIR, old_path, new_path));
            }
            if dst_is_dir && !self.node(dst).as_dir().expect("checked directory").is_empty() {
                return Err(FsError::paths(Errno::ENOTEMPTY, old_path, new_path));
            }
            self.store
                .get_mut(new_nav.dir)
                .and_then(Node::as_dir_mut)
                .expect("rename target parent is a directory")
                .remove(&new_name);
            self.store.unlink(dst);
            if dst_is_dir {
                // Drop the overwritten directory's `.` self link as well.
                self.store.unlink(dst);
            }
        }

        if old_nav.dir == new_nav.dir {
            // In-place rename keeps the entry's listing position.
            self.store
                .get_mut(old_nav.dir)
                .and_then(Node::as_dir_mut)
                .expect("rename parent is a directory")
                .rename_entry(&old_name, new_name.as_str());
        } else {
            self.store
                .get_mut(old_nav.dir)
                .and_then(Node::as_dir_mut)
                .expect("rename source parent is a directory")
                .remove(&old_name);
            self.store
                .get_mut(new_nav.dir)
                .and_then(Node::as_dir_mut)
                .expect("rename target parent is a directory")
                .insert(new_name.as_str(), src);
            if src_is_dir {
                self.store
                    .get_mut(src)
                    .and_then(Node::as_dir_mut)
                    .expect("moved inode is a directory")
                    .set_parent(new_nav.dir);
            }
        }
        if let Some(node) = self.store.get_mut(src) {
            node.meta.touch_ctime();
        }
        debug!(old_path, new_path, "renamed");
        Ok(())
    }

    fn readdir(&mut self, path: &str) -> Result<Vec<String>> {
        let nav: Resolved = navigate(&self.store, path, false)?;
        let ino: Ino = nav.target.ok_or_else(|| FsError::path(Errno::ENOENT, path))?;
        let node: &mut Node = self.store.get_mut(ino).expect("resolved inode is live");
        // A terminating symlink is never followed here, even with a
        // trailing slash.
        let names: Vec<String> = match node.as_dir() {
            Some(dir) => dir.names(),
            None => return Err(FsError::path(Errno::ENOTDIR, path)),
        };
        node.meta.touch_atime();
        Ok(names)
    }

    fn read_file(&mut self, path: &str) -> Result<Vec<u8>> {
        let ino: Ino = self.require_target(path, true)?;
        let node: &mut Node = self.store.get_mut(ino).expect("resolved inode is live");
        match &node.data {
            NodeData::File(file) => {
                let data: Vec<u8> = file.read();
                node.meta.touch_atime();
                Ok(data)
            }
            _ => Err(FsError::path(Errno::EISDIR, path)),
        }
    }

    fn write_file(&mut self, path: &str, data: &[u8]) -> Result<()> {
        if data.len() > self.options.max_file_size {
            return Err(FsError::bare(Errno::ENOSPC));
        }
        let nav: Resolved = navigate(&self.store, path, true)?;
        match (nav.target, nav.name) {
            (Some(ino), _) => {
                let node: &mut Node = self.store.get_mut(ino).expect("resolved inode is live");
                match node.as_file_mut() {
                    Some(file) => file.write(data.to_vec()),
                    None => return Err(FsError::path(Errno::EISDIR, path)),
                }
                node.meta.touch_mtime();
            }
            (None, Some(name)) => {
                let ino: Ino = self.store.create_file(data.to_vec());
                self.attach_new(nav.dir, &name, ino);
                debug!(path, ino, "file created");
            }
            (None, None) => return Err(FsError::path(Errno::ENOENT, path)),
        }
        Ok(())
    }

    fn append_file(&mut self, path: &str, data: &[u8]) -> Result<()> {
        let nav: Resolved = navigate(&self.store, path, true)?;
        match (nav.target, nav.name) {
            (Some(ino), _) => {
                let max_file_size: usize = self.options.max_file_size;
                let node: &mut Node = self.store.get_mut(ino).expect("resolved inode is live");
                let file = match node.as_file_mut() {
                    Some(file) => file,
                    None => return Err(FsError::path(Errno::EISDIR, path)),
                };
                let size: u64 = file.size();
                let grown: Option<usize> = usize::try_from(size)
                    .ok()
                    .and_then(|size| size.checked_add(data.len()));
                match grown {
                    Some(grown) if grown <= max_file_size => {}
                    _ => return Err(FsError::bare(Errno::ENOSPC)),
                }
                file.write_at(size, data);
                node.meta.touch_mtime();
            }
            (None, Some(name)) => {
                if data.len() > self.options.max_file_size {
                    return Err(FsError::bare(Errno::ENOSPC));
                }
                let ino: Ino = self.store.create_file(data.to_vec());
                self.attach_new(nav.dir, &name, ino);
                debug!(path, ino, "file created");
            }
            (None, None) => return Err(FsError::path(Errno::ENOENT, path)),
        }
        Ok(())
    }

    fn truncate(&mut self, path: &str, len: u64) -> Result<()> {
        let ino: Ino = self.require_target(path, true)?;
        if usize::try_from(len).map_or(true, |len| len > self.options.max_file_size) {
            return Err(FsError::bare(Errno::ENOSPC));
        }
        let node: &mut Node = self.store.get_mut(ino).expect("resolved inode is live");
        match node.as_file_mut() {
            Some(file) => file.truncate(len),
            None => return Err(FsError::path(Errno::EISDIR, path)),
        }
        node.meta.touch_mtime();
        Ok(())
    }

    fn utimes(&mut self, path: &str, atime_ms: u64, mtime_ms: u64) -> Result<()> {
        let ino: Ino = self.require_target(path, true)?;
        let node: &mut Node = self.store.get_mut(ino).expect("resolved inode is live");
        node.meta.atime = atime_ms;
        node.meta.mtime = mtime_ms;
        node.meta.touch_ctime();
        Ok(())
    }
}
