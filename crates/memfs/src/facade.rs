//! Callback-style call surface.
//!
//! Every filesystem operation exists a second time in `(args, callback)`
//! form. The core op runs synchronously under the state lock; the
//! callback is queued and only runs when [`CallbackFs::run_pending`]
//! drains the queue, so a callback never executes before the call that
//! scheduled it has returned. Draining is FIFO, one scheduler tick.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::fd::{Fd, OpenFlags};
use crate::fs::Memfs;
use crate::inode::FileStat;

type Deferred = Box<dyn FnOnce() + Send>;

/// A [`Memfs`] handle with deferred-callback forms of every operation.
#[derive(Clone)]
pub struct CallbackFs {
    fs: Memfs,
    pending: Arc<Mutex<VecDeque<Deferred>>>,
}

impl CallbackFs {
    /// Wrap a filesystem handle. Clones share the callback queue.
    pub fn new(fs: Memfs) -> Self {
        Self {
            fs,
            pending: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// The wrapped synchronous handle.
    pub fn sync(&self) -> &Memfs {
        &self.fs
    }

    /// Run queued callbacks in FIFO order until the queue is empty,
    /// including callbacks queued while draining. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran: usize = 0;
        loop {
            let next: Option<Deferred> = self.pending.lock().pop_front();
            match next {
                Some(cb) => {
                    cb();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Number of callbacks waiting for the next tick.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    fn defer(&self, cb: impl FnOnce() + Send + 'static) {
        self.pending.lock().push_back(Box::new(cb));
    }

    // ========================================================================
    // Deferred forms
    // ========================================================================

    pub fn open(&self, path: &str, flags: OpenFlags, cb: impl FnOnce(Result<Fd>) + Send + 'static) {
        let result: Result<Fd> = self.fs.open(path, flags);
        self.defer(move || cb(result));
    }

    pub fn close(&self, fd: Fd, cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.close(fd);
        self.defer(move || cb(result));
    }

    /// Read up to `len` bytes; the callback receives the bytes actually
    /// read, empty at end of file.
    pub fn read(
        &self,
        fd: Fd,
        len: usize,
        position: Option<u64>,
        cb: impl FnOnce(Result<Vec<u8>>) + Send + 'static,
    ) {
        let mut buf: Vec<u8> = vec![0; len];
        let result: Result<Vec<u8>> = self.fs.read(fd, &mut buf, position).map(|n| {
            buf.truncate(n);
            buf
        });
        self.defer(move || cb(result));
    }

    pub fn write(
        &self,
        fd: Fd,
        data: &[u8],
        position: Option<u64>,
        cb: impl FnOnce(Result<usize>) + Send + 'static,
    ) {
        let result: Result<usize> = self.fs.write(fd, data, position);
        self.defer(move || cb(result));
    }

    pub fn fstat(&self, fd: Fd, cb: impl FnOnce(Result<FileStat>) + Send + 'static) {
        let result: Result<FileStat> = self.fs.fstat(fd);
        self.defer(move || cb(result));
    }

    pub fn ftruncate(&self, fd: Fd, len: u64, cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.ftruncate(fd, len);
        self.defer(move || cb(result));
    }

    pub fn futimes(
        &self,
        fd: Fd,
        atime_ms: u64,
        mtime_ms: u64,
        cb: impl FnOnce(Result<()>) + Send + 'static,
    ) {
        let result: Result<()> = self.fs.futimes(fd, atime_ms, mtime_ms);
        self.defer(move || cb(result));
    }

    pub fn fchmod(&self, fd: Fd, mode: u32, cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.fchmod(fd, mode);
        self.defer(move || cb(result));
    }

    pub fn fchown(&self, fd: Fd, uid: u32, gid: u32, cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.fchown(fd, uid, gid);
        self.defer(move || cb(result));
    }

    pub fn fsync(&self, fd: Fd, cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.fsync(fd);
        self.defer(move || cb(result));
    }

    pub fn fdatasync(&self, fd: Fd, cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.fdatasync(fd);
        self.defer(move || cb(result));
    }

    pub fn stat(&self, path: &str, cb: impl FnOnce(Result<FileStat>) + Send + 'static) {
        let result: Result<FileStat> = self.fs.stat(path);
        self.defer(move || cb(result));
    }

    pub fn lstat(&self, path: &str, cb: impl FnOnce(Result<FileStat>) + Send + 'static) {
        let result: Result<FileStat> = self.fs.lstat(path);
        self.defer(move || cb(result));
    }

    pub fn exists(&self, path: &str, cb: impl FnOnce(bool) + Send + 'static) {
        let found: bool = self.fs.exists(path);
        self.defer(move || cb(found));
    }

    pub fn access(&self, path: &str, mode: u32, cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.access(path, mode);
        self.defer(move || cb(result));
    }

    pub fn mkdir(&self, path: &str, cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.mkdir(path);
        self.defer(move || cb(result));
    }

    pub fn mkdirp(&self, path: &str, cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.mkdirp(path);
        self.defer(move || cb(result));
    }

    pub fn rmdir(&self, path: &str, cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.rmdir(path);
        self.defer(move || cb(result));
    }

    pub fn unlink(&self, path: &str, cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.unlink(path);
        self.defer(move || cb(result));
    }

    pub fn link(
        &self,
        existing: &str,
        new_path: &str,
        cb: impl FnOnce(Result<()>) + Send + 'static,
    ) {
        let result: Result<()> = self.fs.link(existing, new_path);
        self.defer(move || cb(result));
    }

    pub fn symlink(&self, target: &str, path: &str, cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.symlink(target, path);
        self.defer(move || cb(result));
    }

    pub fn read_link(&self, path: &str, cb: impl FnOnce(Result<String>) + Send + 'static) {
        let result: Result<String> = self.fs.read_link(path);
        self.defer(move || cb(result));
    }

    pub fn rename(
        &self,
        old_path: &str,
        new_path: &str,
        cb: impl FnOnce(Result<()>) + Send + 'static,
    ) {
        let result: Result<()> = self.fs.rename(old_path, new_path);
        self.defer(move || cb(result));
    }

    pub fn readdir(&self, path: &str, cb: impl FnOnce(Result<Vec<String>>) + Send + 'static) {
        let result: Result<Vec<String>> = self.fs.readdir(path);
        self.defer(move || cb(result));
    }

    pub fn read_file(&self, path: &str, cb: impl FnOnce(Result<Vec<u8>>) + Send + 'static) {
        let result: Result<Vec<u8>> = self.fs.read_file(path);
        self.defer(move || cb(result));
    }

    pub fn write_file(&self, path: &str, data: &[u8], cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.write_file(path, data);
        self.defer(move || cb(result));
    }

    pub fn append_file(
        &self,
        path: &str,
        data: &[u8],
        cb: impl FnOnce(Result<()>) + Send + 'static,
    ) {
        let result: Result<()> = self.fs.append_file(path, data);
        self.defer(move || cb(result));
    }

    pub fn truncate(&self, path: &str, len: u64, cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.truncate(path, len);
        self.defer(move || cb(result));
    }

    pub fn chmod(&self, path: &str, mode: u32, cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.chmod(path, mode);
        self.defer(move || cb(result));
    }

    pub fn lchmod(&self, path: &str, mode: u32, cb: impl FnOnce(Result<()>) + Send + 'static) {
        let result: Result<()> = self.fs.lchmod(path, mode);
        self.defer(move || cb(result));
    }

    pub fn chown(
        &self,
        path: &str,
        uid: u32,
        gid: u32,
        cb: impl FnOnce(Result<()>) + Send + 'static,
    ) {
        let result: Result<()> = self.fs.chown(path, uid, gid);
        self.defer(move || cb(result));
    }

    pub fn lchown(
        &self,
        path: &str,
        uid: u32,
        gid: u32,
        cb: impl FnOnce(Result<()>) + Send + 'static,
    ) {
        let result: Result<()> = self.fs.lchown(path, uid, gid);
        self.defer(move || cb(result));
    }

    pub fn utimes(
        &self,
        path: &str,
        atime_ms: u64,
        mtime_ms: u64,
        cb: impl FnOnce(Result<()>) + Send + 'static,
    ) {
        let result: Result<()> = self.fs.utimes(path, atime_ms, mtime_ms);
        self.defer(move || cb(result));
    }
}
