//! Stream wrappers: chunked `std::io` adapters over descriptor I/O.
//!
//! A stream owns its descriptor and releases it on drop, so a stream
//! that is read halfway and discarded never leaks an open file.

use std::io;

use crate::error::Result;
use crate::fd::{Fd, OpenFlags};
use crate::fs::Memfs;

/// Byte range for [`Memfs::create_read_stream`]. `end` is inclusive,
/// matching the usual stream convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadStreamOptions {
    /// First byte offset to read. Defaults to 0.
    pub start: Option<u64>,
    /// Last byte offset to read, inclusive. Defaults to end of file.
    pub end: Option<u64>,
}

/// Chunked reader over an open descriptor.
#[derive(Debug)]
pub struct ReadStream {
    fs: Memfs,
    fd: Fd,
    pos: u64,
    /// Exclusive upper bound, when a range was requested.
    limit: Option<u64>,
    closed: bool,
}

impl ReadStream {
    /// Close the descriptor now instead of at drop.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.fs.close(self.fd)
    }
}

impl io::Read for ReadStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let want: usize = match self.limit {
            Some(limit) if self.pos >= limit => 0,
            Some(limit) => buf.len().min((limit - self.pos) as usize),
            None => buf.len(),
        };
        if want == 0 {
            return Ok(0);
        }
        let n: usize = self
            .fs
            .read(self.fd, &mut buf[..want], Some(self.pos))
            .map_err(io::Error::from)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Drop for ReadStream {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.fs.close(self.fd);
        }
    }
}

/// Chunked writer over an open descriptor.
///
/// Writes land sequentially from the start of the (truncated) file.
#[derive(Debug)]
pub struct WriteStream {
    fs: Memfs,
    fd: Fd,
    pos: u64,
    closed: bool,
}

impl WriteStream {
    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.pos
    }

    /// Close the descriptor now instead of at drop.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.fs.close(self.fd)
    }
}

impl io::Write for WriteStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n: usize = self
            .fs
            .write(self.fd, buf, Some(self.pos))
            .map_err(io::Error::from)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.fs.fsync(self.fd).map_err(io::Error::from)
    }
}

impl Drop for WriteStream {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.fs.close(self.fd);
        }
    }
}

impl Memfs {
    /// Open `path` for chunked reading, optionally over a byte range.
    pub fn create_read_stream(&self, path: &str, options: ReadStreamOptions) -> Result<ReadStream> {
        let fd: Fd = self.open(path, OpenFlags::READ)?;
        Ok(ReadStream {
            fs: self.clone(),
            fd,
            pos: options.start.unwrap_or(0),
            limit: options.end.map(|end| end + 1),
            closed: false,
        })
    }

    /// Create or replace the file at `path` and open it for chunked
    /// writing.
    pub fn create_write_stream(&self, path: &str) -> Result<WriteStream> {
        let fd: Fd = self.open(
            path,
            OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNC,
        )?;
        Ok(WriteStream {
            fs: self.clone(),
            fd,
            pos: 0,
            closed: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn test_read_stream_whole_file() {
        let fs: Memfs = Memfs::new();
        fs.write_file("/f", b"stream me").unwrap();
        let mut stream: ReadStream = fs
            .create_read_stream("/f", ReadStreamOptions::default())
            .unwrap();
        let mut out: Vec<u8> = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"stream me");
    }

    #[test]
    fn test_read_stream_range_is_inclusive() {
        let fs: Memfs = Memfs::new();
        fs.write_file("/f", b"0123456789").unwrap();
        let mut stream: ReadStream = fs
            .create_read_stream(
                "/f",
                ReadStreamOptions {
                    start: Some(2),
                    end: Some(5),
                },
            )
            .unwrap();
        let mut out: Vec<u8> = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"2345");
    }

    #[test]
    fn test_write_stream_composes_chunks() {
        let fs: Memfs = Memfs::new();
        {
            let mut stream: WriteStream = fs.create_write_stream("/f").unwrap();
            stream.write_all(b"hello ").unwrap();
            stream.write_all(b"world").unwrap();
            assert_eq!(stream.written(), 11);
        }
        assert_eq!(fs.read_file("/f").unwrap(), b"hello world");
    }

    #[test]
    fn test_drop_releases_descriptor() {
        let fs: Memfs = Memfs::new();
        fs.write_file("/f", b"x").unwrap();
        {
            let _stream: ReadStream = fs
                .create_read_stream("/f", ReadStreamOptions::default())
                .unwrap();
            // Dropped here without an explicit close.
        }
        // The unlinked inode is destroyed immediately, so no descriptor
        // was left holding it alive.
        fs.unlink("/f").unwrap();
        assert!(!fs.exists("/f"));
    }
}
