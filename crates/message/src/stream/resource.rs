//! Byte resources a [`Stream`](super::Stream) can wrap.
//!
//! A [`Resource`] is the provider boundary of the stream subsystem: it knows how to move bytes
//! and report its own mode, the stream decides what is allowed. Three resources ship with the
//! crate:
//!
//! - [`MemoryResource`]: a growable in-memory buffer, seekable, readable and writable
//! - [`FileResource`]: a file opened with an `fopen`-style mode string
//! - [`ReaderResource`]: any [`Read`] source, read-only and not seekable

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;

use super::mode::open_options;

/// Mode reported by [`MemoryResource`].
pub const MEMORY_MODE: &str = "w+b";

/// Mode reported by [`ReaderResource`].
pub const READER_MODE: &str = "rb";

/// An attachable byte resource.
pub trait Resource: fmt::Debug + Send {
    /// The `fopen`-style mode string, used to derive the stream's capabilities.
    fn mode(&self) -> &str;

    fn is_seekable(&self) -> bool;

    /// Where the bytes live, when that is a named location.
    fn uri(&self) -> Option<&str> {
        None
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;

    fn tell(&mut self) -> io::Result<u64> {
        self.seek(SeekFrom::Current(0))
    }

    /// Total size in bytes as reported by the resource, independent of the current position.
    fn stat_size(&mut self) -> io::Result<u64>;

    fn close(&mut self) -> io::Result<()>;
}

fn unsupported(op: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, format!("{op} is not supported by this resource"))
}

/// A growable in-memory buffer.
#[derive(Debug, Default)]
pub struct MemoryResource {
    buf: Cursor<Vec<u8>>,
}

impl MemoryResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer holding `content`, positioned at the start.
    pub fn with_content(content: impl AsRef<[u8]>) -> Self {
        Self { buf: Cursor::new(content.as_ref().to_vec()) }
    }
}

impl From<Bytes> for MemoryResource {
    fn from(bytes: Bytes) -> Self {
        Self { buf: Cursor::new(Vec::from(bytes)) }
    }
}

impl Resource for MemoryResource {
    fn mode(&self) -> &str {
        MEMORY_MODE
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn uri(&self) -> Option<&str> {
        Some("memory")
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.buf.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.write(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.buf.seek(pos)
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.buf.position())
    }

    fn stat_size(&mut self) -> io::Result<u64> {
        Ok(self.buf.get_ref().len() as u64)
    }

    fn close(&mut self) -> io::Result<()> {
        self.buf = Cursor::default();
        Ok(())
    }
}

/// A file on disk opened with an `fopen`-style mode (`r`, `r+`, `w`, `w+`, `a`, `a+`, `x`, `x+`,
/// `c`, `c+`, optionally with `b` or `t`).
#[derive(Debug)]
pub struct FileResource {
    file: File,
    mode: String,
    path: PathBuf,
    uri: String,
}

impl FileResource {
    pub fn open(path: impl AsRef<Path>, mode: &str) -> io::Result<Self> {
        let path = path.as_ref();
        let file = open_options(mode)?.open(path)?;
        Ok(Self { file, mode: mode.to_string(), path: path.to_path_buf(), uri: path.display().to_string() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Resource for FileResource {
    fn mode(&self) -> &str {
        &self.mode
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn uri(&self) -> Option<&str> {
        Some(&self.uri)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }

    fn stat_size(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// A forward-only source such as a socket or a pipe. Tracks how many bytes were consumed so
/// `tell` keeps working without seeking.
pub struct ReaderResource<R> {
    reader: R,
    consumed: u64,
}

impl<R: Read + Send> ReaderResource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, consumed: 0 }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R> fmt::Debug for ReaderResource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderResource").field("consumed", &self.consumed).finish_non_exhaustive()
    }
}

impl<R: Read + Send> Resource for ReaderResource<R> {
    fn mode(&self) -> &str {
        READER_MODE
    }

    fn is_seekable(&self) -> bool {
        false
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        self.consumed += n as u64;
        Ok(n)
    }

    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(unsupported("write"))
    }

    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(unsupported("seek"))
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.consumed)
    }

    fn stat_size(&mut self) -> io::Result<u64> {
        Err(unsupported("stat"))
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_read_write_seek() {
        let mut resource = MemoryResource::new();
        assert_eq!(resource.write(b"hello world").unwrap(), 11);
        assert_eq!(resource.tell().unwrap(), 11);
        assert_eq!(resource.stat_size().unwrap(), 11);

        resource.seek(SeekFrom::Start(6)).unwrap();
        let mut buf = [0u8; 16];
        let n = resource.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"world");
    }

    #[test]
    fn memory_with_content_starts_at_zero() {
        let mut resource = MemoryResource::with_content("abc");
        assert_eq!(resource.tell().unwrap(), 0);
        assert_eq!(resource.mode(), MEMORY_MODE);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");

        let mut resource = FileResource::open(&path, "w+").unwrap();
        resource.write(b"on disk").unwrap();
        assert_eq!(resource.stat_size().unwrap(), 7);
        assert_eq!(resource.uri(), Some(path.display().to_string().as_str()));

        resource.seek(SeekFrom::Start(0)).unwrap();
        let mut content = String::new();
        let mut buf = [0u8; 4];
        loop {
            let n = resource.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            content.push_str(std::str::from_utf8(&buf[..n]).unwrap());
        }
        assert_eq!(content, "on disk");
    }

    #[test]
    fn file_missing_with_read_mode() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileResource::open(dir.path().join("absent"), "r").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn reader_is_forward_only() {
        let mut resource = ReaderResource::new(&b"abcdef"[..]);
        let mut buf = [0u8; 4];

        assert_eq!(resource.read(&mut buf).unwrap(), 4);
        assert_eq!(resource.tell().unwrap(), 4);
        assert!(!resource.is_seekable());
        assert_eq!(resource.seek(SeekFrom::Start(0)).unwrap_err().kind(), io::ErrorKind::Unsupported);
        assert_eq!(resource.write(b"x").unwrap_err().kind(), io::ErrorKind::Unsupported);
    }
}
