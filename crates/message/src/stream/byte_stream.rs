use std::io::{self, SeekFrom};

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace, warn};

use super::mode::AccessMode;
use super::resource::Resource;
use super::StreamError;
use crate::ensure;

const READ_CHUNK: usize = 8 * 1024;

/// What a stream remembers about its resource from the moment it was attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMetadata {
    mode: String,
    seekable: bool,
    uri: Option<String>,
}

impl StreamMetadata {
    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn is_seekable(&self) -> bool {
        self.seekable
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

/// A byte stream over at most one [`Resource`].
///
/// A stream is in one of three states:
///
/// - unattached: no resource and no metadata, every I/O operation fails with
///   [`StreamError::Detached`]
/// - attached: a resource is wrapped and its capabilities were captured from its mode
/// - closed: the resource was released by [`Stream::close`], the metadata is kept but I/O fails
///   with [`StreamError::Detached`]
///
/// [`Stream::detach`] takes an attached or closed stream back to unattached.
#[derive(Debug, Default)]
pub struct Stream {
    resource: Option<Box<dyn Resource>>,
    metadata: Option<StreamMetadata>,
    access: AccessMode,
    size: Option<u64>,
    eof: bool,
}

impl Stream {
    /// An unattached stream.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_resource<R: Resource + 'static>(resource: R) -> Self {
        let mut stream = Self::new();
        stream.attach(Box::new(resource));
        stream
    }

    /// Wraps `resource`, capturing its mode and seekability. Any previously attached resource is
    /// handed back without being closed.
    pub fn attach(&mut self, resource: Box<dyn Resource>) -> Option<Box<dyn Resource>> {
        let metadata = StreamMetadata {
            mode: resource.mode().to_string(),
            seekable: resource.is_seekable(),
            uri: resource.uri().map(str::to_string),
        };
        debug!(mode = metadata.mode.as_str(), seekable = metadata.seekable, "attach stream resource");

        self.access = AccessMode::parse(&metadata.mode);
        self.metadata = Some(metadata);
        self.size = None;
        self.eof = false;

        let previous = self.resource.replace(resource);
        if previous.is_some() {
            warn!("attached over an existing resource, returning the previous one");
        }
        previous
    }

    /// Removes the resource and forgets everything known about it.
    pub fn detach(&mut self) -> Option<Box<dyn Resource>> {
        let resource = self.resource.take();
        debug!(attached = resource.is_some(), "detach stream resource");

        self.metadata = None;
        self.access = AccessMode::default();
        self.size = None;
        self.eof = false;
        resource
    }

    /// Releases the resource. The metadata stays readable, further I/O fails.
    pub fn close(&mut self) -> Result<(), StreamError> {
        if let Some(mut resource) = self.resource.take() {
            debug!("close stream resource");
            resource.close()?;
        }
        Ok(())
    }

    pub fn is_attached(&self) -> bool {
        self.resource.is_some()
    }

    pub fn is_readable(&self) -> bool {
        self.access.is_readable()
    }

    pub fn is_writable(&self) -> bool {
        self.access.is_writable()
    }

    pub fn is_seekable(&self) -> bool {
        self.metadata.as_ref().is_some_and(StreamMetadata::is_seekable)
    }

    pub fn metadata(&self) -> Option<&StreamMetadata> {
        self.metadata.as_ref()
    }

    /// The total size in bytes, `None` when it cannot be known.
    ///
    /// Only seekable resources are asked, and their answer is cached until the next write.
    pub fn size(&mut self) -> Option<u64> {
        if self.size.is_some() {
            return self.size;
        }
        if !self.is_seekable() {
            return None;
        }

        let resource = self.resource.as_mut()?;
        match resource.stat_size() {
            Ok(size) => {
                self.size = Some(size);
                self.size
            }
            Err(e) => {
                trace!(cause = %e, "stat stream resource failed");
                None
            }
        }
    }

    pub fn tell(&mut self) -> Result<u64, StreamError> {
        Ok(self.resource()?.tell()?)
    }

    /// True once a read hit the end of the resource, or when nothing is attached.
    pub fn eof(&self) -> bool {
        self.resource.is_none() || self.eof
    }

    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, StreamError> {
        self.resource()?;
        ensure!(self.is_seekable(), StreamError::NotSeekable);

        let offset = self.resource()?.seek(pos)?;
        self.eof = false;
        Ok(offset)
    }

    pub fn rewind(&mut self) -> Result<(), StreamError> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Reads up to `len` bytes, fewer only when the end of the resource is reached.
    ///
    /// The buffer grows with what is actually read, so `len` may exceed the available content.
    pub fn read(&mut self, len: usize) -> Result<Bytes, StreamError> {
        // a zero-length read still has to be checked against the captured capabilities
        if len == 0 {
            self.read_into(&mut [])?;
            return Ok(Bytes::new());
        }

        let mut out = BytesMut::with_capacity(len.min(READ_CHUNK));
        let mut chunk = [0u8; READ_CHUNK];

        while out.len() < len {
            let wanted = (len - out.len()).min(READ_CHUNK);
            let n = self.read_into(&mut chunk[..wanted])?;
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }

        trace!(requested = len, read = out.len(), "read from stream");
        Ok(out.freeze())
    }

    /// Writes all of `data`, returning the number of bytes written.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, StreamError> {
        self.resource()?;
        ensure!(self.is_writable(), StreamError::NotWritable);

        // bytes may reach the resource even when the write fails part way
        self.size = None;
        self.eof = false;

        let resource = self.resource()?;
        let mut written = 0;
        while written < data.len() {
            match resource.write(&data[written..]) {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::WriteZero).into()),
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        trace!(written, "write to stream");
        Ok(written)
    }

    /// Reads everything from the current position to the end.
    pub fn contents(&mut self) -> Result<Bytes, StreamError> {
        let mut out = BytesMut::new();
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            let n = self.read_into(&mut chunk)?;
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }

        trace!(body_size = out.len(), "read stream contents");
        Ok(out.freeze())
    }

    /// The whole content of the stream: rewinds, then reads to the end.
    ///
    /// A stream that is not readable yields empty content. A non-seekable stream that was already
    /// read from cannot be rewound and fails with [`StreamError::NotSeekable`]; read failures are
    /// returned.
    pub fn to_bytes(&mut self) -> Result<Bytes, StreamError> {
        if !self.is_readable() {
            return Ok(Bytes::new());
        }
        self.rewind_to_start()?;
        self.contents()
    }

    /// Rewinds a seekable stream. A non-seekable one is accepted only while its position is
    /// still `0`.
    pub fn rewind_to_start(&mut self) -> Result<(), StreamError> {
        if self.is_seekable() {
            return self.rewind();
        }

        let position = self.tell()?;
        ensure!(position == 0, StreamError::NotSeekable);
        Ok(())
    }

    /// [`Stream::to_bytes`] decoded as UTF-8, invalid sequences replaced.
    pub fn to_string_lossy(&mut self) -> Result<String, StreamError> {
        let bytes = self.to_bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn resource(&mut self) -> Result<&mut Box<dyn Resource>, StreamError> {
        self.resource.as_mut().ok_or(StreamError::Detached)
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, StreamError> {
        self.resource()?;
        ensure!(self.is_readable(), StreamError::NotReadable);

        let resource = self.resource()?;
        let n = loop {
            match resource.read(buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        };

        if n == 0 && !buf.is_empty() {
            self.eof = true;
        }
        Ok(n)
    }
}

impl io::Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf)?)
    }
}

impl io::Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(Stream::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for Stream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(Stream::seek(self, pos)?)
    }
}
