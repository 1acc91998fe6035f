use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use super::{MemoryResource, Stream, StreamError};

/// The handle a message keeps on its body stream.
///
/// Cloning a `Body` shares the same [`Stream`], so two message values derived from each other
/// observe the same position and content. A resource is never shared between two streams.
#[derive(Debug, Clone)]
pub struct Body {
    inner: Arc<Mutex<Stream>>,
}

impl Body {
    pub fn new(stream: Stream) -> Self {
        Self { inner: Arc::new(Mutex::new(stream)) }
    }

    /// A writable, empty in-memory body.
    pub fn empty() -> Self {
        Self::new(Stream::from_resource(MemoryResource::new()))
    }

    /// Runs `f` with exclusive access to the stream.
    pub fn apply<T, F>(&self, f: F) -> Result<T, StreamError>
    where
        F: FnOnce(&mut Stream) -> Result<T, StreamError>,
    {
        f(&mut self.lock())
    }

    /// Reads from the current position to the end.
    pub fn contents(&self) -> Result<Bytes, StreamError> {
        self.lock().contents()
    }

    /// See [`Stream::to_bytes`].
    pub fn to_bytes(&self) -> Result<Bytes, StreamError> {
        self.lock().to_bytes()
    }

    pub fn to_string_lossy(&self) -> Result<String, StreamError> {
        self.lock().to_string_lossy()
    }

    pub fn size(&self) -> Option<u64> {
        self.lock().size()
    }

    /// True when both handles point at the same stream.
    pub fn ptr_eq(&self, other: &Body) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Takes the stream out when this is the only handle, otherwise gives the handle back.
    pub fn into_stream(self) -> Result<Stream, Body> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => Ok(mutex.into_inner().unwrap_or_else(PoisonError::into_inner)),
            Err(inner) => Err(Body { inner }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Stream> {
        // a panic inside `apply` leaves the stream itself in a consistent state
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Stream> for Body {
    fn from(stream: Stream) -> Self {
        Self::new(stream)
    }
}
