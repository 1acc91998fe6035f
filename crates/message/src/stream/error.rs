use std::io;
use thiserror::Error;

/// Errors raised by [`Stream`](super::Stream) operations.
///
/// Capability errors are decided from the metadata captured when the resource was attached,
/// the resource is never asked.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("stream is detached")]
    Detached,

    #[error("stream is not readable")]
    NotReadable,

    #[error("stream is not writable")]
    NotWritable,

    #[error("stream is not seekable")]
    NotSeekable,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl StreamError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Lets a [`Stream`](super::Stream) be driven through `std::io` traits.
impl From<StreamError> for io::Error {
    fn from(e: StreamError) -> Self {
        match e {
            StreamError::Io { source } => source,
            StreamError::Detached => io::Error::new(io::ErrorKind::NotConnected, e),
            e => io::Error::new(io::ErrorKind::Unsupported, e),
        }
    }
}
