//! Byte streams and the resources behind them.
//!
//! ```
//! use micro_message::stream::{MemoryResource, Stream};
//!
//! let mut stream = Stream::from_resource(MemoryResource::new());
//! stream.write(b"hello world").unwrap();
//! stream.rewind().unwrap();
//!
//! assert_eq!(stream.read(5).unwrap(), "hello");
//! assert_eq!(stream.contents().unwrap(), " world");
//! assert_eq!(stream.size(), Some(11));
//! ```

mod body;
mod byte_stream;
mod error;
mod mode;
mod resource;

pub use body::Body;
pub use byte_stream::{Stream, StreamMetadata};
pub use error::StreamError;
pub use mode::AccessMode;
pub use resource::{FileResource, MEMORY_MODE, MemoryResource, READER_MODE, ReaderResource, Resource};
