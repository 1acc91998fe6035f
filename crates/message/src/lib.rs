//! Immutable HTTP message values
//!
//! This crate models HTTP requests, responses, URIs, byte streams and uploaded files as values.
//! A value is never changed in place: every `with_*` method returns a new value and leaves the
//! receiver as it was, so a message can be handed down a pipeline and each stage derives its
//! own version of it.
//!
//! # Example
//!
//! ```
//! use micro_message::factory::{RequestFactory, ResponseFactory};
//! use micro_message::protocol::{HttpMessage, HttpRequest};
//!
//! let request = RequestFactory::new().create_request("GET", "http://example.com/hello?name=world").unwrap();
//! let traced = request.with_header("x-request-id", "42").unwrap();
//!
//! assert!(!request.has_header("x-request-id"));
//! assert_eq!(traced.header_line("host"), "example.com");
//! assert_eq!(traced.uri().unwrap().query(), "name=world");
//!
//! let response = ResponseFactory::new().create_response(200, "").unwrap();
//! response.body().unwrap().apply(|body| body.write(b"Hello World!")).unwrap();
//! assert_eq!(response.body().unwrap().to_string_lossy().unwrap(), "Hello World!");
//! ```
//!
//! # Architecture
//!
//! - [`uri`]: URI parsing, validation and rendering
//! - [`stream`]: byte streams over memory, files or readers, with capability checks
//! - [`protocol`]: headers, messages, requests and responses
//! - [`upload`]: uploaded files and their one-shot move
//! - [`factory`]: factories building ready-to-use values
//!
//! # Sharing
//!
//! Headers are shared between derived messages until one of them changes a header. A body is
//! a handle on one stream: messages derived from each other share the stream, so reading the
//! body of one advances the position seen by the other.
//!
//! # Error Handling
//!
//! Each module has its own error type, all implement `std::error::Error`:
//!
//! - [`uri::UriError`]: rejected URI input or components
//! - [`stream::StreamError`]: operations outside the capabilities of a stream
//! - [`protocol::MessageError`]: invalid header, method or status input and missing fields
//! - [`upload::UploadError`]: failed or repeated moves

pub mod factory;
pub mod protocol;
pub mod stream;
pub mod upload;
pub mod uri;

mod utils;
pub(crate) use utils::ensure;
