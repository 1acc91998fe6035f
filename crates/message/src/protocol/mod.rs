//! HTTP message values.
//!
//! [`Message`] carries what every message has (protocol version, headers, body), [`Request`]
//! and [`Response`] add their own identity. Shared behaviour lives in the [`HttpMessage`] and
//! [`HttpRequest`] traits so that types wrapping a request, such as a server-side request,
//! get the same API.
//!
//! ```
//! use micro_message::protocol::{HttpMessage, HttpRequest, Request};
//! use micro_message::uri::Uri;
//!
//! let request = Request::default()
//!     .with_method("POST").unwrap()
//!     .with_uri(Uri::parse("http://example.com/submit").unwrap(), false).unwrap()
//!     .with_header("Accept", ["text/html", "application/json"]).unwrap();
//!
//! assert_eq!(request.header_line("host"), "example.com");
//! assert_eq!(request.header_line("accept"), "text/html,application/json");
//! assert_eq!(request.request_target(), "/submit");
//! ```

mod error;
mod header;
mod message;
mod request;
mod response;

pub use error::MessageError;
pub use header::{Headers, IntoHeaderValues};
pub use message::{DEFAULT_PROTOCOL_VERSION, HttpMessage, Message};
pub use request::{HttpRequest, Request};
pub use response::{DEFAULT_STATUS, Response};
