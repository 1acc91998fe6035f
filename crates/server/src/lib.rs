//! Server-side requests for micro-message
//!
//! This crate sits at the boundary between whatever accepted a connection and the immutable
//! message values of [`micro_message`]. Nothing here reads process-wide state: the receiving
//! side captures the request into a [`ServerParams`] and hands it over explicitly.
//!
//! # Example
//!
//! ```
//! use micro_message::protocol::HttpMessage;
//! use micro_message_server::{handler_fn, HandlerContext, RequestHandler, ServerParams, ServerRequest, ServerRequestFactory};
//!
//! let mut params = ServerParams::default();
//! params.server.insert("REQUEST_METHOD".into(), "GET".into());
//! params.server.insert("HTTP_HOST".into(), "example.com".into());
//! params.server.insert("REQUEST_URI".into(), "/hello?name=world".into());
//!
//! let request = ServerRequestFactory::new().create_from_server_params(params).unwrap();
//!
//! let handler = handler_fn(|ctx: &HandlerContext, request: ServerRequest| {
//!     let response = ctx.response(200, "")?;
//!     let name = request.query_params().get("name").cloned().unwrap_or_default();
//!     response.body()?.apply(|body| body.write(format!("Hello {name}!").as_bytes()))?;
//!     Ok(response)
//! });
//!
//! let response = handler.handle(request).unwrap();
//! assert_eq!(response.body().unwrap().to_string_lossy().unwrap(), "Hello world!");
//! ```
//!
//! # Components
//!
//! - [`ServerRequest`]: a request plus server info, cookies, query values, uploaded files,
//!   parsed body and attributes
//! - [`ServerParams`]: the explicit capture context, deserializable with serde
//! - [`ServerRequestFactory`]: builds server requests from a capture context
//! - [`UploadedFileNormalizer`]: flattens upload descriptions into uploaded files
//! - [`RequestHandler`]: the handler contract, with [`handler_fn`] for plain functions

mod error;
mod factory;
mod handler;
mod normalizer;
mod params;
mod server_request;

pub use error::{NormalizeError, ServerRequestError};
pub use factory::{ServerRequestFactory, ServerRequestFactoryBuilder};
pub use handler::{FnHandler, HandlerContext, HandlerError, RequestHandler, handler_fn};
pub use normalizer::{DEFAULT_TMP_MODE, FileOpener, StreamOpener, UploadedFileNormalizer};
pub use params::{FileArrays, FileEntry, FileSpec, ServerParams, SpecTree};
pub use server_request::{Params, ServerRequest};
