//! Factories building ready-to-use values.
//!
//! Request and response factories start from a prototype (by default an empty value) and attach
//! a fresh in-memory body to every value they build, so no two built values share a stream.

use std::path::Path;

use http::Method;
use tracing::debug;

use crate::protocol::{HttpMessage, HttpRequest, MessageError, Request, Response};
use crate::stream::{Body, FileResource, MemoryResource, Resource, Stream, StreamError};
use crate::upload::{UploadErrorCode, UploadedFile};
use crate::uri::{Uri, UriError};

/// Anything a URI can be built from.
pub trait IntoUri {
    fn into_uri(self) -> Result<Uri, UriError>;
}

impl IntoUri for Uri {
    fn into_uri(self) -> Result<Uri, UriError> {
        Ok(self)
    }
}

impl IntoUri for &Uri {
    fn into_uri(self) -> Result<Uri, UriError> {
        Ok(self.clone())
    }
}

impl IntoUri for &str {
    fn into_uri(self) -> Result<Uri, UriError> {
        Uri::parse(self)
    }
}

impl IntoUri for String {
    fn into_uri(self) -> Result<Uri, UriError> {
        Uri::parse(&self)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UriFactory;

impl UriFactory {
    pub fn create_uri(&self, uri: &str) -> Result<Uri, UriError> {
        Uri::parse(uri)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StreamFactory;

impl StreamFactory {
    /// An in-memory stream holding `content`, positioned at the start.
    pub fn create_stream(&self, content: impl AsRef<[u8]>) -> Stream {
        Stream::from_resource(MemoryResource::with_content(content))
    }

    /// A stream over the file at `path` opened with an `fopen`-style `mode`.
    pub fn create_stream_from_file(&self, path: impl AsRef<Path>, mode: &str) -> Result<Stream, StreamError> {
        let path = path.as_ref();
        let resource = FileResource::open(path, mode)?;
        debug!(path = %path.display(), mode, "created stream from file");
        Ok(Stream::from_resource(resource))
    }

    pub fn create_stream_from_resource<R: Resource + 'static>(&self, resource: R) -> Stream {
        Stream::from_resource(resource)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestFactory {
    prototype: Request,
}

impl RequestFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds requests from `prototype`, keeping its headers and protocol version.
    pub fn with_prototype(prototype: Request) -> Self {
        Self { prototype }
    }

    /// A request for `uri` with an empty writable body. The `host` header is taken from the URI.
    pub fn create_request(&self, method: &str, uri: impl IntoUri) -> Result<Request, MessageError> {
        let uri = uri.into_uri()?;
        debug!(method, uri = %uri, "create request");

        let request = self.prototype.with_method(method)?.with_uri(uri, false)?.with_body(Body::empty());
        Ok(request)
    }

    /// Shorthand for a `GET` request.
    pub fn get(&self, uri: impl IntoUri) -> Result<Request, MessageError> {
        self.create_request(Method::GET.as_str(), uri)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResponseFactory {
    prototype: Response,
}

impl ResponseFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prototype(prototype: Response) -> Self {
        Self { prototype }
    }

    /// A response with `code` and an empty writable body. An empty `reason` selects the
    /// canonical phrase of `code`.
    pub fn create_response(&self, code: u16, reason: &str) -> Result<Response, MessageError> {
        debug!(code, reason, "create response");
        let reason = (!reason.is_empty()).then_some(reason);
        Ok(self.prototype.with_status(code, reason)?.with_body(Body::empty()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UploadedFileFactory;

impl UploadedFileFactory {
    /// Without an explicit `size`, the size of `stream` is used when it is known.
    pub fn create_uploaded_file(
        &self,
        stream: impl Into<Body>,
        size: Option<u64>,
        error: UploadErrorCode,
        client_filename: Option<&str>,
        client_media_type: Option<&str>,
    ) -> UploadedFile {
        let body = stream.into();
        let size = size.or_else(|| body.size());
        debug!(?size, %error, ?client_filename, "create uploaded file");

        UploadedFile::new(body)
            .with_size(size)
            .with_error(error)
            .with_client_filename(client_filename)
            .with_client_media_type(client_media_type)
    }
}
