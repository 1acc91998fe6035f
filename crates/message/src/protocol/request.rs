//! Requests: a [`Message`] plus method, target URI and request target.

use bytes::Bytes;
use http::Method;

use super::message::{HttpMessage, Message};
use super::MessageError;
use crate::uri::Uri;

/// An outgoing or incoming HTTP request value.
#[derive(Debug, Clone, Default)]
pub struct Request {
    message: Message,
    method: Method,
    uri: Option<Uri>,
    request_target: Option<String>,
}

impl Request {
    /// A request without body, see [`RequestFactory`](crate::factory::RequestFactory) for one
    /// ready to be written to.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self { method, uri: Some(uri), ..Self::default() }
    }

    /// Converts into an [`http::Request`], reading the whole body.
    pub fn to_http(&self) -> Result<http::Request<Bytes>, MessageError> {
        let mut builder = http::Request::builder().method(self.method.clone());
        if let Some(uri) = &self.uri {
            builder = builder.uri(http::Uri::try_from(uri)?);
        }
        if let Some(version) = self.version() {
            builder = builder.version(version);
        }

        let body = match self.body() {
            Ok(body) => body.to_bytes()?,
            Err(_) => Bytes::new(),
        };

        let mut request = builder.body(body)?;
        *request.headers_mut() = self.headers().to_header_map()?;
        Ok(request)
    }
}

impl HttpMessage for Request {
    fn message(&self) -> &Message {
        &self.message
    }

    fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}

impl HttpRequest for Request {
    fn request(&self) -> &Request {
        self
    }

    fn request_mut(&mut self) -> &mut Request {
        self
    }
}

/// Request identity shared by [`Request`] and server-side requests that wrap one.
pub trait HttpRequest: HttpMessage {
    fn request(&self) -> &Request;

    fn request_mut(&mut self) -> &mut Request;

    fn method(&self) -> &Method {
        &self.request().method
    }

    /// Sets the method. Methods are case-sensitive and must be a valid token.
    fn with_method(&self, method: &str) -> Result<Self, MessageError> {
        let method = Method::from_bytes(method.as_bytes()).map_err(|e| {
            tracing::warn!(method, cause = %e, "rejected request method");
            MessageError::invalid_method(method)
        })?;

        let mut new = self.clone();
        new.request_mut().method = method;
        Ok(new)
    }

    fn uri(&self) -> Result<&Uri, MessageError> {
        self.request().uri.as_ref().ok_or_else(|| MessageError::missing_field("uri"))
    }

    /// Replaces the URI.
    ///
    /// The `host` header is rewritten to `host[:port]` of `uri` when the URI has a host and
    /// either `preserve_host` is false or the request has no `host` header yet.
    fn with_uri(&self, uri: Uri, preserve_host: bool) -> Result<Self, MessageError> {
        let mut new = self.clone();

        if !uri.host().is_empty() && (!preserve_host || !self.has_header("host")) {
            let host = match uri.port() {
                Some(port) => format!("{}:{port}", uri.host()),
                None => uri.host().to_string(),
            };
            new = new.with_header("host", host)?;
        }

        new.request_mut().uri = Some(uri);
        Ok(new)
    }

    /// The request target as it would appear on the request line.
    ///
    /// An explicit target set by [`HttpRequest::with_request_target`] wins, otherwise it is the
    /// URI's path and raw query, with an empty path rendered as `/`.
    fn request_target(&self) -> String {
        let request = self.request();
        if let Some(target) = &request.request_target {
            return target.clone();
        }

        let Some(uri) = &request.uri else {
            return "/".to_string();
        };

        let mut target = if uri.path().is_empty() { "/".to_string() } else { uri.path().to_string() };
        if !uri.raw_query().is_empty() {
            target.push('?');
            target.push_str(uri.raw_query());
        }
        target
    }

    /// Overrides the request target, e.g. with `*` or an absolute form. Used verbatim.
    #[must_use]
    fn with_request_target(&self, target: &str) -> Self {
        let mut new = self.clone();
        new.request_mut().request_target = Some(target.to_string());
        new
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Body;

    fn request(uri: &str) -> Request {
        Request::new(Method::GET, Uri::parse(uri).unwrap())
    }

    #[test]
    fn defaults() {
        let request = Request::default();

        assert_eq!(*request.method(), Method::GET);
        assert!(matches!(request.uri(), Err(MessageError::MissingField { field: "uri" })));
        assert_eq!(request.request_target(), "/");
        assert_eq!(request.protocol_version(), "1.1");
    }

    #[test]
    fn with_method() {
        let request = Request::default();
        let post = request.with_method("POST").unwrap();
        let custom = request.with_method("PURGE").unwrap();

        assert_eq!(*request.method(), Method::GET);
        assert_eq!(*post.method(), Method::POST);
        assert_eq!(custom.method().as_str(), "PURGE");
        assert!(matches!(request.with_method("BAD METHOD"), Err(MessageError::InvalidMethod { .. })));
        assert!(matches!(request.with_method(""), Err(MessageError::InvalidMethod { .. })));
    }

    #[test]
    fn request_target_from_uri() {
        assert_eq!(request("http://example.com/a/b?x=1").request_target(), "/a/b?x=1");
        assert_eq!(request("http://example.com").request_target(), "/");
        assert_eq!(request("http://example.com?q=%20").request_target(), "/?q=%20");
    }

    #[test]
    fn request_target_override() {
        let request = request("http://example.com/a").with_request_target("*");

        assert_eq!(request.request_target(), "*");
        assert_eq!(request.with_uri(Uri::parse("/other").unwrap(), false).unwrap().request_target(), "*");
    }

    #[test]
    fn with_uri_sets_host() {
        let request = Request::default().with_uri(Uri::parse("http://example.com:8080/x").unwrap(), false).unwrap();

        assert_eq!(request.header_line("Host"), "example.com:8080");
        assert_eq!(request.uri().unwrap().path(), "/x");
    }

    #[test]
    fn with_uri_suppresses_default_port_in_host() {
        let request = Request::default().with_uri(Uri::parse("https://example.com:443/").unwrap(), false).unwrap();
        assert_eq!(request.header("host"), ["example.com"]);
    }

    #[test]
    fn with_uri_preserving_host() {
        let original = Request::default().with_header("Host", "original.test").unwrap();
        let uri = Uri::parse("http://example.com/").unwrap();

        let preserved = original.with_uri(uri.clone(), true).unwrap();
        assert_eq!(preserved.header("host"), ["original.test"]);

        let replaced = original.with_uri(uri.clone(), false).unwrap();
        assert_eq!(replaced.header("host"), ["example.com"]);

        let filled = Request::default().with_uri(uri, true).unwrap();
        assert_eq!(filled.header("host"), ["example.com"]);
    }

    #[test]
    fn with_uri_without_host_keeps_headers() {
        let original = Request::default().with_header("Host", "original.test").unwrap();
        let request = original.with_uri(Uri::parse("/path").unwrap(), false).unwrap();

        assert_eq!(request.header("host"), ["original.test"]);
    }

    #[test]
    fn derived_requests_are_independent() {
        let original = request("http://example.com/a");
        let derived = original.with_method("DELETE").unwrap().with_header("x-a", "1").unwrap();

        assert_eq!(*original.method(), Method::GET);
        assert!(!original.has_header("x-a"));
        assert_eq!(derived.uri().unwrap(), original.uri().unwrap());
    }

    #[test]
    fn to_http() {
        let request = request("http://example.com/submit?x=1")
            .with_method("POST")
            .unwrap()
            .with_header("content-type", "text/plain")
            .unwrap()
            .with_body(Body::empty());
        request.body().unwrap().apply(|s| s.write(b"hi")).unwrap();

        let http = request.to_http().unwrap();
        assert_eq!(*http.method(), Method::POST);
        assert_eq!(http.uri(), "http://example.com/submit?x=1");
        assert_eq!(http.headers()["content-type"], "text/plain");
        assert_eq!(http.body(), "hi");
    }
}
