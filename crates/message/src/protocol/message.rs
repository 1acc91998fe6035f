use http::Version;
use triomphe::Arc;

use super::header::{Headers, IntoHeaderValues, header_name, header_values};
use super::MessageError;
use crate::stream::Body;

/// Protocol version of a freshly built message.
pub const DEFAULT_PROTOCOL_VERSION: &str = "1.1";

/// The parts every HTTP message shares: protocol version, headers and body.
///
/// Headers sit behind a shared pointer, so deriving a message copies them only when the
/// derived value changes a header.
#[derive(Debug, Clone)]
pub struct Message {
    protocol_version: String,
    headers: Arc<Headers>,
    body: Option<Body>,
}

impl Default for Message {
    fn default() -> Self {
        Self { protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(), headers: Arc::new(Headers::new()), body: None }
    }
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// A message holding `body`.
    pub fn with_body_of(body: impl Into<Body>) -> Self {
        Self { body: Some(body.into()), ..Self::default() }
    }

    pub(crate) fn headers_mut(&mut self) -> &mut Headers {
        Arc::make_mut(&mut self.headers)
    }
}

impl HttpMessage for Message {
    fn message(&self) -> &Message {
        self
    }

    fn message_mut(&mut self) -> &mut Message {
        self
    }
}

/// Read access and copy-on-write updates shared by every message type.
///
/// Every `with_*` method leaves `self` untouched and returns the updated copy.
pub trait HttpMessage: Clone {
    fn message(&self) -> &Message;

    fn message_mut(&mut self) -> &mut Message;

    fn protocol_version(&self) -> &str {
        &self.message().protocol_version
    }

    /// The protocol version as an [`http::Version`], `None` for versions it does not know.
    fn version(&self) -> Option<Version> {
        match self.protocol_version() {
            "0.9" => Some(Version::HTTP_09),
            "1.0" => Some(Version::HTTP_10),
            "1.1" => Some(Version::HTTP_11),
            "2" | "2.0" => Some(Version::HTTP_2),
            "3" | "3.0" => Some(Version::HTTP_3),
            _ => None,
        }
    }

    #[must_use]
    fn with_protocol_version(&self, version: &str) -> Self {
        let mut new = self.clone();
        new.message_mut().protocol_version = version.to_string();
        new
    }

    fn headers(&self) -> &Headers {
        &self.message().headers
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers().contains(name)
    }

    fn header(&self, name: &str) -> &[String] {
        self.headers().get(name)
    }

    fn header_line(&self, name: &str) -> String {
        self.headers().line(name)
    }

    /// Replaces all values of `name`.
    fn with_header<V: IntoHeaderValues>(&self, name: &str, value: V) -> Result<Self, MessageError> {
        let name = header_name(name)?;
        let values = header_values(&name, value.into_header_values())?;

        let mut new = self.clone();
        new.message_mut().headers_mut().set(name, values);
        Ok(new)
    }

    /// Appends to the values of `name`, creating the header when absent.
    fn with_added_header<V: IntoHeaderValues>(&self, name: &str, value: V) -> Result<Self, MessageError> {
        let name = header_name(name)?;
        let values = header_values(&name, value.into_header_values())?;

        let mut new = self.clone();
        new.message_mut().headers_mut().append(name, values);
        Ok(new)
    }

    #[must_use]
    fn without_header(&self, name: &str) -> Self {
        let mut new = self.clone();
        if self.has_header(name) {
            new.message_mut().headers_mut().remove(name);
        }
        new
    }

    fn body(&self) -> Result<&Body, MessageError> {
        self.message().body.as_ref().ok_or_else(|| MessageError::missing_field("body"))
    }

    #[must_use]
    fn with_body(&self, body: impl Into<Body>) -> Self {
        let mut new = self.clone();
        new.message_mut().body = Some(body.into());
        new
    }
}
