//! Responses: a [`Message`] plus status code and reason phrase.

use bytes::Bytes;
use http::StatusCode;

use super::message::{HttpMessage, Message};
use super::MessageError;

/// Status of a freshly built response.
pub const DEFAULT_STATUS: u16 = 200;

/// An HTTP response value.
#[derive(Debug, Clone)]
pub struct Response {
    message: Message,
    status: StatusCode,
    reason_phrase: String,
}

impl Default for Response {
    fn default() -> Self {
        Self { message: Message::default(), status: StatusCode::OK, reason_phrase: reason_for(StatusCode::OK) }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn reason_phrase(&self) -> &str {
        &self.reason_phrase
    }

    /// Sets the status code, `100..=999`.
    ///
    /// Without an explicit `reason` the canonical phrase of the code is used, or an empty phrase
    /// for codes that have none.
    pub fn with_status(&self, code: u16, reason: Option<&str>) -> Result<Self, MessageError> {
        let status = StatusCode::from_u16(code).map_err(|e| {
            tracing::warn!(code, cause = %e, "rejected status code");
            MessageError::invalid_status(code)
        })?;

        let mut new = self.clone();
        new.status = status;
        new.reason_phrase = reason.map_or_else(|| reason_for(status), str::to_string);
        Ok(new)
    }

    /// Converts into an [`http::Response`], reading the whole body.
    pub fn to_http(&self) -> Result<http::Response<Bytes>, MessageError> {
        let mut builder = http::Response::builder().status(self.status);
        if let Some(version) = self.version() {
            builder = builder.version(version);
        }

        let body = match self.body() {
            Ok(body) => body.to_bytes()?,
            Err(_) => Bytes::new(),
        };

        let mut response = builder.body(body)?;
        *response.headers_mut() = self.headers().to_header_map()?;
        Ok(response)
    }
}

fn reason_for(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

impl HttpMessage for Response {
    fn message(&self) -> &Message {
        &self.message
    }

    fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}
