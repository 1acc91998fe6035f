use thiserror::Error;

use crate::stream::StreamError;
use crate::uri::UriError;

/// Errors raised while building or reading message values.
#[derive(Error, Debug)]
pub enum MessageError {
    #[error("invalid header name {name:?}")]
    InvalidHeaderName { name: String },

    #[error("invalid value for header {name:?}: {reason}")]
    InvalidHeaderValue { name: String, reason: String },

    #[error("invalid http method {method:?}")]
    InvalidMethod { method: String },

    #[error("invalid status code {code}, must be within 100..=999")]
    InvalidStatus { code: u16 },

    #[error("message has no {field}")]
    MissingField { field: &'static str },

    #[error("uri error: {source}")]
    Uri {
        #[from]
        source: UriError,
    },

    #[error("http conversion error: {source}")]
    Http {
        #[from]
        source: http::Error,
    },

    #[error("stream error: {source}")]
    Stream {
        #[from]
        source: StreamError,
    },
}

impl MessageError {
    pub fn invalid_header_name<S: ToString>(name: S) -> Self {
        Self::InvalidHeaderName { name: name.to_string() }
    }

    pub fn invalid_header_value<S: ToString, R: ToString>(name: S, reason: R) -> Self {
        Self::InvalidHeaderValue { name: name.to_string(), reason: reason.to_string() }
    }

    pub fn invalid_method<S: ToString>(method: S) -> Self {
        Self::InvalidMethod { method: method.to_string() }
    }

    pub fn invalid_status(code: u16) -> Self {
        Self::InvalidStatus { code }
    }

    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }
}
