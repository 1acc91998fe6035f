use micro_message::protocol::MessageError;
use micro_message::stream::StreamError;
use micro_message::uri::UriError;
use thiserror::Error;

/// Errors raised while turning upload descriptions into uploaded files.
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("upload field {field:?} is malformed: {reason}")]
    Shape { field: String, reason: String },

    #[error("upload field {field:?} has unknown error code {code}")]
    InvalidErrorCode { field: String, code: i64 },

    #[error("upload field {field:?} could not be opened: {source}")]
    Open { field: String, source: StreamError },
}

impl NormalizeError {
    pub fn shape<F: ToString, R: ToString>(field: F, reason: R) -> Self {
        Self::Shape { field: field.to_string(), reason: reason.to_string() }
    }

    pub fn invalid_error_code<F: ToString>(field: F, code: i64) -> Self {
        Self::InvalidErrorCode { field: field.to_string(), code }
    }

    pub fn open<F: ToString>(field: F, source: StreamError) -> Self {
        Self::Open { field: field.to_string(), source }
    }
}

/// Errors raised while building or reading a [`ServerRequest`](crate::ServerRequest).
#[derive(Error, Debug)]
pub enum ServerRequestError {
    #[error("missing server param {name:?}")]
    MissingServerParam { name: &'static str },

    #[error("message error: {source}")]
    Message {
        #[from]
        source: MessageError,
    },

    #[error("uri error: {source}")]
    Uri {
        #[from]
        source: UriError,
    },

    #[error("upload error: {source}")]
    Normalize {
        #[from]
        source: NormalizeError,
    },

    #[error("invalid query string: {source}")]
    QueryString {
        #[from]
        source: serde_urlencoded::de::Error,
    },

    #[error("query does not match the requested type: {source}")]
    Query {
        #[from]
        source: serde_qs::Error,
    },

    #[error("parsed body does not match the requested type: {source}")]
    ParsedBody {
        #[from]
        source: serde_json::Error,
    },
}

impl ServerRequestError {
    pub fn missing_server_param(name: &'static str) -> Self {
        Self::MissingServerParam { name }
    }
}
