use thiserror::Error;

/// Errors produced while parsing a URI or replacing one of its components.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    #[error("invalid or unsupported scheme: {scheme:?}")]
    InvalidScheme { scheme: String },

    #[error("invalid port {port}, expected 1..=65535")]
    InvalidPort { port: u32 },

    #[error("malformed uri: {reason}")]
    Malformed { reason: String },
}

impl UriError {
    pub fn invalid_scheme<S: ToString>(scheme: S) -> Self {
        Self::InvalidScheme { scheme: scheme.to_string() }
    }

    pub fn invalid_port(port: u32) -> Self {
        Self::InvalidPort { port }
    }

    pub fn malformed<S: ToString>(str: S) -> Self {
        Self::Malformed { reason: str.to_string() }
    }
}
