use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::stream::StreamError;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("uploaded file has already been moved")]
    AlreadyMoved,

    #[error("invalid move target {path:?}: {reason}")]
    InvalidTarget { path: PathBuf, reason: String },

    #[error("uploaded file has no stream")]
    MissingStream,

    #[error("stream error: {source}")]
    Stream {
        #[from]
        source: StreamError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl UploadError {
    pub fn invalid_target<P: Into<PathBuf>, S: ToString>(path: P, reason: S) -> Self {
        Self::InvalidTarget { path: path.into(), reason: reason.to_string() }
    }
}
