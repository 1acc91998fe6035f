//! Uploaded files and the trees they are posted in.

mod error;
mod error_code;
mod files;
mod uploaded_file;

pub use error::UploadError;
pub use error_code::UploadErrorCode;
pub use files::{UploadedFileTree, UploadedFiles};
pub use uploaded_file::UploadedFile;
