//! Flattens upload descriptions into [`UploadedFiles`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use micro_message::factory::{StreamFactory, UploadedFileFactory};
use micro_message::stream::{Stream, StreamError};
use micro_message::upload::{UploadErrorCode, UploadedFile, UploadedFileTree, UploadedFiles};
use tracing::{debug, trace};

use crate::params::{FileArrays, FileEntry, FileSpec, SpecTree};
use crate::NormalizeError;

/// Mode the temporary upload files are opened with.
pub const DEFAULT_TMP_MODE: &str = "rb";

/// Opens the temporary file an upload was stored in.
#[cfg_attr(test, mockall::automock)]
pub trait StreamOpener {
    fn open(&self, path: &Path) -> Result<Stream, StreamError>;
}

/// Opens temporary files read-only from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOpener;

impl StreamOpener for FileOpener {
    fn open(&self, path: &Path) -> Result<Stream, StreamError> {
        StreamFactory.create_stream_from_file(path, DEFAULT_TMP_MODE)
    }
}

/// Turns the per-field upload descriptions of a request into [`UploadedFile`] values.
///
/// Only successful uploads are opened. A field whose error code is not `0` becomes an uploaded
/// file without stream that carries the error.
#[derive(Clone)]
pub struct UploadedFileNormalizer {
    opener: Arc<dyn StreamOpener + Send + Sync>,
    files: UploadedFileFactory,
}

impl fmt::Debug for UploadedFileNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFileNormalizer").finish_non_exhaustive()
    }
}

impl Default for UploadedFileNormalizer {
    fn default() -> Self {
        Self::new(FileOpener)
    }
}

impl UploadedFileNormalizer {
    pub fn new<O: StreamOpener + Send + Sync + 'static>(opener: O) -> Self {
        Self { opener: Arc::new(opener), files: UploadedFileFactory }
    }

    pub fn normalize(&self, files: &BTreeMap<String, FileSpec>) -> Result<UploadedFiles, NormalizeError> {
        let mut normalized = UploadedFiles::new();
        for (field, spec) in files {
            let entry = match spec {
                FileSpec::Single(entry) => UploadedFileTree::File(self.single(field, entry)?),
                FileSpec::Multi(arrays) => self.multi(field, arrays)?,
            };
            normalized.insert(field.clone(), entry);
        }

        debug!(fields = normalized.len(), "normalized uploaded files");
        Ok(normalized)
    }

    fn single(&self, field: &str, entry: &FileEntry) -> Result<UploadedFile, NormalizeError> {
        self.create(field, &entry.tmp_name, entry.error, entry.size, entry.name.as_deref(), entry.media_type.as_deref())
    }

    fn multi(&self, field: &str, arrays: &FileArrays) -> Result<UploadedFileTree, NormalizeError> {
        let zipped = Zipped {
            name: arrays.name.as_ref(),
            media_type: arrays.media_type.as_ref(),
            tmp_name: &arrays.tmp_name,
            error: &arrays.error,
            size: arrays.size.as_ref(),
        };
        self.walk(field, &zipped)
    }

    /// Follows the shape of the `error` tree, every other attribute has to match it.
    fn walk(&self, path: &str, zipped: &Zipped<'_>) -> Result<UploadedFileTree, NormalizeError> {
        if let Some(&error) = zipped.error.leaf() {
            let tmp_name = zipped.tmp_name.leaf().ok_or_else(|| NormalizeError::shape(path, "tmp_name is not a value"))?;
            let name = optional_leaf(path, "name", zipped.name)?.and_then(Option::as_ref);
            let media_type = optional_leaf(path, "type", zipped.media_type)?.and_then(Option::as_ref);
            let size = optional_leaf(path, "size", zipped.size)?.copied().flatten();

            let file = self.create(path, tmp_name, error, size, name.map(String::as_str), media_type.map(String::as_str))?;
            return Ok(UploadedFileTree::File(file));
        }

        let mut group = UploadedFiles::new();
        for key in zipped.error.keys() {
            let child_path = format!("{path}[{key}]");
            let child = zipped.child(&child_path, &key)?;
            group.insert(key, self.walk(&child_path, &child)?);
        }
        Ok(UploadedFileTree::Nested(group))
    }

    fn create(
        &self,
        field: &str,
        tmp_name: &str,
        error: i64,
        size: Option<u64>,
        name: Option<&str>,
        media_type: Option<&str>,
    ) -> Result<UploadedFile, NormalizeError> {
        let error = UploadErrorCode::from_code(error).ok_or_else(|| NormalizeError::invalid_error_code(field, error))?;

        if !error.is_ok() || tmp_name.is_empty() {
            trace!(field, %error, "upload without stream");
            return Ok(UploadedFile::default().with_error(error).with_size(size).with_client_filename(name).with_client_media_type(media_type));
        }

        let stream = self.opener.open(Path::new(tmp_name)).map_err(|e| NormalizeError::open(field, e))?;
        Ok(self.files.create_uploaded_file(stream, size, error, name, media_type))
    }
}

/// The five attribute trees of a multi-file field, walked in lockstep.
struct Zipped<'a> {
    name: Option<&'a SpecTree<Option<String>>>,
    media_type: Option<&'a SpecTree<Option<String>>>,
    tmp_name: &'a SpecTree<String>,
    error: &'a SpecTree<i64>,
    size: Option<&'a SpecTree<Option<u64>>>,
}

impl<'a> Zipped<'a> {
    fn child(&self, path: &str, key: &str) -> Result<Zipped<'a>, NormalizeError> {
        let missing = |attribute: &str| NormalizeError::shape(path, format!("{attribute} has no entry {key:?}"));

        Ok(Zipped {
            name: optional_child(self.name, key).map_err(|()| missing("name"))?,
            media_type: optional_child(self.media_type, key).map_err(|()| missing("type"))?,
            tmp_name: self.tmp_name.child(key).ok_or_else(|| missing("tmp_name"))?,
            error: self.error.child(key).ok_or_else(|| missing("error"))?,
            size: optional_child(self.size, key).map_err(|()| missing("size"))?,
        })
    }
}

/// An absent attribute stays absent, a present one must have the entry.
fn optional_child<'a, T>(tree: Option<&'a SpecTree<T>>, key: &str) -> Result<Option<&'a SpecTree<T>>, ()> {
    match tree {
        None => Ok(None),
        Some(tree) => tree.child(key).map(Some).ok_or(()),
    }
}

fn optional_leaf<'a, T>(path: &str, attribute: &str, tree: Option<&'a SpecTree<T>>) -> Result<Option<&'a T>, NormalizeError> {
    match tree {
        None => Ok(None),
        Some(tree) => {
            tree.leaf().map(Some).ok_or_else(|| NormalizeError::shape(path, format!("{attribute} is not a value")))
        }
    }
}
