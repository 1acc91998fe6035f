use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mime::Mime;
use tracing::{debug, warn};

use super::{UploadError, UploadErrorCode};
use crate::ensure;
use crate::stream::{Body, Stream};

/// A file received through a form upload.
///
/// The client filename and media type are whatever the client sent and must not be trusted.
/// Moving the file is one-shot: the `moved` flag is shared by every clone, so once any of them
/// has moved the file, none of them hands out the stream again.
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    body: Option<Body>,
    size: Option<u64>,
    error: UploadErrorCode,
    client_filename: Option<String>,
    client_media_type: Option<String>,
    moved: Arc<AtomicBool>,
}

impl UploadedFile {
    pub fn new(stream: impl Into<Body>) -> Self {
        Self { body: Some(stream.into()), ..Self::default() }
    }

    /// The stream holding the uploaded bytes.
    pub fn stream(&self) -> Result<&Body, UploadError> {
        ensure!(!self.is_moved(), UploadError::AlreadyMoved);
        self.body.as_ref().ok_or(UploadError::MissingStream)
    }

    /// Copies the uploaded bytes into a newly created file at `target` and releases the source.
    ///
    /// The parent directory of `target` must exist and be writable. After a successful move
    /// neither [`UploadedFile::stream`] nor another move are possible.
    pub fn move_to(&self, target: impl AsRef<Path>) -> Result<(), UploadError> {
        let target = target.as_ref();
        ensure!(!self.is_moved(), UploadError::AlreadyMoved);
        ensure!(!target.as_os_str().is_empty(), UploadError::invalid_target(target, "path is empty"));
        check_parent(target)?;

        let body = self.body.as_ref().ok_or(UploadError::MissingStream)?;

        if self.moved.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return Err(UploadError::AlreadyMoved);
        }

        let copied = copy_into(body, target);
        match copied {
            Ok(bytes) => {
                debug!(path = %target.display(), bytes, "moved uploaded file");
                Ok(())
            }
            Err(e) => {
                self.moved.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    pub fn is_moved(&self) -> bool {
        self.moved.load(Ordering::Acquire)
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn error(&self) -> UploadErrorCode {
        self.error
    }

    pub fn client_filename(&self) -> Option<&str> {
        self.client_filename.as_deref()
    }

    pub fn client_media_type(&self) -> Option<&str> {
        self.client_media_type.as_deref()
    }

    /// The client media type parsed as a MIME type, `None` when absent or unparsable.
    pub fn client_mime(&self) -> Option<Mime> {
        self.client_media_type.as_deref()?.parse().ok()
    }

    #[must_use]
    pub fn with_stream(&self, stream: impl Into<Body>) -> Self {
        Self { body: Some(stream.into()), ..self.clone() }
    }

    #[must_use]
    pub fn with_size(&self, size: Option<u64>) -> Self {
        Self { size, ..self.clone() }
    }

    #[must_use]
    pub fn with_error(&self, error: UploadErrorCode) -> Self {
        Self { error, ..self.clone() }
    }

    #[must_use]
    pub fn with_client_filename(&self, filename: Option<&str>) -> Self {
        Self { client_filename: filename.map(str::to_string), ..self.clone() }
    }

    #[must_use]
    pub fn with_client_media_type(&self, media_type: Option<&str>) -> Self {
        Self { client_media_type: media_type.map(str::to_string), ..self.clone() }
    }
}

fn check_parent(target: &Path) -> Result<(), UploadError> {
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let metadata = fs::metadata(parent)
        .map_err(|e| UploadError::invalid_target(target, format!("parent directory {}: {e}", parent.display())))?;

    ensure!(metadata.is_dir(), UploadError::invalid_target(target, "parent is not a directory"));
    ensure!(!metadata.permissions().readonly(), UploadError::invalid_target(target, "parent directory is read-only"));
    Ok(())
}

fn copy_into(body: &Body, target: &Path) -> Result<u64, UploadError> {
    let mut file = File::create(target).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => UploadError::invalid_target(target, e),
        _ => UploadError::from(e),
    })?;

    match write_target(body, &mut file) {
        Ok(copied) => {
            body.apply(|stream| {
                stream.detach();
                Ok(())
            })?;
            Ok(copied)
        }
        Err(e) => {
            drop(file);
            if let Err(cause) = fs::remove_file(target) {
                warn!(path = %target.display(), cause = %cause, "failed to remove partial move target");
            }
            Err(e)
        }
    }
}

/// Copies the whole stream into `file` and syncs it. The source stays attached.
fn write_target(body: &Body, file: &mut File) -> Result<u64, UploadError> {
    let copied = body.apply(|stream: &mut Stream| {
        stream.rewind_to_start()?;
        Ok(io::copy(stream, file)?)
    })?;

    file.sync_all()?;
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{MemoryResource, StreamError};

    fn uploaded(content: &str) -> UploadedFile {
        UploadedFile::new(Stream::from_resource(MemoryResource::with_content(content)))
            .with_size(Some(content.len() as u64))
            .with_client_filename(Some("report.txt"))
            .with_client_media_type(Some("text/plain; charset=utf-8"))
    }

    #[test]
    fn accessors() {
        let file = uploaded("abc");

        assert_eq!(file.size(), Some(3));
        assert!(file.error().is_ok());
        assert_eq!(file.client_filename(), Some("report.txt"));
        assert_eq!(file.client_media_type(), Some("text/plain; charset=utf-8"));
        assert_eq!(file.client_mime().map(|m| m.essence_str().to_string()), Some("text/plain".to_string()));
        assert_eq!(file.stream().unwrap().to_bytes().unwrap(), "abc");
    }

    #[test]
    fn builders_leave_the_original_alone() {
        let file = uploaded("abc");
        let failed = file.with_error(UploadErrorCode::Partial).with_size(None).with_client_media_type(Some("%%"));

        assert!(file.error().is_ok());
        assert_eq!(failed.error(), UploadErrorCode::Partial);
        assert_eq!(failed.size(), None);
        assert_eq!(failed.client_mime(), None);
        assert_eq!(file.size(), Some(3));
    }

    #[test]
    fn move_once() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("moved.txt");
        let file = uploaded("uploaded content");
        file.stream().unwrap().apply(|s| s.read(4)).unwrap();

        file.move_to(&target).unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "uploaded content");
        assert!(file.is_moved());
        assert!(matches!(file.stream(), Err(UploadError::AlreadyMoved)));
        assert!(matches!(file.move_to(dir.path().join("again.txt")), Err(UploadError::AlreadyMoved)));
    }

    #[test]
    fn clones_share_the_move() {
        let dir = tempfile::tempdir().unwrap();
        let file = uploaded("shared");
        let clone = file.clone();

        clone.move_to(dir.path().join("moved.txt")).unwrap();
        assert!(matches!(file.move_to(dir.path().join("other.txt")), Err(UploadError::AlreadyMoved)));
    }

    #[test]
    fn source_is_detached_after_move() {
        let dir = tempfile::tempdir().unwrap();
        let body = Body::new(Stream::from_resource(MemoryResource::with_content("x")));
        let file = UploadedFile::new(body.clone());

        file.move_to(dir.path().join("x.txt")).unwrap();
        assert!(matches!(body.contents(), Err(StreamError::Detached)));
    }

    #[test]
    fn invalid_targets() {
        let dir = tempfile::tempdir().unwrap();
        let file = uploaded("abc");

        assert!(matches!(file.move_to(""), Err(UploadError::InvalidTarget { .. })));
        assert!(matches!(file.move_to(dir.path().join("missing/dir/file.txt")), Err(UploadError::InvalidTarget { .. })));

        let not_dir = dir.path().join("plain");
        std::fs::write(&not_dir, "").unwrap();
        assert!(matches!(file.move_to(not_dir.join("file.txt")), Err(UploadError::InvalidTarget { .. })));

        assert!(!file.is_moved());
        assert_eq!(file.stream().unwrap().to_bytes().unwrap(), "abc");
    }

    #[test]
    fn failed_copy_leaves_no_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("partial.txt");
        let file = UploadedFile::new(Stream::from_resource(crate::stream::ReaderResource::new(&b"abcdef"[..])));
        file.stream().unwrap().apply(|s| s.read(2)).unwrap();

        assert!(matches!(file.move_to(&target), Err(UploadError::Stream { source: StreamError::NotSeekable })));
        assert!(!target.exists());
        assert!(!file.is_moved());
        assert_eq!(file.stream().unwrap().apply(|s| s.contents()).unwrap(), "cdef");
    }

    #[cfg(unix)]
    #[test]
    fn unwritable_directory_is_an_invalid_target() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o555)).unwrap();
        // root writes regardless of the mode
        if File::create(dir.path().join("writable")).is_ok() {
            return;
        }

        let file = uploaded("abc");
        let result = file.move_to(dir.path().join("report.txt"));
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(result, Err(UploadError::InvalidTarget { .. })));
        assert!(!file.is_moved());
        assert!(!dir.path().join("report.txt").exists());
    }

    #[test]
    fn missing_stream() {
        let dir = tempfile::tempdir().unwrap();
        let file = UploadedFile::default().with_error(UploadErrorCode::NoFile);

        assert!(matches!(file.stream(), Err(UploadError::MissingStream)));
        assert!(matches!(file.move_to(dir.path().join("f")), Err(UploadError::MissingStream)));
    }
}
