//! File lifecycle management for uploaded content.
//!
//! Uploads live under a single configured root with one subdirectory per
//! file kind. Stored paths handed back to callers (and persisted in the
//! database) are always relative to that root, with generated filenames —
//! callers never control the name on disk.

use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;

/// Category of upload. Determines the target subdirectory and the
/// extension/MIME allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Profile pictures: JPEG/JPG/PNG.
    Image,
    /// Resume documents: PDF.
    Document,
}

impl FileKind {
    pub fn subdir(self) -> &'static str {
        match self {
            FileKind::Image => "profile",
            FileKind::Document => "resumes",
        }
    }

    fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            FileKind::Image => &["jpg", "jpeg", "png"],
            FileKind::Document => &["pdf"],
        }
    }

    fn allowed_mime_types(self) -> &'static [&'static str] {
        match self {
            FileKind::Image => &["image/jpeg", "image/png"],
            FileKind::Document => &["application/pdf"],
        }
    }

    fn describe(self) -> &'static str {
        match self {
            FileKind::Image => "images only (JPEG/JPG/PNG)",
            FileKind::Document => "PDF documents only",
        }
    }
}

/// A single file attachment pulled out of a multipart request.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Multipart field name the file arrived under; becomes part of the
    /// generated filename.
    pub field_name: String,
    /// Client-supplied filename. Only its extension survives.
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Rejects anything outside the allow-list for `kind`. Both the filename
/// extension and the declared MIME type must match; nothing is written on
/// rejection.
pub fn validate_type(kind: FileKind, filename: &str, content_type: &str) -> Result<(), AppError> {
    let ext = extension_of(filename);
    let ext_ok = ext
        .as_deref()
        .is_some_and(|e| kind.allowed_extensions().contains(&e));
    let mime_ok = kind
        .allowed_mime_types()
        .contains(&content_type.to_ascii_lowercase().as_str());

    if ext_ok && mime_ok {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "file '{filename}' ({content_type}) rejected: {}",
            kind.describe()
        )))
    }
}

/// Lowercased extension of `filename`, if it has one.
fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Generates a unique on-disk name: field name, millisecond timestamp, and a
/// random token, keeping the original extension.
fn generate_filename(field_name: &str, original: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    let ext = extension_of(original)
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    format!(
        "{field_name}-{}-{}{ext}",
        Utc::now().timestamp_millis(),
        &token[..12]
    )
}

/// Filesystem-backed store for uploaded files.
///
/// Cheap to clone; shared through [`crate::state::AppState`] as an explicit
/// dependency of the record services.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    /// Creates the upload root and per-kind subdirectories.
    pub async fn ensure_dirs(&self) -> Result<(), AppError> {
        for kind in [FileKind::Image, FileKind::Document] {
            let dir = self.root.join(kind.subdir());
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| AppError::Storage(format!("failed to create {}: {e}", dir.display())))?;
        }
        Ok(())
    }

    /// Validates and writes `upload`, returning the stored path relative to
    /// the upload root. A write failure is fatal to the caller's operation.
    pub async fn store(&self, kind: FileKind, upload: &Upload) -> Result<String, AppError> {
        validate_type(kind, &upload.filename, &upload.content_type)?;

        let name = generate_filename(&upload.field_name, &upload.filename);
        let stored = format!("{}/{name}", kind.subdir());
        let target = self.root.join(kind.subdir()).join(&name);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("failed to create {}: {e}", parent.display())))?;
        }
        tokio::fs::write(&target, &upload.bytes)
            .await
            .map_err(|e| AppError::Storage(format!("failed to write {stored}: {e}")))?;

        debug!("Stored {} byte upload at {stored}", upload.bytes.len());
        Ok(stored)
    }

    /// Stores the new file, then best-effort deletes `old`. The new
    /// reference is authoritative regardless of whether cleanup succeeds:
    /// a deletion failure is logged, never returned.
    pub async fn replace(
        &self,
        kind: FileKind,
        old: Option<&str>,
        upload: &Upload,
    ) -> Result<String, AppError> {
        let stored = self.store(kind, upload).await?;
        if let Some(old) = old {
            self.remove_stale(old).await;
        }
        Ok(stored)
    }

    /// Removes a stored file. A file already missing is not an error.
    pub async fn delete(&self, stored: &str) -> Result<(), AppError> {
        let target = self.resolve(stored)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("failed to delete {stored}: {e}"))),
        }
    }

    /// Best-effort deletion of a superseded file; failures are logged and
    /// swallowed.
    pub async fn remove_stale(&self, stored: &str) {
        if let Err(err) = self.delete(stored).await {
            warn!("Failed to remove superseded file {stored}: {err}");
        }
    }

    /// Whether a stored path currently resolves to a file on disk.
    #[allow(dead_code)]
    pub async fn exists(&self, stored: &str) -> bool {
        match self.resolve(stored) {
            Ok(target) => tokio::fs::try_exists(&target).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Maps a root-relative stored path to its absolute location, refusing
    /// anything that would escape the upload root.
    fn resolve(&self, stored: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(stored);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes || stored.is_empty() {
            return Err(AppError::Storage(format!("invalid stored path: {stored}")));
        }
        Ok(self.root.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn png_upload() -> Upload {
        Upload {
            field_name: "profile".to_string(),
            filename: "headshot.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: Bytes::from_static(b"\x89PNG fake image bytes"),
        }
    }

    fn pdf_upload() -> Upload {
        Upload {
            field_name: "pdf".to_string(),
            filename: "jane.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: Bytes::from_static(b"%PDF-1.4 fake resume"),
        }
    }

    #[test]
    fn test_validate_accepts_allowed_pairs() {
        assert!(validate_type(FileKind::Image, "a.jpg", "image/jpeg").is_ok());
        assert!(validate_type(FileKind::Image, "a.JPEG", "image/jpeg").is_ok());
        assert!(validate_type(FileKind::Image, "a.png", "image/png").is_ok());
        assert!(validate_type(FileKind::Document, "cv.pdf", "application/pdf").is_ok());
    }

    #[test]
    fn test_validate_rejects_disallowed_extension() {
        assert!(validate_type(FileKind::Image, "a.svg", "image/svg+xml").is_err());
        assert!(validate_type(FileKind::Image, "run.exe", "image/png").is_err());
        assert!(validate_type(FileKind::Document, "cv.docx", "application/pdf").is_err());
    }

    #[test]
    fn test_validate_rejects_mismatched_mime() {
        assert!(validate_type(FileKind::Image, "a.png", "application/pdf").is_err());
        assert!(validate_type(FileKind::Document, "cv.pdf", "text/plain").is_err());
    }

    #[test]
    fn test_validate_rejects_missing_extension() {
        assert!(validate_type(FileKind::Image, "picture", "image/png").is_err());
    }

    #[test]
    fn test_generated_names_are_unique_and_keep_extension() {
        let a = generate_filename("profile", "me.PNG");
        let b = generate_filename("profile", "me.PNG");
        assert_ne!(a, b);
        assert!(a.starts_with("profile-"));
        assert!(a.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_store_writes_under_kind_subdir() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let stored = store.store(FileKind::Image, &png_upload()).await.unwrap();
        assert!(stored.starts_with("profile/"));
        assert!(store.exists(&stored).await);

        let on_disk = tokio::fs::read(dir.path().join(&stored)).await.unwrap();
        assert_eq!(on_disk, png_upload().bytes.to_vec());
    }

    #[tokio::test]
    async fn test_store_rejection_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.ensure_dirs().await.unwrap();

        let mut bad = png_upload();
        bad.filename = "script.sh".to_string();
        bad.content_type = "text/x-sh".to_string();
        let err = store.store(FileKind::Image, &bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut entries = tokio::fs::read_dir(dir.path().join("profile")).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_removes_old_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let old = store.store(FileKind::Document, &pdf_upload()).await.unwrap();
        let new = store
            .replace(FileKind::Document, Some(&old), &pdf_upload())
            .await
            .unwrap();

        assert_ne!(old, new);
        assert!(store.exists(&new).await);
        assert!(!store.exists(&old).await);
    }

    #[tokio::test]
    async fn test_replace_tolerates_missing_old_file() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let stored = store
            .replace(FileKind::Image, Some("profile/long-gone.png"), &png_upload())
            .await
            .unwrap();
        assert!(store.exists(&stored).await);
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_ok() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.delete("resumes/never-existed.pdf").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_refuses_paths_outside_root() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.delete("../outside.pdf").await.is_err());
    }
}
