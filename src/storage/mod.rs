//! File storage gate: validates and persists uploaded binaries under a
//! single managed root, returning stable relative references.
//!
//! On-disk identity is never derived from caller-supplied text: every stored
//! file gets a random UUID name plus the original extension, which removes
//! the path-traversal and name-collision classes of bugs at the source.

use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::StorageError;

/// Subdirectory for gallery images.
pub const GALLERY_DIR: &str = "gallery";
/// Subdirectory for reference logos.
pub const LOGOS_DIR: &str = "logos";
/// Subdirectory for contact attachments.
pub const ATTACHMENTS_DIR: &str = "attachments";

/// An uploaded file as received from the HTTP layer.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    allowed_extensions: Vec<String>,
    max_bytes: u64,
    max_size_mb: u64,
    public_prefix: String,
}

impl FileStore {
    /// Build the store and make sure the root and its managed
    /// subdirectories exist.
    pub async fn new(cfg: &UploadConfig) -> Result<Self, StorageError> {
        let root = cfg.dir.clone();
        for sub in [GALLERY_DIR, LOGOS_DIR, ATTACHMENTS_DIR] {
            fs::create_dir_all(root.join(sub)).await?;
        }
        info!(root = %root.display(), "upload directories ready");

        let allowed_extensions: Vec<String> = cfg
            .allowed_extensions
            .to_lowercase()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();

        Ok(Self {
            root,
            allowed_extensions,
            max_bytes: cfg.max_size_mb * 1024 * 1024,
            max_size_mb: cfg.max_size_mb,
            public_prefix: cfg.public_prefix.trim_end_matches('/').to_string(),
        })
    }

    /// Validate and persist an upload; returns `{subdirectory}/{generated-name}`.
    pub async fn store(&self, file: &UploadFile, subdirectory: &str) -> Result<String, StorageError> {
        let extension = self.validate(file)?;

        if file.filename.contains("..") {
            return Err(StorageError::PathTraversal(file.filename.clone()));
        }

        let unique_filename = format!("{}.{extension}", Uuid::new_v4());
        let target_dir = self.root.join(subdirectory);
        fs::create_dir_all(&target_dir).await.map_err(|e| {
            error!(filename = %file.filename, error = %e, "could not create target directory");
            e
        })?;

        let target = target_dir.join(&unique_filename);
        fs::write(&target, &file.bytes).await.map_err(|e| {
            error!(filename = %file.filename, error = %e, "could not store file");
            e
        })?;

        info!(original = %file.filename, target = %target.display(), "stored file");

        Ok(format!("{subdirectory}/{unique_filename}"))
    }

    /// Best-effort removal of a stored file.
    ///
    /// Blank references and already-absent files are no-ops; IO failures are
    /// logged and swallowed.
    pub async fn delete(&self, reference: &str) {
        if reference.trim().is_empty() {
            return;
        }

        let relative = self.strip_public_prefix(reference);
        if has_parent_segment(relative) {
            warn!(reference, "refusing to delete path with parent-directory segment");
            return;
        }

        let target = self.root.join(relative);
        match fs::remove_file(&target).await {
            Ok(()) => info!(target = %target.display(), "deleted file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(target = %target.display(), error = %e, "could not delete file"),
        }
    }

    /// Resolve a stored reference to an absolute path inside the root.
    ///
    /// References containing a parent-directory segment are rejected before
    /// resolution so a crafted value can never escape the root.
    pub fn resolve(&self, reference: &str) -> Result<PathBuf, StorageError> {
        let relative = self.strip_public_prefix(reference);
        if has_parent_segment(relative) {
            return Err(StorageError::PathTraversal(reference.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Public URL under which a stored relative reference is served.
    pub fn public_url(&self, relative: &str) -> String {
        format!("{}/{relative}", self.public_prefix)
    }

    /// The managed upload root.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Configured size cap in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    fn strip_public_prefix<'a>(&self, reference: &'a str) -> &'a str {
        reference
            .strip_prefix(self.public_prefix.as_str())
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or(reference)
    }

    /// Runs the reject checks in order and returns the lowercased extension.
    fn validate(&self, file: &UploadFile) -> Result<String, StorageError> {
        if file.bytes.is_empty() {
            return Err(StorageError::EmptyFile);
        }

        if file.filename.trim().is_empty() {
            return Err(StorageError::MissingName);
        }

        let extension = file_extension(&file.filename)?;
        if !self.allowed_extensions.contains(&extension) {
            return Err(StorageError::DisallowedType {
                extension,
                allowed: self.allowed_extensions.join(", "),
            });
        }

        if file.bytes.len() as u64 > self.max_bytes {
            return Err(StorageError::TooLarge {
                max_size_mb: self.max_size_mb,
            });
        }

        // The content-type check is deliberately non-enforcing: a mismatch is
        // recorded for monitoring but the file is still accepted.
        if let Some(content_type) = file.content_type.as_deref() {
            if !mime_matches(&extension, content_type) {
                warn!(
                    content_type,
                    extension, "MIME type mismatch for uploaded file"
                );
            }
        }

        Ok(extension)
    }
}

fn has_parent_segment(relative: &str) -> bool {
    relative.split(['/', '\\']).any(|segment| segment == "..")
}

fn file_extension(filename: &str) -> Result<String, StorageError> {
    match filename.rfind('.') {
        Some(idx) if idx + 1 < filename.len() => Ok(filename[idx + 1..].to_lowercase()),
        _ => Err(StorageError::MissingExtension),
    }
}

fn mime_matches(extension: &str, content_type: &str) -> bool {
    match extension {
        "pdf" => content_type == "application/pdf",
        "png" => content_type == "image/png",
        "jpg" | "jpeg" => content_type == "image/jpeg",
        "dwg" => content_type.contains("dwg") || content_type == "application/octet-stream",
        "dxf" => content_type.contains("dxf") || content_type == "application/octet-stream",
        "step" | "stp" => content_type.contains("step") || content_type == "application/octet-stream",
        _ => true,
    }
}
