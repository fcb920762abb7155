use thiserror::Error as ThisError;

/// Failures raised by the file storage gate.
///
/// Validation variants surface as HTTP 400; `Io` is a server-side failure
/// and surfaces as HTTP 500 on the write path.
#[derive(Debug, ThisError)]
pub enum StorageError {
    #[error("cannot store an empty file")]
    EmptyFile,

    #[error("file must have a name")]
    MissingName,

    #[error("file must have an extension")]
    MissingExtension,

    #[error("file type .{extension} not allowed; allowed types: {allowed}")]
    DisallowedType { extension: String, allowed: String },

    #[error("file size exceeds maximum allowed size of {max_size_mb}MB")]
    TooLarge { max_size_mb: u64 },

    #[error("path contains invalid parent-directory sequence: {0}")]
    PathTraversal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// True for caller mistakes (rejected uploads), false for server-side
    /// failures.
    pub fn is_validation(&self) -> bool {
        !matches!(self, StorageError::Io(_))
    }
}
