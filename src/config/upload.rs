use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Upload root, extension allow-list and size cap for the file storage gate.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Directory under which all uploaded files are stored.
    /// TOML: `upload.dir`. Default: `./uploads`.
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,

    /// Comma-separated list of allowed (lowercased) file extensions.
    /// TOML: `upload.allowed_extensions`.
    /// Default: `pdf,png,jpg,jpeg,dwg,dxf,step,stp`.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: String,

    /// Maximum accepted upload size in megabytes.
    /// TOML: `upload.max_size_mb`. Default: `10`.
    #[serde(default = "default_max_size_mb")]
    pub max_size_mb: u64,

    /// Public URL prefix under which stored files are served.
    /// TOML: `upload.public_prefix`. Default: `/uploads`.
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            allowed_extensions: default_allowed_extensions(),
            max_size_mb: default_max_size_mb(),
            public_prefix: default_public_prefix(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_allowed_extensions() -> String {
    "pdf,png,jpg,jpeg,dwg,dxf,step,stp".to_string()
}

fn default_max_size_mb() -> u64 {
    10
}

fn default_public_prefix() -> String {
    "/uploads".to_string()
}
