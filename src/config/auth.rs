use serde::{Deserialize, Serialize};

/// Authentication and token-issuance settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Secret used to sign bearer tokens (required, non-empty in
    /// production; `Config::from_toml()` enforces it).
    /// TOML: `auth.jwt_secret`.
    #[serde(default)]
    pub jwt_secret: String,

    /// Bearer token lifetime in hours.
    /// TOML: `auth.token_ttl_hours`. Default: `24`.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u64,

    /// Bootstrap admin account, created at startup when missing.
    /// TOML: `auth.admin_username`. Default: `admin`.
    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    /// TOML: `auth.admin_password`. Default: `admin123`.
    #[serde(default = "default_admin_password")]
    pub admin_password: String,

    /// TOML: `auth.admin_email`. Default: `admin@example.com`.
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // No insecure default. `Config::from_toml()` enforces non-empty.
            jwt_secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
            admin_email: default_admin_email(),
        }
    }
}

fn default_token_ttl_hours() -> u64 {
    24
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

fn default_admin_email() -> String {
    "admin@example.com".to_string()
}
