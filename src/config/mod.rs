mod auth;
mod basic;
mod mail;
mod upload;

pub use auth::AuthConfig;
pub use basic::BasicConfig;
pub use mail::MailConfig;
pub use upload::UploadConfig;

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
///
/// Built once at process start and handed to the components that need it;
/// nothing reads configuration from ambient global state.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Authentication and token settings (see `auth` table in config.toml).
    #[serde(default)]
    pub auth: AuthConfig,

    /// Upload directory, allow-list and size cap (see `upload` table).
    #[serde(default)]
    pub upload: UploadConfig,

    /// Outbound contact-notification mail settings (see `mail` table).
    #[serde(default)]
    pub mail: MailConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Builds a Figment that merges defaults and a config TOML file.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        }
    }

    /// Loads configuration by merging defaults and `config.toml` if present.
    ///
    /// Note: this does **not** validate required fields like `auth.jwt_secret`.
    /// Binaries should call `Config::from_toml()` instead (or validate
    /// explicitly) to avoid running with insecure defaults.
    pub fn from_optional_toml() -> Self {
        Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration (defaults + optional config.toml): {err}")
        })
    }

    /// Loads configuration from the TOML file (with defaults) and validates
    /// required fields.
    pub fn from_toml() -> Self {
        if !PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            panic!("config file not found: {DEFAULT_CONFIG_FILE}");
        }
        let cfg: Self = Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration from {DEFAULT_CONFIG_FILE}: {err}")
        });
        if cfg.auth.jwt_secret.trim().is_empty() {
            panic!("auth.jwt_secret must be set and non-empty");
        }
        cfg
    }
}
