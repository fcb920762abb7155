use serde::{Deserialize, Serialize};

/// Outbound contact-notification mail settings.
///
/// Disabled by default so local and test runs never attempt SMTP.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// TOML: `mail.enabled`. Default: `false`.
    #[serde(default)]
    pub enabled: bool,

    /// SMTP relay host. TOML: `mail.smtp_host`.
    #[serde(default)]
    pub smtp_host: String,

    /// TOML: `mail.smtp_port`. Default: `587`.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// TOML: `mail.smtp_username`.
    #[serde(default)]
    pub smtp_username: String,

    /// TOML: `mail.smtp_password`.
    #[serde(default)]
    pub smtp_password: String,

    /// Sender address. TOML: `mail.from`. Default: `noreply@example.com`.
    #[serde(default = "default_from")]
    pub from: String,

    /// Notification recipient. TOML: `mail.to`. Default: `info@example.com`.
    #[serde(default = "default_to")]
    pub to: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from: default_from(),
            to: default_to(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from() -> String {
    "noreply@example.com".to_string()
}

fn default_to() -> String {
    "info@example.com".to_string()
}
