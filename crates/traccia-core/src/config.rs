use crate::error::Result;
use crate::scheduler::normalize_cron;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Alert dispatch runs daily at 03:15 UTC.
pub const ALERT_CRON: &str = "15 3 * * *";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// DatabaseConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("traccia.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// DirectoryConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub company_id: String,
    #[serde(default = "default_sync_cron")]
    pub sync_cron: String,
    #[serde(default = "default_directory_timeout")]
    pub timeout_secs: u64,
}

fn default_sync_cron() -> String {
    "0 2 * * *".to_string()
}

fn default_directory_timeout() -> u64 {
    30
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: String::new(),
            company_id: String::new(),
            sync_cron: default_sync_cron(),
            timeout_secs: default_directory_timeout(),
        }
    }
}

impl DirectoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// SmtpConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub from: String,
    #[serde(default = "default_true")]
    pub tls: bool,
    #[serde(default = "default_send_timeout")]
    pub timeout_secs: u64,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_true() -> bool {
    true
}

fn default_send_timeout() -> u64 {
    10
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from: String::new(),
            tls: true,
            timeout_secs: default_send_timeout(),
        }
    }
}

impl SmtpConfig {
    pub fn is_configured(&self) -> bool {
        !self.host.trim().is_empty() && !self.from.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// WebhookConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_send_timeout")]
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_send_timeout(),
        }
    }
}

impl WebhookConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

impl Config {
    /// Load `path` if it exists (a missing file means all defaults), then
    /// apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut cfg = if path.exists() {
            let data = std::fs::read_to_string(path)?;
            if data.trim().is_empty() {
                Config::default()
            } else {
                serde_yaml::from_str(&data)?
            }
        } else {
            Config::default()
        };
        cfg.apply_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    /// Values that fail to parse are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("DATABASE_PATH") {
            self.database.path = PathBuf::from(v);
        }
        if let Some(v) = lookup("DIRECTORY_BASE_URL") {
            self.directory.base_url = v;
        }
        if let Some(v) = lookup("DIRECTORY_API_TOKEN") {
            self.directory.api_token = v;
        }
        if let Some(v) = lookup("DIRECTORY_COMPANY_ID") {
            self.directory.company_id = v;
        }
        if let Some(v) = lookup("DIRECTORY_SYNC_CRON") {
            self.directory.sync_cron = v;
        }
        if let Some(v) = lookup("SMTP_HOST") {
            self.smtp.host = v;
        }
        if let Some(port) = lookup("SMTP_PORT").and_then(|v| v.trim().parse().ok()) {
            self.smtp.port = port;
        }
        if let Some(v) = lookup("SMTP_USER") {
            self.smtp.username = v;
        }
        if let Some(v) = lookup("SMTP_PASSWORD") {
            self.smtp.password = v;
        }
        if let Some(v) = lookup("SMTP_FROM") {
            self.smtp.from = v;
        }
        if let Some(v) = lookup("SMTP_TLS") {
            self.smtp.tls = v.trim().eq_ignore_ascii_case("true");
        }
        if let Some(v) = lookup("WEBHOOK_URL") {
            self.webhook.url = v;
        }
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Err(e) = normalize_cron(&self.directory.sync_cron) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("directory.sync_cron: {e}"),
            });
        }

        let has_url = !self.directory.base_url.trim().is_empty();
        let has_token = !self.directory.api_token.trim().is_empty();
        if has_url != has_token {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "directory sync needs both base_url and api_token; sync will be skipped"
                    .to_string(),
            });
        }

        if !self.smtp.host.trim().is_empty() && self.smtp.from.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "smtp.host is set but smtp.from is empty; email alerts will be skipped"
                    .to_string(),
            });
        }

        for (name, secs) in [
            ("directory.timeout_secs", self.directory.timeout_secs),
            ("smtp.timeout_secs", self.smtp.timeout_secs),
            ("webhook.timeout_secs", self.webhook.timeout_secs),
        ] {
            if secs == 0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{name} must be greater than zero"),
                });
            } else if secs > 120 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("{name}={secs} (>120 can stall a scheduled job)"),
                });
            }
        }

        warnings
    }
}
