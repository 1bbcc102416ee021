use thiserror::Error;

#[derive(Debug, Error)]
pub enum TracciaError {
    #[error("store error: {0}")]
    Store(String),

    #[error("certification not found: {0}")]
    ItemNotFound(i64),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },

    #[error("mail transport error: {0}")]
    Mail(String),

    #[error("directory returned HTTP {0}")]
    DirectoryStatus(u16),

    #[error("unexpected directory payload: {0}")]
    UnexpectedPayload(String),

    #[error("scheduler error: {0}")]
    Scheduler(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TracciaError>;
