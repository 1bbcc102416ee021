//! SQLite-backed store for certifications, alert rules, the send ledger,
//! directory records, and settings overrides.
//!
//! One `Store` is opened per job invocation and dropped when the job ends.
//! The connection sits behind a mutex so a `&Store` can be held across
//! `.await` points inside `Send` futures; every method locks only for the
//! duration of its own statements.

mod employees;
mod items;
mod ledger;
mod rules;
pub mod settings;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::error::{Result, TracciaError};

pub use items::NewCertification;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY,
    email       TEXT    NOT NULL UNIQUE,
    full_name   TEXT    NOT NULL DEFAULT '',
    role        TEXT    NOT NULL DEFAULT 'viewer',
    is_active   INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS employees (
    id              INTEGER PRIMARY KEY,
    external_id     TEXT    UNIQUE,
    first_name      TEXT    NOT NULL,
    last_name       TEXT    NOT NULL,
    email           TEXT,
    location        TEXT    NOT NULL DEFAULT '',
    cost_center     TEXT    NOT NULL DEFAULT '',
    is_active       INTEGER NOT NULL DEFAULT 1,
    last_synced_at  TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS certifications (
    id           INTEGER PRIMARY KEY,
    employee_id  INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    cert_type    TEXT    NOT NULL,
    title        TEXT    NOT NULL,
    issued_date  TEXT,
    expiry_date  TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS ix_certifications_expiry ON certifications(expiry_date);

CREATE TABLE IF NOT EXISTS alert_settings (
    id                INTEGER PRIMARY KEY,
    cert_type         TEXT,
    thresholds_csv    TEXT    NOT NULL DEFAULT '90,60,30,14,7,1',
    email_enabled     INTEGER NOT NULL DEFAULT 1,
    webhook_enabled   INTEGER NOT NULL DEFAULT 0,
    recipient_emails  TEXT    NOT NULL DEFAULT ''
);
CREATE UNIQUE INDEX IF NOT EXISTS uq_alert_settings_scope
    ON alert_settings(IFNULL(cert_type, ''));

CREATE TABLE IF NOT EXISTS alert_logs (
    id                INTEGER PRIMARY KEY,
    certification_id  INTEGER NOT NULL REFERENCES certifications(id) ON DELETE CASCADE,
    threshold_days    INTEGER NOT NULL,
    last_sent_at      TEXT    NOT NULL,
    CONSTRAINT uq_alert_once UNIQUE (certification_id, threshold_days)
);

CREATE TABLE IF NOT EXISTS settings (
    key    TEXT PRIMARY KEY,
    value  TEXT NOT NULL DEFAULT ''
);
"#;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open or create the database at `path` and apply the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| TracciaError::Store("connection lock poisoned".into()))
    }
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------
