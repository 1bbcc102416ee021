//! Key/value overrides edited by administrators at runtime.
//!
//! Non-empty values here take precedence over the configuration file for
//! the directory connection.

use rusqlite::{params, OptionalExtension};

use super::Store;
use crate::error::Result;

pub const DIRECTORY_BASE_URL: &str = "directory_base_url";
pub const DIRECTORY_API_TOKEN: &str = "directory_api_token";
pub const DIRECTORY_COMPANY_ID: &str = "directory_company_id";

pub const KNOWN_KEYS: [&str; 3] = [DIRECTORY_BASE_URL, DIRECTORY_API_TOKEN, DIRECTORY_COMPANY_ID];

impl Store {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?)
    }

    /// The stored value when present and non-blank, else `default`.
    pub fn setting_or(&self, key: &str, default: &str) -> Result<String> {
        let value = self
            .get_setting(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.trim().to_string());
        Ok(value)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}
