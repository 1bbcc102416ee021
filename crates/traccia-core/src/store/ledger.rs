use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::Store;
use crate::error::Result;
use crate::types::{LedgerInsert, SendRecord};

impl Store {
    pub fn has_send_record(&self, certification_id: i64, threshold: u32) -> Result<bool> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM alert_logs WHERE certification_id = ?1 AND threshold_days = ?2",
                params![certification_id, threshold],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Insert-only write to the ledger. A unique-constraint hit on
    /// (certification, threshold) is reported as `AlreadyRecorded`.
    pub fn record_send(
        &self,
        certification_id: i64,
        threshold: u32,
        at: DateTime<Utc>,
    ) -> Result<LedgerInsert> {
        let conn = self.conn()?;
        let res = conn.execute(
            "INSERT INTO alert_logs (certification_id, threshold_days, last_sent_at)
             VALUES (?1, ?2, ?3)",
            params![certification_id, threshold, at],
        );
        match res {
            Ok(_) => Ok(LedgerInsert::Recorded),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Ok(LedgerInsert::AlreadyRecorded)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn send_records(&self, certification_id: i64) -> Result<Vec<SendRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT certification_id, threshold_days, last_sent_at FROM alert_logs
             WHERE certification_id = ?1 ORDER BY threshold_days DESC",
        )?;
        let rows = stmt.query_map([certification_id], |row| {
            Ok(SendRecord {
                certification_id: row.get(0)?,
                threshold_days: row.get(1)?,
                last_sent_at: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
