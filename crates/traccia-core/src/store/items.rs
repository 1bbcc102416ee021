use chrono::{NaiveDate, Utc};
use rusqlite::{params, Row};
use tracing::warn;

use super::Store;
use crate::error::{Result, TracciaError};
use crate::types::TrackableItem;

/// Certification fields supplied by the CRUD layer.
#[derive(Debug, Clone)]
pub struct NewCertification {
    pub employee_id: i64,
    pub cert_type: String,
    pub title: String,
    pub issued_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
}

fn decode_item(id: i64, row: &Row<'_>) -> rusqlite::Result<TrackableItem> {
    Ok(TrackableItem {
        id,
        employee_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        title: row.get(4)?,
        cert_type: row.get(5)?,
        issued_date: row.get(6)?,
        expiry_date: row.get(7)?,
    })
}

impl Store {
    /// Every certification joined with its owner, ordered by id. Rows whose
    /// columns cannot be decoded are logged and left out.
    pub fn trackable_items(&self) -> Result<Vec<TrackableItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.employee_id, e.first_name, e.last_name, c.title,
                    c.cert_type, c.issued_date, c.expiry_date
             FROM certifications c
             JOIN employees e ON e.id = c.employee_id
             ORDER BY c.id",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            match decode_item(id, row) {
                Ok(item) => items.push(item),
                Err(e) => {
                    warn!(certification_id = id, error = %e, "unreadable certification skipped");
                }
            }
        }
        Ok(items)
    }

    /// Emails of active administrators; always included in alert recipients.
    pub fn active_admin_emails(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT email FROM users
             WHERE role = 'admin' AND is_active = 1 AND email <> ''
             ORDER BY email",
        )?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
    }

    pub fn insert_user(&self, email: &str, full_name: &str, role: &str, active: bool) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (email, full_name, role, is_active) VALUES (?1, ?2, ?3, ?4)",
            params![email, full_name, role, active],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert a locally managed employee (no directory key).
    pub fn insert_employee(&self, first_name: &str, last_name: &str, email: Option<&str>) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO employees (first_name, last_name, email, last_synced_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![first_name, last_name, email, Utc::now()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_certification(&self, cert: &NewCertification) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO certifications (employee_id, cert_type, title, issued_date, expiry_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                cert.employee_id,
                cert.cert_type,
                cert.title,
                cert.issued_date,
                cert.expiry_date
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Delete a certification; its send-ledger rows go with it.
    pub fn delete_certification(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let n = conn.execute("DELETE FROM certifications WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(TracciaError::ItemNotFound(id));
        }
        Ok(())
    }
}
