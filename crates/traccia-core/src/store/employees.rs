use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::Store;
use crate::error::Result;
use crate::types::{DirectoryRecord, Employee, MergeOutcome};

const EMPLOYEE_COLUMNS: &str = "id, external_id, first_name, last_name, email, location, \
                                cost_center, is_active, last_synced_at";

fn employee_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        external_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        email: row.get(4)?,
        location: row.get(5)?,
        cost_center: row.get(6)?,
        is_active: row.get(7)?,
        last_synced_at: row.get(8)?,
    })
}

impl Store {
    /// Upsert a batch of directory records keyed by external id, inside one
    /// transaction. Records are never deleted here.
    pub fn upsert_directory_records(
        &self,
        records: &[DirectoryRecord],
        now: DateTime<Utc>,
    ) -> Result<MergeOutcome> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut outcome = MergeOutcome::default();
        {
            let mut find = tx.prepare("SELECT id FROM employees WHERE external_id = ?1")?;
            let mut insert = tx.prepare(
                "INSERT INTO employees
                    (external_id, first_name, last_name, email, location, cost_center,
                     is_active, last_synced_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            let mut update = tx.prepare(
                "UPDATE employees
                 SET first_name = ?2, last_name = ?3, email = ?4, location = ?5,
                     cost_center = ?6, is_active = ?7, last_synced_at = ?8
                 WHERE id = ?1",
            )?;

            for record in records {
                let existing: Option<i64> = find
                    .query_row([&record.external_id], |row| row.get(0))
                    .optional()?;
                match existing {
                    Some(id) => {
                        update.execute(params![
                            id,
                            record.first_name,
                            record.last_name,
                            record.email,
                            record.location,
                            record.cost_center,
                            record.is_active,
                            now
                        ])?;
                        outcome.updated += 1;
                    }
                    None => {
                        insert.execute(params![
                            record.external_id,
                            record.first_name,
                            record.last_name,
                            record.email,
                            record.location,
                            record.cost_center,
                            record.is_active,
                            now
                        ])?;
                        outcome.created += 1;
                    }
                }
            }
        }
        tx.commit()?;
        Ok(outcome)
    }

    pub fn employee_by_external_id(&self, external_id: &str) -> Result<Option<Employee>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE external_id = ?1");
        Ok(conn
            .query_row(&sql, [external_id], employee_from_row)
            .optional()?)
    }

    pub fn employees(&self) -> Result<Vec<Employee>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], employee_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
