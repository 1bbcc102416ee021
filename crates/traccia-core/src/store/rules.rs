use rusqlite::params;

use super::Store;
use crate::error::Result;
use crate::types::AlertRule;

impl Store {
    /// All stored rules, global first, then by category.
    pub fn alert_rules(&self) -> Result<Vec<AlertRule>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT cert_type, thresholds_csv, email_enabled, webhook_enabled, recipient_emails
             FROM alert_settings
             ORDER BY cert_type IS NOT NULL, cert_type",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AlertRule {
                cert_type: row.get(0)?,
                thresholds_csv: row.get(1)?,
                email_enabled: row.get(2)?,
                webhook_enabled: row.get(3)?,
                recipient_emails: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Store `rule`, replacing any rule with the same scope. A blank
    /// category is treated as the global rule.
    pub fn upsert_rule(&self, rule: &AlertRule) -> Result<()> {
        let category = rule
            .cert_type
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM alert_settings WHERE cert_type IS ?1",
            params![category],
        )?;
        tx.execute(
            "INSERT INTO alert_settings
                (cert_type, thresholds_csv, email_enabled, webhook_enabled, recipient_emails)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                category,
                rule.thresholds_csv,
                rule.email_enabled,
                rule.webhook_enabled,
                rule.recipient_emails
            ],
        )?;
        tx.commit()?;
        Ok(())
    }
}
