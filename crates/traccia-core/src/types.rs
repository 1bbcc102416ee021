//! Data contracts shared by the alert engine, the directory sync, and the
//! store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ExpiryStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    Expiring,
    Valid,
}

impl ExpiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Expiring => "expiring",
            Self::Valid => "valid",
        }
    }
}

impl fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TrackableItem
// ---------------------------------------------------------------------------

/// A certification as seen by the alert engine, joined with its owner's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackableItem {
    pub id: i64,
    pub employee_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    /// Category label used to pick a per-category alert rule.
    pub cert_type: String,
    pub issued_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
}

impl TrackableItem {
    pub fn owner_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ---------------------------------------------------------------------------
// AlertRule
// ---------------------------------------------------------------------------

/// Notification rule. `cert_type == None` is the global default rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub cert_type: Option<String>,
    pub thresholds_csv: String,
    pub email_enabled: bool,
    pub webhook_enabled: bool,
    /// Comma-separated extra recipients.
    pub recipient_emails: String,
}

impl AlertRule {
    pub fn is_global(&self) -> bool {
        self.cert_type.is_none()
    }
}

// ---------------------------------------------------------------------------
// Send ledger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendRecord {
    pub certification_id: i64,
    pub threshold_days: u32,
    pub last_sent_at: DateTime<Utc>,
}

/// Result of inserting into the send ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerInsert {
    Recorded,
    /// The (item, threshold) pair was already present; treated as a skip.
    AlreadyRecorded,
}

// ---------------------------------------------------------------------------
// DirectoryRecord
// ---------------------------------------------------------------------------

/// A normalized employee record from the external directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    pub external_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub location: String,
    pub cost_center: String,
    pub is_active: bool,
}

/// A directory record as stored locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub external_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub location: String,
    pub cost_center: String,
    pub is_active: bool,
    pub last_synced_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Job outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertOutcome {
    pub sent: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    pub created: u32,
    pub updated: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub ok: bool,
    pub message: String,
    pub created: u32,
    pub updated: u32,
}

impl SyncOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            created: 0,
            updated: 0,
        }
    }

    pub fn completed(merged: MergeOutcome) -> Self {
        Self {
            ok: true,
            message: "sync completed".to_string(),
            created: merged.created,
            updated: merged.updated,
        }
    }
}
