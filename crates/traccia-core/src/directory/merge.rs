//! Normalization and upsert of raw directory records.
//!
//! Each normalized field has an ordered list of candidate source keys; the
//! first candidate with a non-empty value wins.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;
use crate::store::Store;
use crate::types::{DirectoryRecord, MergeOutcome};

/// Placeholder used when a record carries no name at all.
pub const MISSING_NAME: &str = "N/A";

const EXTERNAL_ID_KEYS: &[&str] = &["id"];
const FIRST_NAME_KEYS: &[&str] = &["first_name", "name"];
const LAST_NAME_KEYS: &[&str] = &["last_name", "surname"];
const EMAIL_KEYS: &[&str] = &["email"];
const LOCATION_KEYS: &[&str] = &["location", "location_id"];
const COST_CENTER_KEYS: &[&str] = &["cost_center", "department", "legal_entity_id"];
const TERMINATION_KEYS: &[&str] = &["terminated_on", "is_terminating"];

/// JSON truthiness: null, false, zero, and empty strings/arrays/objects are
/// all "absent".
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn first_present<'a>(raw: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| raw.get(*k)).find(|v| truthy(v))
}

/// Strings as-is, numbers and booleans rendered; anything else is `None`.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_field(raw: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first_present(raw, keys).and_then(scalar_string)
}

/// Normalize one raw record. Returns `None` when the record has no usable
/// external key (or is not an object at all).
pub fn extract(raw: &Value) -> Option<DirectoryRecord> {
    let raw = raw.as_object()?;

    let external_id = EXTERNAL_ID_KEYS
        .iter()
        .filter_map(|k| raw.get(*k))
        .find_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|id| !id.is_empty())?;

    let terminated = TERMINATION_KEYS
        .iter()
        .filter_map(|k| raw.get(*k))
        .any(truthy);
    let is_active = raw.get("active").is_some_and(truthy) && !terminated;

    Some(DirectoryRecord {
        external_id,
        first_name: text_field(raw, FIRST_NAME_KEYS).unwrap_or_else(|| MISSING_NAME.to_string()),
        last_name: text_field(raw, LAST_NAME_KEYS).unwrap_or_else(|| MISSING_NAME.to_string()),
        email: text_field(raw, EMAIL_KEYS),
        location: text_field(raw, LOCATION_KEYS).unwrap_or_default(),
        cost_center: text_field(raw, COST_CENTER_KEYS).unwrap_or_default(),
        is_active,
    })
}

/// Upsert every usable record in one transaction. Records without a key are
/// skipped; nothing is deleted.
pub fn merge(store: &Store, raw_records: &[Value], now: DateTime<Utc>) -> Result<MergeOutcome> {
    let records: Vec<DirectoryRecord> = raw_records.iter().filter_map(extract).collect();
    let skipped = raw_records.len() - records.len();
    if skipped > 0 {
        debug!(skipped, "directory records without a usable key skipped");
    }
    store.upsert_directory_records(&records, now)
}
