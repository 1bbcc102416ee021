//! Dispatch gate: whether a threshold is due today, and whether it has
//! already been sent.

use crate::error::Result;
use crate::store::Store;
use crate::types::ExpiryStatus;

/// Threshold that always fires once an item has expired, even if no run
/// caught the exact day.
pub const EXPIRED_FALLBACK_THRESHOLD: u32 = 1;

/// A threshold is due when the item is exactly that many days from expiry,
/// or when the item has expired and the threshold is the fallback one.
pub fn is_due(threshold: u32, days_left: i64, status: ExpiryStatus) -> bool {
    days_left == i64::from(threshold)
        || (status == ExpiryStatus::Expired && threshold == EXPIRED_FALLBACK_THRESHOLD)
}

/// The due subset of `thresholds`, order preserved.
pub fn due_thresholds(thresholds: &[u32], days_left: i64, status: ExpiryStatus) -> Vec<u32> {
    thresholds
        .iter()
        .copied()
        .filter(|t| is_due(*t, days_left, status))
        .collect()
}

/// Idempotency check against the send ledger.
///
/// Check-then-write is not atomic; callers run one alert pass at a time and
/// the ledger's unique constraint catches anything that slips through.
pub struct DispatchGate<'a> {
    store: &'a Store,
}

impl<'a> DispatchGate<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn is_due_and_unsent(&self, item_id: i64, threshold: u32) -> Result<bool> {
        Ok(!self.store.has_send_record(item_id, threshold)?)
    }
}
