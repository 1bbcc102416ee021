use crate::error::{Result, TracciaError};
use crate::types::ExpiryStatus;
use chrono::NaiveDate;

/// Items expiring within this many days are `Expiring`.
pub const EXPIRING_WINDOW_DAYS: i64 = 30;

/// Signed day count from `today` to `expiry`. Negative once expired.
pub fn days_left(expiry: NaiveDate, today: NaiveDate) -> i64 {
    (expiry - today).num_days()
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| TracciaError::InvalidDate(s.to_string()))
}

pub fn classify(expiry: NaiveDate, today: NaiveDate) -> ExpiryStatus {
    if expiry < today {
        return ExpiryStatus::Expired;
    }
    if days_left(expiry, today) <= EXPIRING_WINDOW_DAYS {
        ExpiryStatus::Expiring
    } else {
        ExpiryStatus::Valid
    }
}
