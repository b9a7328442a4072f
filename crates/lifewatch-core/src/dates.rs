//! # Date Helpers
//!
//! Policy dates are calendar days. They are compared against `now` as the
//! instant of midnight UTC on that day, so `now > date` already holds one
//! second into the day itself.

use crate::LifewatchError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Midnight UTC at the start of `date`.
#[must_use]
pub fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Date used for a phase that has ended at an unknown date.
///
/// Every `now` after 1970 is past it.
#[must_use]
pub fn already_ended() -> NaiveDate {
    DateTime::UNIX_EPOCH.date_naive()
}

/// Parse a provider date (`YYYY-MM-DD`).
pub fn parse_policy_date(raw: &str) -> Result<NaiveDate, LifewatchError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| LifewatchError::InvalidDate(format!("'{}': {}", raw, e)))
}

/// Parse a user-supplied instant.
///
/// Accepts a bare date (`2030-01-01`, read as midnight UTC) or a full
/// RFC 3339 timestamp.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, LifewatchError> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(midnight_utc(date));
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LifewatchError::InvalidDate(format!("'{}': {}", raw, e)))
}

/// `now` is strictly after `date`, or `date` is undefined.
///
/// RHEL 7.9, 8 and 9 treat a missing EOL date as already passed.
#[must_use]
pub fn past_or_undefined(now: DateTime<Utc>, date: Option<NaiveDate>) -> bool {
    date.is_none_or(|d| now > midnight_utc(d))
}

/// `now` is strictly after a defined `date`.
#[must_use]
pub fn past(now: DateTime<Utc>, date: Option<NaiveDate>) -> bool {
    date.is_some_and(|d| now > midnight_utc(d))
}

/// `now` is strictly before a defined `date`.
#[must_use]
pub fn before(now: DateTime<Utc>, date: Option<NaiveDate>) -> bool {
    date.is_some_and(|d| now < midnight_utc(d))
}
