//! Common validation utilities.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use validator::ValidationError;

/// Parses a date query parameter.
///
/// Accepts a calendar date (`2024-02-29`), an RFC 3339 timestamp
/// (`2024-02-29T10:00:00+02:00`) or a naive timestamp, which is read as UTC.
pub fn parse_date_param(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc())
}

/// Validates that a value is an ISO 8601 date or timestamp.
pub fn validate_iso8601(value: &str) -> Result<(), ValidationError> {
    if parse_date_param(value).is_some() {
        Ok(())
    } else {
        let mut err = ValidationError::new("iso8601");
        err.message = Some("must be a valid ISO 8601 date".into());
        Err(err)
    }
}

/// Validates that `end` is not before `start` when both parse.
///
/// Unparseable values are left to `validate_iso8601`.
pub fn validate_date_order(start: &str, end: &str) -> Result<(), ValidationError> {
    match (parse_date_param(start), parse_date_param(end)) {
        (Some(s), Some(e)) if e < s => {
            let mut err = ValidationError::new("date_order");
            err.message = Some("endDate must be greater than or equal to startDate".into());
            Err(err)
        }
        _ => Ok(()),
    }
}
