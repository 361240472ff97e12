//! Timestamp helpers.
//!
//! Timestamps are persisted as microseconds since the Unix epoch and exchanged
//! over the wire as RFC 3339 strings.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts an instant to microseconds since the Unix epoch.
#[must_use]
pub fn to_micros(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_micros()
}

/// Converts microseconds since the Unix epoch back to an instant.
///
/// # Errors
///
/// Returns [`Error::InvalidTimestamp`] if the value is outside chrono's range.
pub fn from_micros(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| Error::InvalidTimestamp(format!("{micros} is out of range")))
}

/// Parses an ISO-8601 timestamp.
///
/// Accepts RFC 3339 with an offset (`2030-01-01T00:00:00Z`,
/// `2030-01-01T02:00:00+02:00`), a naive date-time taken as UTC, or a bare
/// date taken as midnight UTC.
///
/// # Errors
///
/// Returns [`Error::InvalidTimestamp`] if no accepted format matches.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| Error::InvalidTimestamp(format!("'{input}' is not an ISO-8601 timestamp")))
}
