//! Timestamp helpers.
//!
//! SQLite stores timestamps as `YYYY-MM-DD HH:MM:SS` in UTC (from `datetime('now')`).

use chrono::{DateTime, NaiveDateTime, Utc};

const SQLITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert a SQLite UTC timestamp to RFC 3339 (`2024-01-15T10:30:00Z`).
///
/// Strings that are already RFC 3339 are normalised to UTC; anything
/// unparseable is returned unchanged.
pub fn to_rfc3339(datetime_str: &str) -> String {
    match parse_utc(datetime_str) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        None => datetime_str.to_string(),
    }
}

/// Parse a stored timestamp as UTC.
pub fn parse_utc(datetime_str: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(datetime_str) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(datetime_str, SQLITE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
