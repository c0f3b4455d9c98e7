//! Date handling for the backend's loosely controlled formats.
//!
//! Writes always use `MM/dd/yyyy`, which the date field validates against.
//! Reads try an ordered list of formats; callers decide what a miss means.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format the backend validates date fields against.
pub const BACKEND_DATE_FORMAT: &str = "%m/%d/%Y";

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", BACKEND_DATE_FORMAT];

/// Tried after RFC 3339; `%.f` makes fractional seconds optional.
const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

pub fn format_date(date: NaiveDate) -> String {
    date.format(BACKEND_DATE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Parses a creation timestamp; offsets are normalized to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
