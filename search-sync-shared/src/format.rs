//! Date and time formatting shared by the index documents.
//!
//! The REST API emits dates as `YYYY-MM-DD`, times as `HH:MM:SS` and
//! timestamps as `YYYY-MM-DD HH:MM:SS`. Documents use the same layout so
//! clients reading both surfaces see identical values.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Calendar date layout.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wall-clock time layout.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Timestamp layout.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a calendar date as `YYYY-MM-DD`.
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format a time of day as `HH:MM:SS`. Sub-second precision is dropped.
pub fn format_time(time: &NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS`. Sub-second precision is dropped.
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn format_optional_date(date: Option<&NaiveDate>) -> Option<String> {
    date.map(format_date)
}

pub fn format_optional_time(time: Option<&NaiveTime>) -> Option<String> {
    time.map(format_time)
}
