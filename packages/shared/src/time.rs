//! Time-related utilities with clock abstraction for testability.
//!
//! All timestamps handled by classchat are Unix milliseconds in UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Datetime text layout used by the classroom backend's SQL tables.
const SQL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp in UTC (milliseconds)
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        now_millis()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Get current Unix timestamp in UTC (milliseconds)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert Unix timestamp (milliseconds) to RFC 3339 in UTC.
///
/// Out-of-range timestamps render as the Unix epoch.
pub fn timestamp_to_rfc3339(timestamp_millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Convert Unix timestamp (milliseconds) to the SQL datetime text layout
/// (`YYYY-MM-DD HH:MM:SS.ffffff`, UTC).
pub fn timestamp_to_sql(timestamp_millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_millis)
        .unwrap_or_default()
        .naive_utc()
        .format(SQL_DATETIME_FORMAT)
        .to_string()
}

/// Parse the SQL datetime text layout back into Unix milliseconds (UTC).
///
/// Returns `None` when the text is not in the expected layout.
pub fn sql_to_timestamp(text: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(text, SQL_DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}
