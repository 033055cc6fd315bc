//! Time utilities with a clock abstraction for testability.

use chrono::{DateTime, Utc};

/// Clock trait for dependency injection and testing.
pub trait Clock: Send + Sync {
    /// Current Unix timestamp in milliseconds (UTC).
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time).
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        unix_timestamp_millis()
    }
}

/// Fixed clock for tests (always returns the same instant).
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
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

/// Current Unix timestamp in milliseconds (UTC).
pub fn unix_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a Unix millisecond timestamp as an RFC 3339 string (UTC).
///
/// Out-of-range timestamps fall back to the Unix epoch rather than failing;
/// they can only come from a corrupted in-process value.
pub fn timestamp_to_rfc3339(timestamp_millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_millis)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        .to_rfc3339()
}
