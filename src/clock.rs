//! Timestamp sources injected into the ledger.

use chrono::{SecondsFormat, Utc};

/// Supplies the `timestamp` of newly appended blocks.
pub trait TimestampSource: Send + Sync {
    fn now(&self) -> String;
}

/// Wall clock, RFC 3339 in UTC with millisecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimestampSource for SystemClock {
    fn now(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Always returns the same value. Useful for reproducible hashes.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl TimestampSource for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}
