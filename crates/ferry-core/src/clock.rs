//! Host-provided time source.

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of the host's current time.
///
/// Operations never read the system clock directly so tests can pin the
/// timestamps they stamp into documents.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Format an instant the way `Date.prototype.toISOString` does:
/// millisecond precision with a `Z` suffix.
#[must_use]
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
