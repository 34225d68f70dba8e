//! Deterministic clock.

use chrono::{DateTime, TimeZone, Utc};
use ferry_core::Clock;

/// A clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// 2024-01-15T09:30:05Z, the instant used throughout the test suites.
    #[must_use]
    pub fn standard() -> Self {
        Self(
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 5)
                .single()
                .unwrap_or_default(),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// ISO-8601 rendering of [`FixedClock::standard`].
pub const STANDARD_TIMESTAMP: &str = "2024-01-15T09:30:05.000Z";
