use chrono::{DateTime, SecondsFormat, Utc};

/// Source of "now" for persisted timestamps.
///
/// Services take a `Clock` so tests can pin every `updated_at` value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Current time as an RFC 3339 string with millisecond precision.
    #[must_use]
    pub fn now_rfc3339(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Deterministic timestamp for tests (2023-11-14T22:13:20Z).
#[cfg(any(test, feature = "test-support"))]
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

#[cfg(any(test, feature = "test-support"))]
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[cfg(any(test, feature = "test-support"))]
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
