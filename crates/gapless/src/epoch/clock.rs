use std::sync::Arc;

use chrono::{DateTime, Utc};

/// A source of wall-clock time.
///
/// The sequencer reads the clock once per attempt: the reading selects the
/// epoch and stamps the counter record. Plugging in a fixed or stepped clock
/// makes epoch rollover deterministic in tests.
///
/// # Example
///
/// ```
/// use chrono::{DateTime, TimeZone, Utc};
/// use gapless::Clock;
///
/// struct FixedTime;
/// impl Clock for FixedTime {
///     fn now(&self) -> DateTime<Utc> {
///         Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
///     }
/// }
///
/// assert_eq!(FixedTime.now().to_rfc3339(), "2026-01-01T00:00:00+00:00");
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// The operating system's wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
