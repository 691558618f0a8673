use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};

use crate::{EpochKey, Result};

/// Maps instants onto yearly epochs.
///
/// The calendar holds no counter state: a new year is detected only because
/// the sequencer finds no record under the new key and initializes it lazily.
/// The UTC offset decides at which instant the year boundary falls, so a
/// deployment can roll over at local midnight of its legal jurisdiction.
///
/// # Example
///
/// ```
/// use chrono::{FixedOffset, TimeZone, Utc};
/// use gapless::EpochCalendar;
///
/// let instant = Utc.with_ymd_and_hms(2025, 12, 31, 23, 30, 0).unwrap();
///
/// let utc = EpochCalendar::utc();
/// assert_eq!(utc.epoch_at(instant).unwrap().year(), 2025);
///
/// let paris = EpochCalendar::with_offset(FixedOffset::east_opt(3600).unwrap());
/// assert_eq!(paris.epoch_at(instant).unwrap().year(), 2026);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpochCalendar {
    offset: FixedOffset,
}

impl Default for EpochCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl EpochCalendar {
    /// A calendar whose years start at midnight UTC.
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// A calendar whose years start at midnight of the given offset.
    pub const fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Returns the offset this calendar evaluates dates in.
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Returns the epoch containing `instant`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EpochOutOfRange`] if the local year does not
    /// have four digits.
    pub fn epoch_at(&self, instant: DateTime<Utc>) -> Result<EpochKey> {
        EpochKey::new(instant.with_timezone(&self.offset).year())
    }
}
