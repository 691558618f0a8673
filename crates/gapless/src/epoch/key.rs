use core::fmt;

use crate::{Error, Result};

/// A calendar year that scopes one gapless numbering sequence.
///
/// Epoch keys are always rendered as exactly four digits, so only years in
/// `1000..=9999` are representable.
///
/// # Example
///
/// ```
/// use gapless::EpochKey;
///
/// let epoch = EpochKey::new(2026).unwrap();
/// assert_eq!(epoch.year(), 2026);
/// assert_eq!(epoch.to_string(), "2026");
/// assert!(EpochKey::new(999).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u16", into = "u16"))]
pub struct EpochKey(u16);

impl EpochKey {
    /// Smallest representable epoch.
    pub const MIN: Self = Self(1000);
    /// Largest representable epoch.
    pub const MAX: Self = Self(9999);

    /// Creates an epoch key for the given calendar year.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EpochOutOfRange`] if `year` does not have exactly four
    /// digits.
    pub fn new(year: i32) -> Result<Self> {
        match u16::try_from(year) {
            Ok(y) if (Self::MIN.0..=Self::MAX.0).contains(&y) => Ok(Self(y)),
            _ => Err(Error::EpochOutOfRange { year }),
        }
    }

    /// Returns the calendar year.
    pub const fn year(self) -> u16 {
        self.0
    }

    /// Returns the epoch that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        (self < Self::MAX).then(|| Self(self.0 + 1))
    }
}

impl fmt::Display for EpochKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl TryFrom<u16> for EpochKey {
    type Error = Error;

    fn try_from(year: u16) -> Result<Self> {
        Self::new(i32::from(year))
    }
}

impl From<EpochKey> for u16 {
    fn from(key: EpochKey) -> Self {
        key.0
    }
}
