use chrono::FixedOffset;

use crate::{Backoff, EpochCalendar, Error, OrgTag, Result};

/// What to do when a counter record is stored under one epoch but claims to
/// belong to another.
///
/// This can only happen through manual edits or a broken migration. The
/// historical behavior is to log the anomaly and restart numbering at 1 for
/// the requested epoch; `Reject` fails the issuance instead and leaves the
/// record untouched for an operator to inspect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EpochMismatchPolicy {
    #[default]
    Reinitialize,
    Reject,
}

/// Bounds the retry loop around one issuance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RetryPolicy {
    /// Total number of transaction attempts, including the first one.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::default(),
        }
    }
}

/// Runtime configuration for a [`crate::DocumentSequencer`].
///
/// The defaults issue `SOSEXPAT-YYYY-NNNNNN` numbers on UTC years, retry a
/// conflicting transaction up to five times with jittered 100 ms doubling
/// backoff, keep the historical epoch mismatch fallback and refuse manual
/// resets.
///
/// # Example
///
/// ```
/// use gapless::{EpochMismatchPolicy, OrgTag, SequencerConfig};
///
/// let config = SequencerConfig::default()
///     .with_org_tag(OrgTag::new("DOC").unwrap())
///     .with_max_attempts(8)
///     .with_epoch_mismatch(EpochMismatchPolicy::Reject)
///     .with_utc_offset_secs(3600);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SequencerConfig {
    pub org_tag: OrgTag,
    pub retry: RetryPolicy,
    pub epoch_mismatch: EpochMismatchPolicy,
    /// Manual resets are refused unless this is set.
    pub allow_manual_reset: bool,
    /// Offset from UTC, in seconds, at which years start.
    pub utc_offset_secs: i32,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            org_tag: OrgTag::SOSEXPAT,
            retry: RetryPolicy::default(),
            epoch_mismatch: EpochMismatchPolicy::default(),
            allow_manual_reset: false,
            utc_offset_secs: 0,
        }
    }
}

impl SequencerConfig {
    pub fn with_org_tag(mut self, org_tag: OrgTag) -> Self {
        self.org_tag = org_tag;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.retry.backoff = backoff;
        self
    }

    pub fn with_epoch_mismatch(mut self, policy: EpochMismatchPolicy) -> Self {
        self.epoch_mismatch = policy;
        self
    }

    pub fn with_manual_reset(mut self, allow: bool) -> Self {
        self.allow_manual_reset = allow;
        self
    }

    pub fn with_utc_offset_secs(mut self, secs: i32) -> Self {
        self.utc_offset_secs = secs;
        self
    }

    /// Checks the settings for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if no attempt is allowed, the backoff
    /// multiplier is zero, the jitter could make a later wait shorter than an
    /// earlier one, or the UTC offset is a day or more.
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts must be greater than 0"));
        }
        if self.retry.backoff.multiplier == 0 {
            return Err(invalid("retry.backoff.multiplier must be greater than 0"));
        }
        let backoff = self.retry.backoff;
        if backoff.jitter_percent > backoff.max_monotonic_jitter_percent() {
            return Err(invalid(format!(
                "retry.backoff.jitter_percent ({}) exceeds {} for multiplier {}",
                backoff.jitter_percent,
                backoff.max_monotonic_jitter_percent(),
                backoff.multiplier
            )));
        }
        if let Some(max_ms) = self.retry.backoff.max_ms {
            if max_ms < self.retry.backoff.initial_ms {
                return Err(invalid(format!(
                    "retry.backoff.max_ms ({max_ms}) is below initial_ms ({})",
                    self.retry.backoff.initial_ms
                )));
            }
        }
        self.calendar().map(|_| ())
    }

    /// The calendar described by [`Self::utc_offset_secs`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the offset is out of range.
    pub fn calendar(&self) -> Result<EpochCalendar> {
        FixedOffset::east_opt(self.utc_offset_secs)
            .map(EpochCalendar::with_offset)
            .ok_or_else(|| {
                invalid(format!(
                    "utc_offset_secs ({}) must be within one day",
                    self.utc_offset_secs
                ))
            })
    }
}

fn invalid(reason: impl Into<String>) -> Error {
    Error::InvalidConfig {
        reason: reason.into(),
    }
}
