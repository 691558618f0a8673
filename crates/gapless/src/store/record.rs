use chrono::{DateTime, Utc};

use crate::EpochKey;

/// The persisted counter for one epoch.
///
/// Exactly one record exists per epoch key. It is created lazily by the first
/// issuance of the year, mutated only by a committed issuance or a manual
/// reset, and never deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterEpoch {
    /// The epoch this record numbers. Always equal to the key it is stored
    /// under unless the store was tampered with.
    pub epoch_key: EpochKey,
    /// Last sequence number handed out (0 before the first issuance).
    pub current_sequence: u32,
    pub last_issued_identifier: Option<String>,
    pub last_issued_at: Option<DateTime<Utc>>,
    /// Number of successful issuances over the life of this record.
    pub total_issued: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Every manual reset ever applied, oldest first.
    #[cfg_attr(feature = "serde", serde(default))]
    pub reset_log: Vec<ResetMarker>,
}

impl CounterEpoch {
    /// A record that has not issued anything yet.
    pub fn empty(epoch_key: EpochKey, at: DateTime<Utc>) -> Self {
        Self {
            epoch_key,
            current_sequence: 0,
            last_issued_identifier: None,
            last_issued_at: None,
            total_issued: 0,
            created_at: at,
            updated_at: at,
            reset_log: Vec::new(),
        }
    }

    /// The most recent manual reset, if any.
    pub fn last_reset(&self) -> Option<&ResetMarker> {
        self.reset_log.last()
    }
}

/// Why a counter was overwritten outside of normal issuance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum ResetReason {
    ManualReset,
}

impl ResetReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManualReset => "manual_reset",
        }
    }
}

impl core::fmt::Display for ResetReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit entry written together with a manual reset.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResetMarker {
    pub at: DateTime<Utc>,
    pub reason: ResetReason,
    /// Who authorized the reset.
    pub operator: String,
    pub previous_sequence: u32,
    pub new_value: u32,
}

/// Read-only view of one epoch's counter.
///
/// For an epoch that never issued anything every field holds its zero value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EpochStats {
    pub epoch: EpochKey,
    pub current_sequence: u32,
    pub total_issued: u64,
    pub last_identifier: Option<String>,
    pub last_issued_at: Option<DateTime<Utc>>,
    pub last_reset: Option<ResetMarker>,
}

impl EpochStats {
    pub fn unseen(epoch: EpochKey) -> Self {
        Self {
            epoch,
            current_sequence: 0,
            total_issued: 0,
            last_identifier: None,
            last_issued_at: None,
            last_reset: None,
        }
    }
}

impl From<CounterEpoch> for EpochStats {
    fn from(mut record: CounterEpoch) -> Self {
        Self {
            epoch: record.epoch_key,
            current_sequence: record.current_sequence,
            total_issued: record.total_issued,
            last_identifier: record.last_issued_identifier,
            last_issued_at: record.last_issued_at,
            last_reset: record.reset_log.pop(),
        }
    }
}
