//! Error types for document number issuance.
//!
//! Every fallible operation in this crate returns [`Error`]. Only one case is
//! ever absorbed internally: a [`StoreError::Conflict`] raised by a single
//! transaction attempt, which the retry controller swallows until its attempt
//! budget runs out. Everything else reaches the caller unchanged.
//!
//! ## Error Cases
//! - `Store`: the counter store failed. A `Conflict` here means the caller saw
//!   a conflict outside the retry loop; `Unavailable` is always terminal.
//! - `RetriesExhausted`: every attempt conflicted.
//! - `EpochMismatch`: a record disagreed with its key and the sequencer was
//!   configured to reject the anomaly.
//! - `SequenceExhausted`: the epoch ran out of six-digit sequence numbers.
//! - `Format`: an identifier string failed validation.
//! - `ManualReset`, `ResetNotPermitted`, `InvalidResetValue`: privileged
//!   reset failures. These are never retried.

use crate::{epoch::EpochKey, id::FormatError, store::StoreError};

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Unified error type for the sequencer.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The counter store rejected or failed an operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Every attempt of the bounded retry loop hit a transactional conflict.
    ///
    /// Callers must fail the enclosing operation. An identifier must never be
    /// fabricated after this error.
    #[error("gave up after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: StoreError,
    },

    /// The counter record stored under `expected` claims to belong to
    /// `stored`.
    #[error("counter record for epoch {expected} is tagged with epoch {stored}")]
    EpochMismatch { stored: EpochKey, expected: EpochKey },

    /// The epoch already issued the largest six-digit sequence number.
    #[error("sequence space exhausted for epoch {epoch}")]
    SequenceExhausted { epoch: EpochKey },

    /// A calendar year outside of `1000..=9999` cannot be an epoch key.
    #[error("year {year} is outside the four-digit epoch range")]
    EpochOutOfRange { year: i32 },

    /// An identifier string is malformed.
    #[error("invalid document identifier: {0}")]
    Format(#[from] FormatError),

    /// An organisation tag does not satisfy the tag alphabet.
    #[error("invalid organisation tag: {tag:?}")]
    InvalidOrgTag { tag: String },

    /// The sequencer configuration is inconsistent.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A manual reset was refused before touching the store.
    #[error("manual reset not permitted: {reason}")]
    ResetNotPermitted { reason: String },

    /// A manual reset asked for a value no identifier can carry.
    #[error("manual reset value {value} exceeds the maximum sequence")]
    InvalidResetValue { value: u32 },

    /// The store failed while applying a manual reset.
    #[error("manual reset of epoch {epoch} failed: {source}")]
    ManualReset {
        epoch: EpochKey,
        #[source]
        source: StoreError,
    },
}

impl Error {
    /// Returns `true` for the transient conflict the retry controller absorbs.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(StoreError::Conflict { .. }))
    }
}
