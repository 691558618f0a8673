use crate::EpochKey;

/// Failures reported by a [`crate::CounterStore`].
///
/// Implementations must report contention as [`StoreError::Conflict`] so the
/// retry controller can tell it apart from hard failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// A concurrent transaction modified a record this transaction read.
    /// Nothing was written.
    #[error("transaction conflict on epoch {epoch}")]
    Conflict { epoch: EpochKey },

    /// The store could not serve the request.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },
}
