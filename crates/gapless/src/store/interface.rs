use core::future::Future;

use crate::{CounterEpoch, EpochKey, StoreError};

/// A transactional home for counter records.
///
/// The sequencer never locks anything itself; every guarantee about unique,
/// gapless numbers comes from the isolation of the store's transactions. An
/// implementation must therefore guarantee that of two transactions which both
/// read a record and then write it, at most one commits, and the other fails
/// with [`StoreError::Conflict`] without side effects.
///
/// Stores shared between processes (a document database, a SQL row with
/// `SELECT ... FOR UPDATE`, a compare-and-swap key-value API) implement this
/// trait in the embedding application. [`crate::MemoryStore`] is the
/// in-process reference implementation.
pub trait CounterStore: Send + Sync {
    /// The transaction handle. Dropping it without committing discards its
    /// writes.
    type Txn<'a>: StoreTransaction + Send + 'a
    where
        Self: 'a;

    /// Starts a transaction.
    fn begin(&self) -> impl Future<Output = Result<Self::Txn<'_>, StoreError>> + Send;

    /// Reads a record outside of any transaction.
    ///
    /// The value may already be stale when it is returned.
    fn read(
        &self,
        key: EpochKey,
    ) -> impl Future<Output = Result<Option<CounterEpoch>, StoreError>> + Send;

    /// Reads every record outside of any transaction, in ascending key order.
    fn scan(&self) -> impl Future<Output = Result<Vec<CounterEpoch>, StoreError>> + Send;
}

/// One optimistic read-modify-write unit of work.
pub trait StoreTransaction {
    /// Reads a record and adds it to the transaction's read set.
    fn get(
        &mut self,
        key: EpochKey,
    ) -> impl Future<Output = Result<Option<CounterEpoch>, StoreError>> + Send;

    /// Buffers a write of `value` under `key`. Nothing is visible to other
    /// transactions before [`Self::commit`] succeeds.
    fn set(&mut self, key: EpochKey, value: CounterEpoch);

    /// Atomically applies the buffered writes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if any record in the read set changed
    /// since it was read. In that case nothing was written.
    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl<S: CounterStore> CounterStore for std::sync::Arc<S> {
    type Txn<'a>
        = S::Txn<'a>
    where
        Self: 'a;

    fn begin(&self) -> impl Future<Output = Result<Self::Txn<'_>, StoreError>> + Send {
        (**self).begin()
    }

    fn read(
        &self,
        key: EpochKey,
    ) -> impl Future<Output = Result<Option<CounterEpoch>, StoreError>> + Send {
        (**self).read(key)
    }

    fn scan(&self) -> impl Future<Output = Result<Vec<CounterEpoch>, StoreError>> + Send {
        (**self).scan()
    }
}
