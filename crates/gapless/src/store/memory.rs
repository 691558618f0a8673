use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    CounterEpoch, CounterStore, EpochKey, StoreError, StoreTransaction,
    store::mutex::{Mutex, lock},
};

#[derive(Clone, Debug)]
struct Versioned {
    version: u64,
    record: CounterEpoch,
}

/// An in-process [`CounterStore`] with optimistic, read-set validated
/// transactions.
///
/// Every record carries a version that is bumped on each committed write. A
/// transaction remembers the version of every record it read, and its commit
/// fails with [`StoreError::Conflict`] if any of them moved in the meantime.
/// The internal lock is only held for a single read or a single commit, never
/// across an `.await`.
///
/// ## Recommended When
/// - Tests and benchmarks
/// - Single-process deployments that persist snapshots from [`Self::scan`]
///
/// Multiple processes sharing one counter need a real database behind
/// [`CounterStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<EpochKey, Versioned>>,
    commits: AtomicU64,
    conflicts: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with `records`, e.g. restored from a backup.
    pub fn with_records(records: impl IntoIterator<Item = CounterEpoch>) -> Self {
        let store = Self::new();
        for record in records {
            store.put(record.epoch_key, record);
        }
        store
    }

    /// Overwrites `key` outside of any transaction.
    ///
    /// Open transactions that read `key` will fail to commit.
    pub fn put(&self, key: EpochKey, record: CounterEpoch) {
        let mut records = lock(&self.records);
        let version = records.get(&key).map_or(1, |v| v.version + 1);
        records.insert(key, Versioned { version, record });
    }

    /// Number of transactions committed so far.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    /// Number of commits rejected with [`StoreError::Conflict`] so far.
    pub fn conflict_count(&self) -> u64 {
        self.conflicts.load(Ordering::Relaxed)
    }
}

impl CounterStore for MemoryStore {
    type Txn<'a> = MemoryTxn<'a>;

    async fn begin(&self) -> Result<MemoryTxn<'_>, StoreError> {
        Ok(MemoryTxn {
            store: self,
            read_set: BTreeMap::new(),
            writes: BTreeMap::new(),
        })
    }

    async fn read(&self, key: EpochKey) -> Result<Option<CounterEpoch>, StoreError> {
        Ok(lock(&self.records).get(&key).map(|v| v.record.clone()))
    }

    async fn scan(&self) -> Result<Vec<CounterEpoch>, StoreError> {
        Ok(lock(&self.records)
            .values()
            .map(|v| v.record.clone())
            .collect())
    }
}

/// A transaction against a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryTxn<'a> {
    store: &'a MemoryStore,
    /// Version observed per key; `None` records that the key was absent.
    read_set: BTreeMap<EpochKey, Option<u64>>,
    writes: BTreeMap<EpochKey, CounterEpoch>,
}

impl StoreTransaction for MemoryTxn<'_> {
    async fn get(&mut self, key: EpochKey) -> Result<Option<CounterEpoch>, StoreError> {
        if let Some(pending) = self.writes.get(&key) {
            return Ok(Some(pending.clone()));
        }
        let records = lock(&self.store.records);
        let entry = records.get(&key);
        self.read_set
            .entry(key)
            .or_insert_with(|| entry.map(|v| v.version));
        Ok(entry.map(|v| v.record.clone()))
    }

    fn set(&mut self, key: EpochKey, value: CounterEpoch) {
        self.writes.insert(key, value);
    }

    async fn commit(self) -> Result<(), StoreError> {
        let store = self.store;
        let mut records = lock(&store.records);

        for (key, seen) in &self.read_set {
            if records.get(key).map(|v| v.version) != *seen {
                store.conflicts.fetch_add(1, Ordering::Relaxed);
                return Err(StoreError::Conflict { epoch: *key });
            }
        }

        for (key, record) in self.writes {
            let version = records.get(&key).map_or(1, |v| v.version + 1);
            records.insert(key, Versioned { version, record });
        }
        store.commits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
