use chrono::{DateTime, Utc};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    CounterEpoch, CounterStore, DocumentId, EpochKey, EpochMismatchPolicy, Error, MAX_SEQUENCE,
    OrgTag, Result, StoreTransaction,
};

/// One transactional read-increment-write of an epoch counter.
///
/// A conflict at commit surfaces as `Error::Store(StoreError::Conflict)` with
/// nothing written; the caller decides whether to run another attempt.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Attempt<'a> {
    pub tag: &'a OrgTag,
    pub epoch: EpochKey,
    pub now: DateTime<Utc>,
    pub on_mismatch: EpochMismatchPolicy,
}

impl Attempt<'_> {
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self, store), fields(epoch = %self.epoch)))]
    pub(crate) async fn run<S: CounterStore>(self, store: &S) -> Result<DocumentId> {
        let mut txn = store.begin().await?;
        let stored = txn.get(self.epoch).await?;
        let mut record = self.starting_record(stored)?;

        let next = record
            .current_sequence
            .checked_add(1)
            .filter(|next| *next <= MAX_SEQUENCE)
            .ok_or(Error::SequenceExhausted { epoch: self.epoch })?;
        let id = DocumentId::from_parts(self.tag.clone(), self.epoch, next);

        record.current_sequence = next;
        record.total_issued += 1;
        record.last_issued_identifier = Some(id.to_string());
        record.last_issued_at = Some(self.now);
        record.updated_at = self.now;

        txn.set(self.epoch, record);
        txn.commit().await?;
        Ok(id)
    }

    /// The record the increment applies to: the stored one, or a fresh one at
    /// sequence 0 for a new epoch.
    ///
    /// A record tagged with another epoch keeps its lifetime total, creation
    /// time and reset trail; only its key and sequence restart.
    fn starting_record(&self, stored: Option<CounterEpoch>) -> Result<CounterEpoch> {
        match stored {
            None => Ok(CounterEpoch::empty(self.epoch, self.now)),
            Some(record) if record.epoch_key == self.epoch => Ok(record),
            Some(mut record) => match self.on_mismatch {
                EpochMismatchPolicy::Reject => Err(Error::EpochMismatch {
                    stored: record.epoch_key,
                    expected: self.epoch,
                }),
                EpochMismatchPolicy::Reinitialize => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        expected = %self.epoch,
                        stored = %record.epoch_key,
                        stale_sequence = record.current_sequence,
                        total_issued = record.total_issued,
                        stale_last_identifier = ?record.last_issued_identifier,
                        "counter record tagged with another epoch, restarting numbering at 1"
                    );
                    record.epoch_key = self.epoch;
                    record.current_sequence = 0;
                    Ok(record)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use futures::executor::block_on;

    use super::*;
    use crate::{MemoryStore, ResetMarker, ResetReason, StoreError};

    fn epoch(year: i32) -> EpochKey {
        EpochKey::new(year).unwrap()
    }

    fn attempt(tag: &OrgTag, year: i32, on_mismatch: EpochMismatchPolicy) -> Attempt<'_> {
        Attempt {
            tag,
            epoch: epoch(year),
            now: Utc.with_ymd_and_hms(year, 5, 4, 10, 0, 0).unwrap(),
            on_mismatch,
        }
    }

    #[test]
    fn lazily_initializes_and_increments() {
        block_on(async {
            let store = MemoryStore::new();
            let tag = OrgTag::SOSEXPAT;
            let step = attempt(&tag, 2026, EpochMismatchPolicy::Reinitialize);

            assert_eq!(step.run(&store).await.unwrap().to_string(), "SOSEXPAT-2026-000001");
            assert_eq!(step.run(&store).await.unwrap().to_string(), "SOSEXPAT-2026-000002");

            let record = store.read(epoch(2026)).await.unwrap().unwrap();
            assert_eq!(record.current_sequence, 2);
            assert_eq!(record.total_issued, 2);
            assert_eq!(
                record.last_issued_identifier.as_deref(),
                Some("SOSEXPAT-2026-000002")
            );
            assert_eq!(record.last_issued_at, Some(step.now));
            assert_eq!(record.created_at, step.now);
        });
    }

    #[test]
    fn mismatched_record_restarts_numbering_but_keeps_its_history() {
        block_on(async {
            let tag = OrgTag::SOSEXPAT;
            let step = attempt(&tag, 2026, EpochMismatchPolicy::Reinitialize);
            let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
            let marker = ResetMarker {
                at: created,
                reason: ResetReason::ManualReset,
                operator: "ops".to_owned(),
                previous_sequence: 3,
                new_value: 0,
            };
            let stale = CounterEpoch {
                current_sequence: 41,
                total_issued: 41,
                reset_log: vec![marker.clone()],
                ..CounterEpoch::empty(epoch(2024), created)
            };
            let store = MemoryStore::new();
            store.put(epoch(2026), stale);

            let id = step.run(&store).await.unwrap();
            assert_eq!(id.to_string(), "SOSEXPAT-2026-000001");

            let record = store.read(epoch(2026)).await.unwrap().unwrap();
            assert_eq!(record.epoch_key, epoch(2026));
            assert_eq!(record.current_sequence, 1);
            assert_eq!(record.total_issued, 42);
            assert_eq!(record.created_at, created);
            assert_eq!(record.reset_log, vec![marker]);
            assert_eq!(record.last_issued_at, Some(step.now));

            let next = step.run(&store).await.unwrap();
            assert_eq!(next.sequence(), 2);
        });
    }

    #[test]
    fn mismatched_record_is_rejected_when_configured() {
        block_on(async {
            let tag = OrgTag::SOSEXPAT;
            let step = attempt(&tag, 2026, EpochMismatchPolicy::Reject);
            let stale = CounterEpoch {
                current_sequence: 41,
                ..CounterEpoch::empty(epoch(2025), step.now)
            };
            let store = MemoryStore::new();
            store.put(epoch(2026), stale.clone());

            assert_eq!(
                step.run(&store).await,
                Err(Error::EpochMismatch {
                    stored: epoch(2025),
                    expected: epoch(2026),
                })
            );
            assert_eq!(store.read(epoch(2026)).await.unwrap(), Some(stale));
        });
    }

    #[test]
    fn refuses_to_issue_past_six_digits() {
        block_on(async {
            let tag = OrgTag::SOSEXPAT;
            let step = attempt(&tag, 2026, EpochMismatchPolicy::Reinitialize);
            let full = CounterEpoch {
                current_sequence: MAX_SEQUENCE,
                ..CounterEpoch::empty(epoch(2026), step.now)
            };
            let store = MemoryStore::new();
            store.put(epoch(2026), full.clone());

            assert_eq!(
                step.run(&store).await,
                Err(Error::SequenceExhausted {
                    epoch: epoch(2026)
                })
            );
            assert_eq!(store.read(epoch(2026)).await.unwrap(), Some(full));
            assert_eq!(store.commit_count(), 0);
        });
    }

    #[test]
    fn interleaved_attempt_conflicts_without_writing() {
        block_on(async {
            let tag = OrgTag::SOSEXPAT;
            let step = attempt(&tag, 2026, EpochMismatchPolicy::Reinitialize);
            let store = MemoryStore::new();
            step.run(&store).await.unwrap();

            // A second transaction reads, then loses the race to a full attempt.
            let mut slow = store.begin().await.unwrap();
            let mut record = slow.get(epoch(2026)).await.unwrap().unwrap();
            step.run(&store).await.unwrap();
            record.current_sequence += 1;
            slow.set(epoch(2026), record);
            assert_eq!(
                slow.commit().await,
                Err(StoreError::Conflict {
                    epoch: epoch(2026)
                })
            );
            assert_eq!(store.read(epoch(2026)).await.unwrap().unwrap().current_sequence, 2);
        });
    }
}
