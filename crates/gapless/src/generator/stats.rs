#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Clock, CounterEpoch, CounterStore, DocumentSequencer, EpochKey, EpochStats, Result,
    SleepProvider,
};

impl<S, C, P> DocumentSequencer<S, C, P>
where
    S: CounterStore,
    C: Clock,
    P: SleepProvider,
{
    /// Last sequence number issued in `epoch`, or 0 if nothing was issued
    /// yet.
    ///
    /// This is a plain read: by the time it returns, another caller may have
    /// issued more numbers. Never derive the next identifier from it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Store`] if the store cannot be read.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), err))]
    pub async fn current_sequence(&self, epoch: EpochKey) -> Result<u32> {
        let record = self.store.read(epoch).await?;
        Ok(record.map_or(0, |r| r.current_sequence))
    }

    /// Read-only statistics for `epoch`.
    ///
    /// An epoch without a counter record reports zeros.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Store`] if the store cannot be read.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), err))]
    pub async fn stats(&self, epoch: EpochKey) -> Result<EpochStats> {
        let stats = match self.store.read(epoch).await? {
            // Report under the key asked for even if the record is mislabeled.
            Some(record) => EpochStats {
                epoch,
                ..record.into()
            },
            None => EpochStats::unseen(epoch),
        };
        Ok(stats)
    }

    /// Every counter record in the store, oldest epoch first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Store`] if the store cannot be read.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), err))]
    pub async fn history(&self) -> Result<Vec<CounterEpoch>> {
        Ok(self.store.scan().await?)
    }
}
