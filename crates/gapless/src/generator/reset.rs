#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Clock, CounterEpoch, CounterStore, DocumentSequencer, EpochKey, Error, MAX_SEQUENCE,
    ResetMarker, ResetReason, Result, SleepProvider, StoreError, StoreTransaction,
};

/// Proof that a named operator asked for a manual reset.
///
/// The operator name is written into the reset marker of the counter record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResetAuthorization {
    operator: String,
}

impl ResetAuthorization {
    /// # Errors
    ///
    /// Returns [`Error::ResetNotPermitted`] if `operator` is blank.
    pub fn new(operator: impl Into<String>) -> Result<Self> {
        let operator = operator.into();
        if operator.trim().is_empty() {
            return Err(Error::ResetNotPermitted {
                reason: "an operator must be named".to_owned(),
            });
        }
        Ok(Self { operator })
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }
}

impl<S, C, P> DocumentSequencer<S, C, P>
where
    S: CounterStore,
    C: Clock,
    P: SleepProvider,
{
    /// Sets the counter of `epoch` back to 0.
    ///
    /// See [`Self::reset_counter_to`].
    ///
    /// # Errors
    ///
    /// See [`Self::reset_counter_to`].
    pub async fn reset_counter(
        &self,
        epoch: EpochKey,
        authorization: &ResetAuthorization,
    ) -> Result<()> {
        self.reset_counter_to(epoch, 0, authorization).await
    }

    /// Overwrites the counter of `epoch` with `new_value` and records who did
    /// it.
    ///
    /// **This breaks the gapless guarantee.** The next issuance returns
    /// `new_value + 1`, which may collide with an identifier already handed
    /// out. Only use it to recover from a corrupted counter.
    ///
    /// The counter and a [`ResetMarker`] are written in a single transaction.
    /// The transaction runs exactly once: a conflicting issuance makes the
    /// reset fail rather than retry.
    ///
    /// # Errors
    ///
    /// - [`Error::ResetNotPermitted`] if resets are disabled in the config
    /// - [`Error::InvalidResetValue`] if `new_value` exceeds 999,999
    /// - [`Error::ManualReset`] if the store read or commit failed
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, authorization), fields(operator = authorization.operator()), err))]
    pub async fn reset_counter_to(
        &self,
        epoch: EpochKey,
        new_value: u32,
        authorization: &ResetAuthorization,
    ) -> Result<()> {
        if !self.config.allow_manual_reset {
            #[cfg(feature = "tracing")]
            tracing::warn!(%epoch, operator = authorization.operator(), "refused manual reset, resets are disabled");
            return Err(Error::ResetNotPermitted {
                reason: "manual resets are disabled for this sequencer".to_owned(),
            });
        }
        if new_value > MAX_SEQUENCE {
            return Err(Error::InvalidResetValue { value: new_value });
        }

        #[cfg(feature = "tracing")]
        tracing::warn!(%epoch, new_value, operator = authorization.operator(), "manual counter reset requested");

        let previous = self
            .apply_reset(epoch, new_value, authorization)
            .await
            .map_err(|source| {
                #[cfg(feature = "tracing")]
                tracing::error!(%epoch, error = %source, "manual counter reset failed");
                Error::ManualReset { epoch, source }
            })?;

        #[cfg(feature = "tracing")]
        tracing::warn!(
            %epoch,
            previous_sequence = previous,
            new_value,
            operator = authorization.operator(),
            "manual counter reset applied"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = previous;
        Ok(())
    }

    /// Returns the sequence the counter held before the reset.
    async fn apply_reset(
        &self,
        epoch: EpochKey,
        new_value: u32,
        authorization: &ResetAuthorization,
    ) -> Result<u32, StoreError> {
        let now = self.clock.now();
        let mut txn = self.store.begin().await?;
        let mut record = txn
            .get(epoch)
            .await?
            .unwrap_or_else(|| CounterEpoch::empty(epoch, now));

        let previous_sequence = record.current_sequence;
        record.epoch_key = epoch;
        record.current_sequence = new_value;
        record.updated_at = now;
        record.reset_log.push(ResetMarker {
            at: now,
            reason: ResetReason::ManualReset,
            operator: authorization.operator().to_owned(),
            previous_sequence,
            new_value,
        });

        txn.set(epoch, record);
        txn.commit().await?;
        Ok(previous_sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_operators_are_refused() {
        for operator in ["", "   ", "\t\n"] {
            assert!(matches!(
                ResetAuthorization::new(operator),
                Err(Error::ResetNotPermitted { .. })
            ));
        }
        assert_eq!(
            ResetAuthorization::new("ops@sos-expat").unwrap().operator(),
            "ops@sos-expat"
        );
    }
}
