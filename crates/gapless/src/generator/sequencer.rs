#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Clock, CounterStore, DocumentId, EpochCalendar, EpochKey, FormatError, Result, SequencerConfig,
    SleepProvider, generator::attempt::Attempt,
};

/// Issues gapless document identifiers from a shared [`CounterStore`].
///
/// A sequencer is cheap to share: wrap it in an `Arc` and call
/// [`Self::next_identifier`] from as many tasks as needed. It holds no lock of
/// its own; concurrent issuances race on the store's transactions and the
/// losers retry with backoff.
///
/// Type parameters:
/// - `S`: where the counter records live
/// - `C`: the wall clock that picks the epoch and stamps records
/// - `P`: how the retry loop waits between attempts
///
/// # Example
///
/// ```
/// # #[cfg(feature = "async-tokio")] {
/// use gapless::{DocumentSequencer, MemoryStore, SequencerConfig};
///
/// let runtime = tokio::runtime::Builder::new_current_thread()
///     .enable_time()
///     .build()
///     .unwrap();
/// let sequencer =
///     DocumentSequencer::with_tokio(MemoryStore::new(), SequencerConfig::default()).unwrap();
///
/// let id = runtime.block_on(sequencer.next_identifier()).unwrap();
/// assert!(sequencer.is_valid_format(&id.to_string()));
/// assert_eq!(id.sequence(), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct DocumentSequencer<S, C, P> {
    pub(crate) store: S,
    pub(crate) clock: C,
    pub(crate) sleeper: P,
    pub(crate) config: SequencerConfig,
    pub(crate) calendar: EpochCalendar,
}

impl<S, C, P> DocumentSequencer<S, C, P>
where
    S: CounterStore,
    C: Clock,
    P: SleepProvider,
{
    /// Creates a sequencer after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if the configuration is
    /// inconsistent.
    pub fn new(store: S, clock: C, sleeper: P, config: SequencerConfig) -> Result<Self> {
        config.validate()?;
        let calendar = config.calendar()?;
        Ok(Self {
            store,
            clock,
            sleeper,
            config,
            calendar,
        })
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The epoch a call to [`Self::next_identifier`] would issue into right
    /// now.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EpochOutOfRange`] if the clock reads a year
    /// outside `1000..=9999`.
    pub fn current_epoch(&self) -> Result<EpochKey> {
        self.calendar.epoch_at(self.clock.now())
    }

    /// Issues the next identifier of the current epoch.
    ///
    /// The returned identifier was committed to the store before this method
    /// returned and will never be returned again (barring a manual reset). The
    /// first call of a new year starts that year at sequence 1.
    ///
    /// If the caller fails to persist its own record afterwards, the number is
    /// lost: a gap, never a duplicate.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::RetriesExhausted`] if every attempt conflicted
    /// - [`crate::Error::SequenceExhausted`] once 999,999 numbers were issued
    /// - [`crate::Error::EpochMismatch`] under
    ///   [`crate::EpochMismatchPolicy::Reject`]
    /// - [`crate::Error::Store`] for non-transient store failures
    ///
    /// On any error no identifier exists; callers must not invent one.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self), fields(tag = %self.config.org_tag), err))]
    pub async fn next_identifier(&self) -> Result<DocumentId> {
        let epoch = self.current_epoch()?;
        let id = self
            .config
            .retry
            .run(&self.sleeper, |_| {
                Attempt {
                    tag: &self.config.org_tag,
                    epoch,
                    now: self.clock.now(),
                    on_mismatch: self.config.epoch_mismatch,
                }
                .run(&self.store)
            })
            .await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(%id, "issued document identifier");
        Ok(id)
    }

    /// Returns `true` if `s` is a well-formed identifier under this
    /// sequencer's tag.
    pub fn is_valid_format(&self, s: &str) -> bool {
        self.config.org_tag.is_valid_format(s)
    }

    /// Parses an identifier issued under this sequencer's tag.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] for malformed input or a foreign tag.
    pub fn parse(&self, s: &str) -> Result<DocumentId, FormatError> {
        self.config.org_tag.parse(s)
    }
}

#[cfg(feature = "async-tokio")]
impl<S: CounterStore> DocumentSequencer<S, crate::SystemClock, crate::TokioSleep> {
    /// A sequencer on the system clock that backs off with Tokio's timer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if the configuration is
    /// inconsistent.
    pub fn with_tokio(store: S, config: SequencerConfig) -> Result<Self> {
        Self::new(store, crate::SystemClock, crate::TokioSleep, config)
    }
}

#[cfg(feature = "async-smol")]
impl<S: CounterStore> DocumentSequencer<S, crate::SystemClock, crate::SmolSleep> {
    /// A sequencer on the system clock that backs off with Smol's timer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if the configuration is
    /// inconsistent.
    pub fn with_smol(store: S, config: SequencerConfig) -> Result<Self> {
        Self::new(store, crate::SystemClock, crate::SmolSleep, config)
    }
}
