use core::{future::Future, time::Duration};

use rand::Rng;

use crate::{Error, Result, RetryPolicy, SleepProvider, StoreError};

/// Exponential backoff schedule between conflicting attempts.
///
/// The base delay after failed attempt `n` (1-based) is
/// `initial_ms * multiplier^(n - 1)`: 100, 200, 400, 800, 1600 ms by default.
///
/// Each real wait adds a random jitter of up to `jitter_percent` of the base
/// delay, so callers that lost the same round do not wake up together and
/// collide again. As long as `jitter_percent <= (multiplier - 1) * 100`, the
/// waits of one caller never shrink from one attempt to the next. The result
/// is capped at `max_ms` when set.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use gapless::Backoff;
///
/// let backoff = Backoff::default();
/// assert_eq!(backoff.delay_for(1), Duration::from_millis(100));
/// assert_eq!(backoff.delay_for(5), Duration::from_millis(1600));
///
/// let wait = backoff.jittered_delay_for(1, &mut rand::rng());
/// assert!(wait >= Duration::from_millis(100) && wait <= Duration::from_millis(200));
///
/// let capped = backoff.with_max_ms(500);
/// assert_eq!(capped.delay_for(5), Duration::from_millis(500));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Backoff {
    pub initial_ms: u64,
    pub multiplier: u32,
    pub max_ms: Option<u64>,
    /// Upper bound of the random extra wait, in percent of the base delay.
    pub jitter_percent: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::exponential(100, 2).with_jitter_percent(100)
    }
}

impl Backoff {
    /// A schedule without jitter.
    pub const fn exponential(initial_ms: u64, multiplier: u32) -> Self {
        Self {
            initial_ms,
            multiplier,
            max_ms: None,
            jitter_percent: 0,
        }
    }

    /// No delay at all between attempts.
    pub const fn none() -> Self {
        Self::exponential(0, 1)
    }

    pub const fn with_max_ms(mut self, max_ms: u64) -> Self {
        self.max_ms = Some(max_ms);
        self
    }

    pub const fn with_jitter_percent(mut self, jitter_percent: u32) -> Self {
        self.jitter_percent = jitter_percent;
        self
    }

    /// Largest jitter that keeps one caller's waits non-decreasing.
    pub fn max_monotonic_jitter_percent(&self) -> u32 {
        self.multiplier.saturating_sub(1).saturating_mul(100)
    }

    /// Base delay after the given failed attempt (1-based), without jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.capped(self.base_ms(attempt)))
    }

    /// Delay after the given failed attempt (1-based), with a uniformly drawn
    /// jitter in `0..=base * jitter_percent / 100` added before capping.
    pub fn jittered_delay_for<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let base = self.base_ms(attempt);
        let spread = base.saturating_mul(u64::from(self.jitter_percent)) / 100;
        let jitter = if spread == 0 {
            0
        } else {
            rng.random_range(0..=spread)
        };
        Duration::from_millis(self.capped(base.saturating_add(jitter)))
    }

    fn base_ms(&self, attempt: u32) -> u64 {
        let factor = u64::from(self.multiplier).saturating_pow(attempt.saturating_sub(1));
        self.initial_ms.saturating_mul(factor)
    }

    fn capped(&self, millis: u64) -> u64 {
        self.max_ms.map_or(millis, |max| millis.min(max))
    }
}

impl RetryPolicy {
    /// Runs `attempt` until it succeeds, fails with something other than a
    /// transaction conflict, or the attempt budget is spent.
    ///
    /// Conflicts are logged and absorbed; between two attempts the task sleeps
    /// on `sleeper` for the jittered backoff delay. No sleep happens after the
    /// last attempt. The closure receives the 1-based attempt number.
    pub(crate) async fn run<P, F, Fut, T>(&self, sleeper: &P, mut attempt: F) -> Result<T>
    where
        P: SleepProvider,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut n = 1;
        loop {
            let source = match attempt(n).await {
                Err(Error::Store(source @ StoreError::Conflict { .. })) => source,
                other => return other,
            };

            if n >= self.max_attempts {
                #[cfg(feature = "tracing")]
                tracing::error!(attempts = n, error = %source, "transaction conflicts exhausted the retry budget");
                return Err(Error::RetriesExhausted {
                    attempts: n,
                    source,
                });
            }

            let delay = self.backoff.jittered_delay_for(n, &mut rand::rng());
            #[cfg(feature = "tracing")]
            tracing::warn!(
                attempt = n,
                max_attempts = self.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %source,
                "transaction conflict, retrying"
            );
            sleeper.sleep_for(delay).await;
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures::executor::block_on;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{EpochKey, ImmediateSleep};

    #[derive(Clone, Default)]
    struct RecordingSleep {
        delays: Arc<Mutex<Vec<Duration>>>,
    }

    impl SleepProvider for RecordingSleep {
        async fn sleep_for(&self, dur: Duration) {
            self.delays.lock().unwrap().push(dur);
        }
    }

    fn conflict() -> Error {
        Error::Store(StoreError::Conflict {
            epoch: EpochKey::new(2026).unwrap(),
        })
    }

    #[test]
    fn default_schedule_doubles_from_100ms() {
        let backoff = Backoff::default();
        let delays: Vec<_> = (1..=5).map(|n| backoff.delay_for(n).as_millis()).collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1600]);
        assert_eq!(Backoff::none().delay_for(4), Duration::ZERO);
    }

    #[test]
    fn schedule_saturates_instead_of_overflowing() {
        let backoff = Backoff::exponential(u64::MAX / 2, 10);
        assert_eq!(backoff.delay_for(40), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn returns_first_success() {
        let policy = RetryPolicy::default();
        let sleeper = RecordingSleep::default();
        let mut calls = 0;
        let out = block_on(policy.run(&sleeper, |n| {
            calls += 1;
            async move { if n < 3 { Err(conflict()) } else { Ok(n) } }
        }));
        assert_eq!(out, Ok(3));
        assert_eq!(calls, 3);
        let delays = sleeper.delays.lock().unwrap();
        assert_eq!(delays.len(), 2);
        assert!((100..=200).contains(&delays[0].as_millis()));
        assert!((200..=400).contains(&delays[1].as_millis()));
    }

    #[test]
    fn jitter_stays_within_bounds_and_never_shrinks() {
        let mut rng = StdRng::seed_from_u64(7);
        let backoff = Backoff::default();
        assert_eq!(backoff.max_monotonic_jitter_percent(), 100);

        for _ in 0..1_000 {
            let waits: Vec<_> = (1..=5)
                .map(|n| backoff.jittered_delay_for(n, &mut rng))
                .collect();
            for (n, wait) in (1..=5).zip(&waits) {
                let base = backoff.delay_for(n);
                assert!(*wait >= base && *wait <= base * 2, "{wait:?} for attempt {n}");
            }
            assert!(waits.windows(2).all(|w| w[0] <= w[1]), "{waits:?}");
        }
    }

    #[test]
    fn jitter_spreads_callers_of_the_same_round() {
        let mut rng = StdRng::seed_from_u64(11);
        let backoff = Backoff::default();
        let mut waits: Vec<_> = (0..100)
            .map(|_| backoff.jittered_delay_for(1, &mut rng))
            .collect();
        waits.sort_unstable();
        waits.dedup();
        assert!(waits.len() > 30, "only {} distinct waits", waits.len());
    }

    #[test]
    fn zero_jitter_and_cap_are_exact() {
        let mut rng = StdRng::seed_from_u64(3);
        let plain = Backoff::exponential(100, 2);
        assert_eq!(plain.jittered_delay_for(3, &mut rng), Duration::from_millis(400));

        let capped = Backoff::default().with_max_ms(250);
        for _ in 0..100 {
            assert!(capped.jittered_delay_for(2, &mut rng) <= Duration::from_millis(250));
            assert_eq!(capped.jittered_delay_for(4, &mut rng), Duration::from_millis(250));
        }
    }

    #[test]
    fn exhausts_after_max_attempts() {
        let policy = RetryPolicy::default();
        let sleeper = RecordingSleep::default();
        let mut calls = 0;
        let out: Result<()> = block_on(policy.run(&sleeper, |_| {
            calls += 1;
            async { Err(conflict()) }
        }));

        assert_eq!(calls, 5);
        match out {
            Err(Error::RetriesExhausted { attempts, source }) => {
                assert_eq!(attempts, 5);
                assert!(matches!(source, StoreError::Conflict { .. }));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        let delays = sleeper.delays.lock().unwrap();
        assert_eq!(delays.len(), 4);
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn other_errors_are_not_retried() {
        let policy = RetryPolicy::default();
        let mut calls = 0;
        let out: Result<()> = block_on(policy.run(&ImmediateSleep, |_| {
            calls += 1;
            async {
                Err(Error::Store(StoreError::Unavailable {
                    reason: "down".to_owned(),
                }))
            }
        }));
        assert_eq!(calls, 1);
        assert!(matches!(out, Err(Error::Store(StoreError::Unavailable { .. }))));
    }

    #[test]
    fn single_attempt_budget_never_sleeps() {
        let policy = RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        };
        let sleeper = RecordingSleep::default();
        let out: Result<()> = block_on(policy.run(&sleeper, |_| async { Err(conflict()) }));
        assert!(matches!(out, Err(Error::RetriesExhausted { attempts: 1, .. })));
        assert!(sleeper.delays.lock().unwrap().is_empty());
    }
}
