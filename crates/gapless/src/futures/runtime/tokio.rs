use core::time::Duration;

use crate::futures::SleepProvider;

/// An implementation of [`SleepProvider`] using Tokio's timer.
///
/// This is the default provider for use in async applications built on Tokio.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleep;
impl SleepProvider for TokioSleep {
    async fn sleep_for(&self, dur: Duration) {
        tokio::time::sleep(dur).await;
    }
}

/// An implementation of [`SleepProvider`] using Tokio's yield.
///
/// This strategy ignores the backoff delay and yields to the scheduler
/// immediately, so a conflicting attempt is retried as soon as other tasks had
/// a chance to run.
///
/// Against a busy shared store this retries in a tighter loop and raises the
/// chance of exhausting the attempt budget; a timer-based sleep (e.g.,
/// [`TokioSleep`]) spreads contending callers out.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioYield;
impl SleepProvider for TokioYield {
    async fn sleep_for(&self, _dur: Duration) {
        tokio::task::yield_now().await;
    }
}
