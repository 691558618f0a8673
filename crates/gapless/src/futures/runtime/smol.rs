use core::time::Duration;

use smol::Timer;

use crate::futures::SleepProvider;

/// An implementation of [`SleepProvider`] using Smol's timer.
///
/// This is the default provider for use in async applications built on Smol.
#[derive(Clone, Copy, Debug, Default)]
pub struct SmolSleep;
impl SleepProvider for SmolSleep {
    async fn sleep_for(&self, dur: Duration) {
        Timer::after(dur).await;
    }
}

/// An implementation of [`SleepProvider`] using Smol's yield.
///
/// See [`crate::TokioYield`] for the trade-offs of retrying without a timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct SmolYield;
impl SleepProvider for SmolYield {
    async fn sleep_for(&self, _dur: Duration) {
        smol::future::yield_now().await;
    }
}
