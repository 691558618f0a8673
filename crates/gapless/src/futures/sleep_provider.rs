use core::{future::Future, time::Duration};

/// A trait that abstracts over how to sleep for a given [`Duration`] in async
/// contexts.
///
/// The retry controller calls it between two conflicting attempts. This keeps
/// the sequencer generic over runtimes like `Tokio` or `Smol`, and lets tests
/// skip or record the backoff delays.
pub trait SleepProvider: Send + Sync {
    /// We require `Send` so that the future can be safely moved across threads
    fn sleep_for(&self, dur: Duration) -> impl Future<Output = ()> + Send;
}

/// A [`SleepProvider`] that returns immediately without yielding.
///
/// Useful in tests and in single-threaded executors where the conflicting
/// transaction has already finished by the time the retry runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateSleep;

impl SleepProvider for ImmediateSleep {
    fn sleep_for(&self, _dur: Duration) -> impl Future<Output = ()> + Send {
        core::future::ready(())
    }
}

impl<P: SleepProvider> SleepProvider for &P {
    fn sleep_for(&self, dur: Duration) -> impl Future<Output = ()> + Send {
        (**self).sleep_for(dur)
    }
}
