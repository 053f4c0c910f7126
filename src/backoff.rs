use std::{fmt, future::Future, pin::Pin, time::Duration};

/// Delay before the attempt following failed attempt `attempt` (1-based).
///
/// Grows linearly: `base_ms * attempt`.
pub fn linear_backoff(base_ms: u64, attempt: usize) -> Duration {
    let factor = u64::try_from(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor))
}

pub type SleepFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Non-blocking delay used between attempts.
pub trait Sleeper: fmt::Debug + Send + Sync {
    fn sleep(&self, delay: Duration) -> SleepFuture;
}

/// Suspends on the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> SleepFuture {
        Box::pin(tokio::time::sleep(delay))
    }
}
