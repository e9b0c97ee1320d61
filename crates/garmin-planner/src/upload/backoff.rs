//! Retry backoff policy
//!
//! The delay is a pure function of the attempt number; the actual sleep
//! sits behind the [`Delay`] trait so tests can drive retries without
//! elapsed time.

use std::time::Duration;

/// Exponential backoff: base * multiplier^attempt, capped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    base: Duration,
    max: Duration,
    multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            max: Duration::from_secs(60),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    pub fn new(base: Duration, max: Duration, multiplier: u32) -> Self {
        Self {
            base,
            max,
            multiplier,
        }
    }

    /// Delay before retry number `attempt` (0-based: the first retry
    /// waits the base delay)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }
}

/// Injected sleep mechanism
#[allow(async_fn_in_trait)]
pub trait Delay {
    async fn sleep(&self, duration: Duration);
}

/// Real delay backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// No-op delay for tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    async fn sleep(&self, _duration: Duration) {}
}
