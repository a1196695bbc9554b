//! Retry policy for quote fetches.

use std::time::Duration;

use async_trait::async_trait;

use crate::constants::{DEFAULT_MAX_FETCH_ATTEMPTS, DEFAULT_RETRY_DELAY_SECS};

/// Delay schedule between failed attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backoff {
    /// Same pause after every failed attempt.
    Fixed(Duration),
    /// Doubles after every failed attempt, capped at `max`.
    Exponential { initial: Duration, max: Duration },
}

/// Bounded retry policy injected into the ingestion engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_FETCH_ATTEMPTS,
            backoff: Backoff::Fixed(Duration::from_secs(DEFAULT_RETRY_DELAY_SECS)),
        }
    }
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed(delay),
        }
    }

    /// Pause to take after the 1-based `attempt` failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match &self.backoff {
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential { initial, max } => {
                let exponent = attempt.saturating_sub(1).min(16);
                initial.saturating_mul(1u32 << exponent).min(*max)
            }
        }
    }

    /// Whether another attempt may follow the 1-based `attempt`.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Waits out a backoff delay.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
