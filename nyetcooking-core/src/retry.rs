//! Bounded retry with a pluggable delay schedule.
//!
//! Used for attempt-level recipe fetching and for connecting to the cache
//! backend at startup. Sleeping goes through [`Sleeper`] so tests can observe
//! exactly how often and how long the loop waited.

use std::fmt;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay after every failed attempt.
    Fixed(Duration),
    /// `initial * 2^(attempt - 1)`.
    Exponential { initial: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed(delay),
        }
    }

    pub fn exponential(max_attempts: u32, initial: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Exponential { initial },
        }
    }

    /// Default for fetching a recipe page: 3 attempts, 2 seconds apart.
    pub fn recipe_fetch() -> Self {
        Self::fixed(3, Duration::from_secs(2))
    }

    /// How long to wait after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { initial } => {
                let exp = attempt.saturating_sub(1).min(31);
                initial.saturating_mul(1u32 << exp)
            }
        }
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested sleeps and returns immediately. For tests.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn count(&self) -> usize {
        self.sleeps().len()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
    }
}

/// Run `op` until it succeeds or the policy's attempts are used up.
///
/// `op` receives the 1-based attempt number. There is no sleep after the
/// final attempt; its error is returned as-is.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    label: &str,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(label, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    label,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "attempt failed, retrying"
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::warn!(label, attempt, error = %e, "all attempts failed");
                return Err(e);
            }
        }
    }
}
