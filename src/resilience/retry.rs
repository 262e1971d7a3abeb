//! Exponential backoff with jitter.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use super::errors::{Error, ErrorKind};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Fraction of the computed delay added as jitter, e.g. 0.1 for 10%.
    pub jitter_fraction: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter_fraction: 0.1,
        }
    }
}

impl RetryPolicy {
    /// The un-jittered delay for a given zero-based attempt number:
    /// `min(base * multiplier^n, max)`.
    pub fn base_delay_for_attempt(&self, attempt: u32) -> Duration {
        let scaled = self.base_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = scaled.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }

    /// The maximum possible delay for an attempt once jitter is added.
    pub fn max_delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.base_delay_for_attempt(attempt);
        base.mul_f64(1.0 + self.jitter_fraction)
    }

    /// Computes the delay for a given attempt with jitter drawn from `rng`,
    /// additive and bounded to `jitter_fraction` of the base delay.
    pub fn delay_for_attempt_with_rng<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let base = self.base_delay_for_attempt(attempt);
        if self.jitter_fraction <= 0.0 {
            return base;
        }
        let jitter_max = base.as_secs_f64() * self.jitter_fraction;
        let jitter = rng.gen_range(0.0..=jitter_max.max(0.0));
        base + Duration::from_secs_f64(jitter)
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.delay_for_attempt_with_rng(attempt, &mut rand::thread_rng())
    }
}

/// Runs `op` until it succeeds, exhausts `policy.max_attempts`, or returns a
/// non-retryable [`Error`]. Attempt counter starts at 0.
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.kind.is_retryable() && attempt + 1 < policy.max_attempts => {
                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    attempt,
                    kind = %err.kind,
                    delay_ms = delay.as_millis() as u64,
                    "retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Same as [`retry_with_backoff`] but surfaces the number of attempts made,
/// used by tests validating the retry-bounds property.
pub async fn retry_with_backoff_counted<T, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> (Result<T, Error>, u32)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return (Ok(value), attempt + 1),
            Err(err) if err.kind.is_retryable() && attempt + 1 < policy.max_attempts => {
                tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
                attempt += 1;
            }
            Err(err) => return (Err(err), attempt + 1),
        }
    }
}
