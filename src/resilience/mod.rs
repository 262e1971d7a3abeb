//! Retry, circuit-breaking, and rate-limiting for provider calls.
//!
//! The runtime harness and the vSphere provider both sit on top of this
//! module, so it is built first.

pub mod circuit_breaker;
pub mod errors;
pub mod rate_limit;
pub mod resilient_backend;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerRegistry, CircuitState, ProviderKey};
pub use errors::{Error, ErrorKind, Result};
pub use rate_limit::{RateLimitConfig, RateLimiter, RateLimiterRegistry};
pub use resilient_backend::ResilientBackend;
pub use retry::{retry_with_backoff, retry_with_backoff_counted, RetryPolicy};

use std::future::Future;

/// The full set of resilience knobs for one running provider process.
/// Loaded from environment variables; every field falls back to a sane
/// default when unset.
#[derive(Debug, Clone, Copy)]
pub struct ResilienceConfig {
    pub retry: RetryPolicy,
    pub circuit_breaker: CircuitBreakerConfig,
    pub rate_limit: RateLimitConfig,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        ResilienceConfig {
            retry: RetryPolicy::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ResilienceConfig {
    /// Overrides defaults from `VIRTRIGAUD_RETRY_MAX_ATTEMPTS`,
    /// `VIRTRIGAUD_CB_FAILURE_THRESHOLD`, `VIRTRIGAUD_RATE_LIMIT_QPS`, etc.
    /// Malformed values are ignored and fall back to the default, since a
    /// typo here should never prevent the provider from starting.
    pub fn from_env() -> Self {
        let mut config = ResilienceConfig::default();

        if let Some(v) = env_f64("VIRTRIGAUD_RETRY_BASE_DELAY_MS") {
            config.retry.base_delay = std::time::Duration::from_millis(v as u64);
        }
        if let Some(v) = env_u32("VIRTRIGAUD_RETRY_MAX_ATTEMPTS") {
            config.retry.max_attempts = v;
        }
        if let Some(v) = env_u32("VIRTRIGAUD_CB_FAILURE_THRESHOLD") {
            config.circuit_breaker.failure_threshold = v;
        }
        if let Some(v) = env_f64("VIRTRIGAUD_CB_RESET_WINDOW_SECS") {
            config.circuit_breaker.reset_timeout = std::time::Duration::from_secs_f64(v);
        }
        if let Some(v) = env_u32("VIRTRIGAUD_CB_HALF_OPEN_MAX_CALLS") {
            config.circuit_breaker.half_open_max_calls = v;
        }
        if let Some(v) = env_f64("VIRTRIGAUD_RATE_LIMIT_QPS") {
            config.rate_limit.qps = v;
        }
        if let Some(v) = env_f64("VIRTRIGAUD_RATE_LIMIT_BURST") {
            config.rate_limit.burst = v;
        }

        config
    }
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Runs `op` through rate limiting, the circuit breaker, and retry-with-backoff,
/// in that order: a rate-limited or breaker-open call never consumes a retry
/// attempt, and a retried call always re-checks the breaker on each attempt.
pub async fn call_guarded<T, F, Fut>(
    limiter: &RateLimiter,
    breaker: &CircuitBreaker,
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_with_backoff(policy, || async {
        limiter.try_acquire().await?;
        breaker.call(&mut op).await
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn guarded_call_retries_through_rate_limit_and_breaker() {
        let limiter = RateLimiter::new(RateLimitConfig { qps: 1000.0, burst: 1000.0 });
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 5,
            reset_timeout: Duration::from_millis(10),
            half_open_max_calls: 1,
        });
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            multiplier: 2.0,
            jitter_fraction: 0.0,
        };
        let calls = AtomicU32::new(0);
        let result = call_guarded(&limiter, &breaker, &policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 1 {
                    Err(Error::retryable("not yet"))
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn config_from_env_falls_back_to_defaults_on_unset() {
        std::env::remove_var("VIRTRIGAUD_RETRY_MAX_ATTEMPTS");
        let config = ResilienceConfig::from_env();
        assert_eq!(config.retry.max_attempts, RetryPolicy::default().max_attempts);
    }
}
