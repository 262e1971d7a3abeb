//! Token-bucket rate limiting per provider instance.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::circuit_breaker::ProviderKey;
use super::errors::Error;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Sustained requests per second.
    pub qps: f64,
    /// Maximum burst above the sustained rate.
    pub burst: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig { qps: 10.0, burst: 20.0 }
    }
}

struct Inner {
    tokens: f64,
    last_refill: Instant,
}

pub struct RateLimiter {
    config: RateLimitConfig,
    inner: Mutex<Inner>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        RateLimiter {
            config,
            inner: Mutex::new(Inner {
                tokens: config.burst,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Attempts to take one token. Returns `ErrorKind::RateLimit` when the
    /// bucket is empty rather than blocking the caller.
    pub async fn try_acquire(&self) -> Result<(), Error> {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();
        let elapsed = now.duration_since(inner.last_refill).as_secs_f64();
        inner.tokens = (inner.tokens + elapsed * self.config.qps).min(self.config.burst);
        inner.last_refill = now;

        if inner.tokens >= 1.0 {
            inner.tokens -= 1.0;
            Ok(())
        } else {
            Err(Error::rate_limit("rate limit exceeded"))
        }
    }
}

pub struct RateLimiterRegistry {
    config: RateLimitConfig,
    limiters: Mutex<HashMap<ProviderKey, Arc<RateLimiter>>>,
}

impl RateLimiterRegistry {
    pub fn new(config: RateLimitConfig) -> Self {
        RateLimiterRegistry {
            config,
            limiters: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_or_create(&self, key: ProviderKey) -> Arc<RateLimiter> {
        let mut limiters = self.limiters.lock().await;
        limiters
            .entry(key)
            .or_insert_with(|| Arc::new(RateLimiter::new(self.config)))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burst_is_exhausted_then_refused() {
        let limiter = RateLimiter::new(RateLimitConfig { qps: 1.0, burst: 3.0 });
        for _ in 0..3 {
            limiter.try_acquire().await.expect("within burst");
        }
        assert!(limiter.try_acquire().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn tokens_refill_over_time() {
        let limiter = RateLimiter::new(RateLimitConfig { qps: 10.0, burst: 1.0 });
        limiter.try_acquire().await.expect("first token available");
        assert!(limiter.try_acquire().await.is_err());
        tokio::time::advance(Duration::from_millis(200)).await;
        limiter.try_acquire().await.expect("refilled after 200ms at 10qps");
    }

    #[tokio::test]
    async fn registry_is_keyed_per_provider() {
        let registry = RateLimiterRegistry::new(RateLimitConfig::default());
        let a = registry.get_or_create(ProviderKey::new("vsphere", "prod")).await;
        let b = registry.get_or_create(ProviderKey::new("vsphere", "prod")).await;
        assert!(Arc::ptr_eq(&a, &b));
    }
}
