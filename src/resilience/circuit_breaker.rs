//! Per-(provider type, provider name) circuit breaker.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::errors::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub reset_timeout: Duration,
    pub half_open_max_calls: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        CircuitBreakerConfig {
            failure_threshold: 10,
            reset_timeout: Duration::from_secs(60),
            half_open_max_calls: 3,
        }
    }
}

struct Inner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    half_open_in_flight: u32,
}

pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

/// Returned by [`CircuitBreaker::admit`]; records the outcome on drop via an
/// explicit call so outcomes are never silently dropped.
pub enum Admission<'a> {
    Admitted { breaker: &'a CircuitBreaker, half_open: bool },
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        CircuitBreaker {
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                half_open_in_flight: 0,
            }),
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    /// Checks out the right to attempt a call, short-circuiting if the
    /// breaker is open and the reset window has not elapsed.
    pub async fn admit(&self) -> Result<Admission<'_>, Error> {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => Ok(Admission::Admitted {
                breaker: self,
                half_open: false,
            }),
            CircuitState::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or(Duration::MAX);
                if elapsed >= self.config.reset_timeout {
                    inner.state = CircuitState::HalfOpen;
                    inner.half_open_in_flight = 1;
                    Ok(Admission::Admitted {
                        breaker: self,
                        half_open: true,
                    })
                } else {
                    Err(Error::unavailable("circuit breaker open"))
                }
            }
            CircuitState::HalfOpen => {
                if inner.half_open_in_flight < self.config.half_open_max_calls {
                    inner.half_open_in_flight += 1;
                    Ok(Admission::Admitted {
                        breaker: self,
                        half_open: true,
                    })
                } else {
                    Err(Error::unavailable("circuit breaker half-open probe limit reached"))
                }
            }
        }
    }

    async fn record_success(&self, half_open: bool) {
        let mut inner = self.inner.lock().await;
        if half_open {
            inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
        }
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    async fn record_failure(&self, half_open: bool) {
        let mut inner = self.inner.lock().await;
        if half_open {
            inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            return;
        }
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= self.config.failure_threshold {
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
        }
    }

    /// Runs `op` under the breaker, recording success/failure and
    /// translating an open circuit into an `Unavailable` error without
    /// invoking `op` at all.
    pub async fn call<T, F, Fut>(&self, op: F) -> Result<T, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let half_open = match self.admit().await? {
            Admission::Admitted { half_open, .. } => half_open,
        };
        match op().await {
            Ok(value) => {
                self.record_success(half_open).await;
                Ok(value)
            }
            Err(err) => {
                self.record_failure(half_open).await;
                Err(err)
            }
        }
    }
}

/// Keys a breaker by (provider type, provider name) so each pluggable
/// hypervisor backend trips independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderKey {
    pub provider_type: String,
    pub provider_name: String,
}

impl ProviderKey {
    pub fn new(provider_type: impl Into<String>, provider_name: impl Into<String>) -> Self {
        ProviderKey {
            provider_type: provider_type.into(),
            provider_name: provider_name.into(),
        }
    }
}

pub struct CircuitBreakerRegistry {
    config: CircuitBreakerConfig,
    breakers: Mutex<HashMap<ProviderKey, Arc<CircuitBreaker>>>,
}

impl CircuitBreakerRegistry {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        CircuitBreakerRegistry {
            config,
            breakers: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_or_create(&self, key: ProviderKey) -> Arc<CircuitBreaker> {
        let mut breakers = self.breakers.lock().await;
        breakers
            .entry(key)
            .or_insert_with(|| Arc::new(CircuitBreaker::new(self.config)))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: 2,
            reset_timeout: Duration::from_millis(20),
            half_open_max_calls: 1,
        }
    }

    #[tokio::test]
    async fn opens_after_threshold_and_fails_fast() {
        let cb = CircuitBreaker::new(config());
        for _ in 0..2 {
            let _ = cb.call(|| async { Err::<(), _>(Error::unavailable("x")) }).await;
        }
        assert_eq!(cb.state().await, CircuitState::Open);
        let result = cb.call(|| async { Ok::<_, Error>(1) }).await;
        assert!(result.is_err(), "open breaker must fail fast without calling op");
    }

    #[tokio::test]
    async fn half_open_success_closes_breaker() {
        let cb = CircuitBreaker::new(config());
        for _ in 0..2 {
            let _ = cb.call(|| async { Err::<(), _>(Error::unavailable("x")) }).await;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
        let result = cb.call(|| async { Ok::<_, Error>(()) }).await;
        assert!(result.is_ok());
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn half_open_failure_reopens_breaker() {
        let cb = CircuitBreaker::new(config());
        for _ in 0..2 {
            let _ = cb.call(|| async { Err::<(), _>(Error::unavailable("x")) }).await;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
        let _ = cb.call(|| async { Err::<(), _>(Error::unavailable("still down")) }).await;
        assert_eq!(cb.state().await, CircuitState::Open);
    }

    #[tokio::test]
    async fn registry_is_keyed_per_provider() {
        let registry = CircuitBreakerRegistry::new(config());
        let a = registry
            .get_or_create(ProviderKey::new("vsphere", "prod"))
            .await;
        let b = registry
            .get_or_create(ProviderKey::new("vsphere", "staging"))
            .await;
        assert!(!Arc::ptr_eq(&a, &b));
        let a2 = registry
            .get_or_create(ProviderKey::new("vsphere", "prod"))
            .await;
        assert!(Arc::ptr_eq(&a, &a2));
    }
}
