//! Wraps any [`ProviderBackend`] so every RPC-facing call passes through
//! rate limiting, the circuit breaker, and retry-with-backoff before
//! reaching the real implementation. This is where [`super::call_guarded`]
//! is actually wired into the provider boundary.

use async_trait::async_trait;

use crate::rpc::backend::{
    Capabilities, CloneArgs, CloneOutcome, CreateArgs, CreateOutcome, DescribeOutcome, PowerOp, ProviderBackend,
    SnapshotCreateOutcome, TaskOutcome, TaskStatusOutcome, ValidateOutcome,
};

use super::{call_guarded, CircuitBreaker, RateLimiter, Result, ResilienceConfig, RetryPolicy};

pub struct ResilientBackend<B> {
    backend: B,
    limiter: RateLimiter,
    breaker: CircuitBreaker,
    policy: RetryPolicy,
}

impl<B: ProviderBackend> ResilientBackend<B> {
    pub fn new(backend: B, config: ResilienceConfig) -> Self {
        ResilientBackend {
            backend,
            limiter: RateLimiter::new(config.rate_limit),
            breaker: CircuitBreaker::new(config.circuit_breaker),
            policy: config.retry,
        }
    }

    async fn guarded<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        call_guarded(&self.limiter, &self.breaker, &self.policy, op).await
    }
}

#[async_trait]
impl<B: ProviderBackend> ProviderBackend for ResilientBackend<B> {
    async fn validate(&self) -> Result<ValidateOutcome> {
        self.guarded(|| self.backend.validate()).await
    }

    async fn get_capabilities(&self) -> Result<Capabilities> {
        // Static declaration; no need to burn a rate-limit token or trip the
        // breaker on a call that never reaches the hypervisor.
        self.backend.get_capabilities().await
    }

    async fn create(&self, args: CreateArgs) -> Result<CreateOutcome> {
        self.guarded(|| self.backend.create(args.clone())).await
    }

    async fn delete(&self, id: &str) -> Result<TaskOutcome> {
        self.guarded(|| self.backend.delete(id)).await
    }

    async fn power(&self, id: &str, op: PowerOp, graceful_timeout_seconds: u32) -> Result<TaskOutcome> {
        self.guarded(|| self.backend.power(id, op, graceful_timeout_seconds)).await
    }

    async fn reconfigure(&self, id: &str, desired_class_json: &str, disk_changes_json: &str) -> Result<TaskOutcome> {
        self.guarded(|| self.backend.reconfigure(id, desired_class_json, disk_changes_json)).await
    }

    async fn describe(&self, id: &str) -> Result<DescribeOutcome> {
        self.guarded(|| self.backend.describe(id)).await
    }

    async fn task_status(&self, task_ref: &str) -> Result<TaskStatusOutcome> {
        self.guarded(|| self.backend.task_status(task_ref)).await
    }

    async fn snapshot_create(
        &self,
        id: &str,
        name_hint: &str,
        description: &str,
        include_memory: bool,
    ) -> Result<SnapshotCreateOutcome> {
        self.guarded(|| self.backend.snapshot_create(id, name_hint, description, include_memory)).await
    }

    async fn snapshot_delete(&self, snapshot_id: &str) -> Result<TaskOutcome> {
        self.guarded(|| self.backend.snapshot_delete(snapshot_id)).await
    }

    async fn snapshot_revert(&self, id: &str, snapshot_id: &str) -> Result<TaskOutcome> {
        self.guarded(|| self.backend.snapshot_revert(id, snapshot_id)).await
    }

    async fn clone(&self, args: CloneArgs) -> Result<CloneOutcome> {
        self.guarded(|| self.backend.clone(args.clone())).await
    }

    async fn image_prepare(&self, image_json: &str) -> Result<TaskOutcome> {
        self.guarded(|| self.backend.image_prepare(image_json)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::{CircuitBreakerConfig, RateLimitConfig};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct FlakyBackend {
        failures_before_success: AtomicU32,
    }

    #[async_trait]
    impl ProviderBackend for FlakyBackend {
        async fn validate(&self) -> Result<ValidateOutcome> {
            if self.failures_before_success.fetch_sub(1, Ordering::SeqCst) > 0 {
                Err(super::super::Error::retryable("transient"))
            } else {
                Ok(ValidateOutcome { ok: true, message: String::new() })
            }
        }
        async fn get_capabilities(&self) -> Result<Capabilities> {
            unimplemented!()
        }
        async fn create(&self, _args: CreateArgs) -> Result<CreateOutcome> {
            unimplemented!()
        }
        async fn delete(&self, _id: &str) -> Result<TaskOutcome> {
            unimplemented!()
        }
        async fn power(&self, _id: &str, _op: PowerOp, _t: u32) -> Result<TaskOutcome> {
            unimplemented!()
        }
        async fn reconfigure(&self, _id: &str, _c: &str, _d: &str) -> Result<TaskOutcome> {
            unimplemented!()
        }
        async fn describe(&self, _id: &str) -> Result<DescribeOutcome> {
            unimplemented!()
        }
        async fn task_status(&self, _task_ref: &str) -> Result<TaskStatusOutcome> {
            unimplemented!()
        }
        async fn snapshot_create(&self, _id: &str, _n: &str, _d: &str, _m: bool) -> Result<SnapshotCreateOutcome> {
            unimplemented!()
        }
        async fn snapshot_delete(&self, _snapshot_id: &str) -> Result<TaskOutcome> {
            unimplemented!()
        }
        async fn snapshot_revert(&self, _id: &str, _snapshot_id: &str) -> Result<TaskOutcome> {
            unimplemented!()
        }
        async fn clone(&self, _args: CloneArgs) -> Result<CloneOutcome> {
            unimplemented!()
        }
        async fn image_prepare(&self, _image_json: &str) -> Result<TaskOutcome> {
            unimplemented!()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_failures_then_succeeds() {
        let resilient = ResilientBackend::new(
            FlakyBackend { failures_before_success: AtomicU32::new(2) },
            ResilienceConfig {
                retry: RetryPolicy {
                    max_attempts: 5,
                    base_delay: Duration::from_millis(1),
                    max_delay: Duration::from_millis(10),
                    multiplier: 2.0,
                    jitter_fraction: 0.0,
                },
                circuit_breaker: CircuitBreakerConfig::default(),
                rate_limit: RateLimitConfig { qps: 1000.0, burst: 1000.0 },
            },
        );
        let outcome = resilient.validate().await.unwrap();
        assert!(outcome.ok);
    }
}
