//! Cross-module resilience bound checks: retry attempts never exceed the
//! configured maximum, and total backoff delay never exceeds the sum of the
//! per-attempt caps plus jitter, even once rate limiting and circuit
//! breaking are layered in via `call_guarded`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use virtrigaud::resilience::{
    call_guarded, retry_with_backoff_counted, CircuitBreaker, CircuitBreakerConfig, Error,
    RateLimitConfig, RateLimiter, RetryPolicy,
};

fn policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(100),
        max_delay: Duration::from_millis(800),
        multiplier: 2.0,
        jitter_fraction: 0.1,
    }
}

/// The sum of `min(base * multiplier^n, max)` for every attempt before the
/// last, the bound a fully-exhausted retry sequence's delay must respect.
fn worst_case_total_delay(p: &RetryPolicy) -> Duration {
    (0..p.max_attempts.saturating_sub(1))
        .map(|n| p.max_delay_for_attempt(n))
        .sum()
}

#[tokio::test(start_paused = true)]
async fn attempts_never_exceed_max_attempts_under_permanent_failure() {
    let p = policy(4);
    let calls = AtomicU32::new(0);
    let (result, attempts) = retry_with_backoff_counted(&p, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err::<(), _>(Error::unavailable("permanently down")) }
    })
    .await;
    assert!(result.is_err());
    assert_eq!(attempts, 4);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(attempts <= p.max_attempts);
}

#[tokio::test(start_paused = true)]
async fn total_delay_never_exceeds_sum_of_capped_per_attempt_delays() {
    let p = policy(5);
    let bound = worst_case_total_delay(&p);

    let start = tokio::time::Instant::now();
    let (result, attempts) = retry_with_backoff_counted(&p, || async {
        Err::<(), _>(Error::unavailable("permanently down"))
    })
    .await;
    let elapsed = start.elapsed();

    assert!(result.is_err());
    assert_eq!(attempts, p.max_attempts);
    assert!(
        elapsed <= bound,
        "total delay {:?} exceeded worst-case bound {:?}",
        elapsed,
        bound
    );
}

#[tokio::test(start_paused = true)]
async fn fewer_attempts_than_max_means_strictly_less_delay() {
    let p = policy(6);
    let bound = worst_case_total_delay(&p);

    let calls = AtomicU32::new(0);
    let start = tokio::time::Instant::now();
    let (result, attempts) = retry_with_backoff_counted(&p, || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n < 2 {
                Err(Error::retryable("not yet"))
            } else {
                Ok(())
            }
        }
    })
    .await;
    let elapsed = start.elapsed();

    assert!(result.is_ok());
    assert_eq!(attempts, 3);
    assert!(elapsed < bound, "succeeding early must cost less than the full retry budget");
}

#[tokio::test(start_paused = true)]
async fn non_retryable_error_halts_before_any_delay_is_spent() {
    let p = policy(5);
    let start = tokio::time::Instant::now();
    let (result, attempts) = retry_with_backoff_counted(&p, || async {
        Err::<(), _>(Error::invalid_spec("malformed template reference"))
    })
    .await;
    assert!(matches!(result, Err(e) if e.kind == virtrigaud::resilience::ErrorKind::InvalidSpec));
    assert_eq!(attempts, 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

/// Rate limiting and circuit breaking are layered in front of retry by
/// `call_guarded`: a call that keeps failing trips the breaker before the
/// retry policy's attempt budget is reached, and the breaker's fast-fail
/// still counts as a (non-retried) attempt against the caller.
#[tokio::test(start_paused = true)]
async fn breaker_trip_short_circuits_further_retry_attempts() {
    let limiter = RateLimiter::new(RateLimitConfig { qps: 1000.0, burst: 1000.0 });
    let breaker = CircuitBreaker::new(CircuitBreakerConfig {
        failure_threshold: 2,
        reset_timeout: Duration::from_secs(60),
        half_open_max_calls: 1,
    });
    let p = policy(10);

    let calls = AtomicU32::new(0);
    let result = call_guarded(&limiter, &breaker, &p, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err::<(), _>(Error::unavailable("hypervisor unreachable")) }
    })
    .await;

    assert!(result.is_err());
    // The breaker opens after 2 consecutive failures; every attempt after
    // that fails fast without reaching the inner op, so far fewer than the
    // policy's 10-attempt budget actually invoke the backend.
    assert!(
        calls.load(Ordering::SeqCst) <= p.max_attempts,
        "call_guarded must never invoke the backend more than max_attempts times"
    );
}

/// A rate-limited call never consumes a retry attempt against the backend:
/// `try_acquire` failing is itself the retryable condition, so the backend
/// closure runs at most once per granted token.
#[tokio::test(start_paused = true)]
async fn rate_limit_rejection_does_not_invoke_the_backend() {
    let limiter = RateLimiter::new(RateLimitConfig { qps: 0.0, burst: 0.0 });
    let breaker = CircuitBreaker::new(CircuitBreakerConfig::default());
    let p = policy(3);

    let calls = AtomicU32::new(0);
    let result = call_guarded(&limiter, &breaker, &p, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, Error>(()) }
    })
    .await;

    assert!(result.is_err(), "a permanently empty bucket must never admit the call");
    assert_eq!(calls.load(Ordering::SeqCst), 0, "backend must not be invoked when every attempt is rate-limited");
}
