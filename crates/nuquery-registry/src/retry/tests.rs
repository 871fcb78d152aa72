//! Unit tests for the retry executor

use super::*;
use nuquery_core::error::ErrorKind;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::time::Instant;

fn server_error() -> ClassifiedError {
    ClassifiedError::new(ErrorKind::ServerUnavailable { status: 503 }, "registry down")
}

#[test]
fn test_retry_policy_default() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_retries, 3);
    assert_eq!(policy.base_delay, Duration::from_millis(1000));
    assert_eq!(policy.max_delay, Duration::from_secs(30));
    assert_eq!(policy.multiplier, 2.0);
    assert_eq!(RetryPolicy::single_attempt().max_retries, 0);
}

#[test]
fn test_exponential_delays() {
    let policy = RetryPolicy::new(5, Duration::from_millis(10));
    let err = server_error();

    assert_eq!(policy.delay_for(0, &err), Duration::from_millis(10));
    assert_eq!(policy.delay_for(1, &err), Duration::from_millis(20));
    assert_eq!(policy.delay_for(2, &err), Duration::from_millis(40));
}

#[test]
fn test_delay_is_capped() {
    let policy = RetryPolicy::new(40, Duration::from_secs(1)).with_max_delay(Duration::from_secs(5));
    assert_eq!(policy.delay_for(10, &server_error()), Duration::from_secs(5));
    assert_eq!(policy.delay_for(u32::MAX, &server_error()), Duration::from_secs(5));
}

#[test]
fn test_declared_retry_after_wins() {
    let policy = RetryPolicy::new(3, Duration::from_millis(10));
    let limited = ClassifiedError::new(
        ErrorKind::RateLimited {
            retry_after_secs: Some(2),
        },
        "slow down",
    );
    assert_eq!(policy.delay_for(0, &limited), Duration::from_secs(2));

    let undeclared = ClassifiedError::new(
        ErrorKind::RateLimited {
            retry_after_secs: None,
        },
        "slow down",
    );
    assert_eq!(policy.delay_for(1, &undeclared), Duration::from_millis(20));
}

#[tokio::test(start_paused = true)]
async fn test_succeeds_after_two_retryable_failures() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let policy = RetryPolicy::new(3, Duration::from_millis(10));

    let result = with_retry(&policy, || async move {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        if n < 2 {
            Err(server_error())
        } else {
            Ok("ok")
        }
    })
    .await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_waits_between_attempts() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let policy = RetryPolicy::new(3, Duration::from_millis(10));
    let start = Instant::now();

    let _ = with_retry(&policy, || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Err::<(), _>(server_error())
    })
    .await;

    // 10 + 20 + 40
    assert!(start.elapsed() >= Duration::from_millis(70));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_no_retry_on_not_found() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let policy = RetryPolicy::new(3, Duration::from_millis(10));

    let result: RegistryResult<()> = with_retry(&policy, || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(ClassifiedError::not_found("no such package"))
    })
    .await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_returns_last_error() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let policy = RetryPolicy::new(2, Duration::from_millis(10));

    let result: RegistryResult<()> = with_retry(&policy, || async move {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        Err(ClassifiedError::new(ErrorKind::Timeout, format!("attempt {}", n)))
    })
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(err.message(), "attempt 2");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_waits_declared_delay() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let policy = RetryPolicy::new(1, Duration::from_millis(10));
    let start = Instant::now();

    let result = with_retry(&policy, || async move {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(ClassifiedError::new(
                ErrorKind::RateLimited {
                    retry_after_secs: Some(3),
                },
                "429",
            ))
        } else {
            Ok(42)
        }
    })
    .await;

    assert_eq!(result.unwrap(), 42);
    assert!(start.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_plain_string_errors_are_wrapped() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let policy = RetryPolicy::new(3, Duration::from_millis(10));

    let result: RegistryResult<()> = with_retry(&policy, || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Err("raw failure")
    })
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unknown { status: None });
    assert_eq!(err.message(), "raw failure");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_policy() {
    let calls = AtomicU32::new(0);
    let counter = &calls;

    let result: RegistryResult<()> = with_retry(&RetryPolicy::single_attempt(), || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(ClassifiedError::new(ErrorKind::Network, "unreachable"))
    })
    .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
