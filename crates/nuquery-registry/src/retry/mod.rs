//! Retry executor with exponential backoff
//!
//! Failures are classified before deciding anything: permanent ones (not
//! found, validation, unknown) propagate immediately, recoverable ones are
//! retried after a delay. Rate limits that declare `retry-after` wait exactly
//! that long; everything else backs off exponentially.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use nuquery_core::error::ClassifiedError;

use crate::RegistryResult;

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first try
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for computed backoff delays
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    /// One attempt, no retries. Used for best-effort enrichment calls.
    pub fn single_attempt() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Delay before retry number `retry_index` (0 for the first retry)
    pub fn delay_for(&self, retry_index: u32, error: &ClassifiedError) -> Duration {
        if let Some(declared) = error.retry_after() {
            return declared;
        }

        let factor = self.multiplier.powi(retry_index.min(i32::MAX as u32) as i32);
        let millis = self.base_delay.as_millis() as f64 * factor;
        if !millis.is_finite() || millis >= self.max_delay.as_millis() as f64 {
            self.max_delay
        } else {
            Duration::from_millis(millis as u64)
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or runs out of attempts.
///
/// Any error convertible into a `ClassifiedError` is accepted, so plain string
/// failures are treated as unknown (non-retryable) errors.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> RegistryResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<ClassifiedError>,
{
    let mut attempt: u32 = 0;

    loop {
        let error: ClassifiedError = match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => error.into(),
        };

        if !error.is_retryable() {
            debug!("Not retrying permanent failure: {}", error);
            return Err(error);
        }

        if attempt >= policy.max_retries {
            if policy.max_retries > 0 {
                warn!("Giving up after {} attempts: {}", attempt + 1, error);
            }
            return Err(error);
        }

        let delay = policy.delay_for(attempt, &error);
        warn!(
            "Attempt {} of {} failed ({}); retrying in {:?}",
            attempt + 1,
            policy.max_retries + 1,
            error,
            delay
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests;
