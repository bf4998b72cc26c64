//! Retry with exponential backoff for transient failures

use crate::error::{BotError, BotResult, UnifiedError};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// How often and how patiently to retry a failing call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubled on every further attempt
    pub base_delay: Duration,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based), with up to 50% jitter.
    /// A server-provided wait hint takes precedence.
    pub fn delay_for(&self, attempt: u32, error: &BotError) -> Duration {
        if let Some(secs) = error.retry_after() {
            return Duration::from_secs(secs).min(self.max_delay);
        }
        let base = self
            .base_delay
            .saturating_mul(2_u32.saturating_pow(attempt))
            .min(self.max_delay);
        let jitter_ms = {
            let mut rng = rand::thread_rng();
            rng.gen_range(0..=(base.as_millis() as u64 / 2))
        };
        (base + Duration::from_millis(jitter_ms)).min(self.max_delay)
    }

    /// Run `operation`, retrying errors classified as retryable.
    ///
    /// Non-retryable errors return immediately; once retries are exhausted
    /// the last error is returned.
    pub async fn run<T, F, Fut>(&self, operation_name: &str, mut operation: F) -> BotResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = BotResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(operation = operation_name, attempt, "request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) if error.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt, &error);
                    warn!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        max_attempts = self.max_retries + 1,
                        delay_secs = delay.as_secs_f64(),
                        error = %error,
                        "retrying after failure"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    if error.is_retryable() {
                        tracing::error!(operation = operation_name, attempts = attempt + 1, "all retry attempts exhausted");
                    }
                    return Err(error);
                }
            }
        }
    }
}
