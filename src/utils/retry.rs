//! Bounded retry with exponential backoff for transient store contention.
//!
//! The only transient failure class in this pipeline is the dedup store's
//! upsert hitting a busy or locked database. Workers wrap each `observe`
//! call in [`with_retry_if`] with [`crate::error::Error::is_contention`] as
//! the predicate; everything else fails through immediately and is handled
//! at the unit boundary.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try.
    pub max_retries: u32,

    /// Base delay in milliseconds for exponential backoff.
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds (caps exponential growth).
    pub max_delay_ms: u64,

    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        // Store contention clears in milliseconds, not seconds.
        Self {
            max_retries: 5,
            base_delay_ms: 50,
            max_delay_ms: 2_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms = if attempt == 0 {
            0
        } else {
            let exponential =
                self.base_delay_ms as f64 * self.backoff_multiplier.powi((attempt - 1) as i32);
            (exponential as u64).min(self.max_delay_ms)
        };
        Duration::from_millis(delay_ms)
    }
}

/// Execute an operation, retrying with exponential backoff while the error
/// satisfies `should_retry`. Non-retryable errors and exhausted retries
/// return the last error.
pub async fn with_retry_if<T, F, Fut, P>(
    config: &RetryConfig,
    operation: F,
    should_retry: P,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&Error) -> bool,
{
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = config.calculate_delay(attempt);
            debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "retrying after delay"
            );
            tokio::time::sleep(delay).await;
        }

        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(attempt, "operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) => {
                if !should_retry(&e) {
                    return Err(e);
                }
                warn!(
                    attempt,
                    max_retries = config.max_retries,
                    error = %e,
                    "transient failure, will retry"
                );
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::other("retry loop without attempts")))
}
