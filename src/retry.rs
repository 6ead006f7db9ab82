//! Retry configuration, delay calculation, and the shared retry helper.
//!
//! Provides [`RetryConfig`] for controlling retry behaviour and the
//! `with_retry()` helper that executes one logical request with bounded
//! exponential-backoff-with-jitter retries. All orchestrator paths
//! (single requests and variation fan-out) go through the same helper,
//! keeping retry logic in a single place.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::error::{GenError, Result};
use crate::telemetry;
use crate::usage::UsageTracker;

/// Configuration for retry behaviour on transient errors.
///
/// Uses exponential backoff with jitter. `max_retries` counts retries
/// *after* the initial attempt, so a call makes at most `max_retries + 1`
/// network attempts.
///
/// ```rust
/// # use mockmill::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_retries(3)
///     .initial_delay(Duration::from_millis(200))
///     .jitter(false);
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the initial attempt. 0 = fail on first error. Default: 2.
    pub max_retries: u32,
    /// Base delay before the first retry. Default: 1s.
    pub initial_delay: Duration,
    /// Maximum delay between retries (caps exponential growth). Default: 30s.
    pub max_delay: Duration,
    /// Whether to add random 0–1000ms jitter to delays. Default: true.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Set the number of retries after the initial attempt.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the base delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Enable or disable jitter.
    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter = enabled;
        self
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    ///
    /// `initial_delay * 2^attempt` plus 0–1000ms of jitter when enabled,
    /// capped at `max_delay`. Jitter avoids synchronized retry storms
    /// across concurrent callers.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let mut delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        if self.jitter {
            delay += Duration::from_millis(rand::rng().random_range(0..1000));
        }
        delay.min(self.max_delay)
    }

    /// Calculate the effective delay, respecting provider `retry-after` hints.
    ///
    /// A `retry-after` duration from a `RateLimited` error takes precedence
    /// over the calculated backoff, still capped at `max_delay`.
    pub fn effective_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(hint) => hint.min(self.max_delay),
            None => self.delay_for_attempt(attempt),
        }
    }
}

/// Execute an async operation with bounded retries.
///
/// Every attempt — success or failure — increments the tracker's request
/// count. Transient errors (as classified by [`GenError::is_transient()`])
/// are retried up to `config.max_retries` times with non-blocking backoff
/// sleeps; terminal errors are returned immediately.
pub(crate) async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    usage: &UsageTracker,
    operation: &str,
    f: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_err = None;
    for attempt in 0..=config.max_retries {
        usage.record_attempt();
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() => {
                if attempt < config.max_retries {
                    metrics::counter!(telemetry::RETRIES_TOTAL, "operation" => operation.to_owned())
                        .increment(1);
                    let delay = config.effective_delay(attempt, e.retry_after());
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        max_retries = config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                }
                last_err = Some(e);
            }
            Err(e) => return Err(e), // terminal error, no retry
        }
    }
    Err(last_err.unwrap_or(GenError::Unknown {
        message: "retry budget exhausted without an attempt".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let config = RetryConfig::new()
            .initial_delay(Duration::from_millis(100))
            .jitter(false);
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
    }

    #[test]
    fn backoff_capped_at_max_delay() {
        let config = RetryConfig::new()
            .initial_delay(Duration::from_secs(10))
            .jitter(false);
        assert_eq!(config.delay_for_attempt(5), Duration::from_secs(30));
    }

    #[test]
    fn jitter_stays_under_one_second() {
        let config = RetryConfig::new().initial_delay(Duration::from_millis(100));
        for _ in 0..32 {
            let delay = config.delay_for_attempt(0);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay < Duration::from_millis(1100));
        }
    }

    #[test]
    fn retry_after_hint_wins() {
        let config = RetryConfig::new()
            .initial_delay(Duration::from_millis(100))
            .jitter(false);
        let delay = config.effective_delay(3, Some(Duration::from_secs(5)));
        assert_eq!(delay, Duration::from_secs(5));
    }

    #[test]
    fn retry_after_hint_still_capped() {
        let config = RetryConfig::new().jitter(false);
        let delay = config.effective_delay(0, Some(Duration::from_secs(120)));
        assert_eq!(delay, Duration::from_secs(30));
    }
}
