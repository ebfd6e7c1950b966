//! Backoff configuration for rate-limited API calls.
//!
//! The delay schedule is a pure function of [`RetryConfig`]: it never looks
//! at the clock. Waiting is delegated to a [`Sleeper`] so the retry loop in
//! [`crate::platform::ApiClient`] can be exercised without real sleeps.

use std::time::Duration;

use async_trait::async_trait;
use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};

/// Initial backoff delay.
pub const INITIAL_BACKOFF_MS: u64 = 1_000;

/// Upper bound for a single computed backoff delay.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Retries after the first attempt before giving up with `RateLimitExceeded`.
pub const MAX_RETRIES: usize = 5;

/// Upper bound for a server-provided `Retry-After` / reset delay.
pub const MAX_RETRY_AFTER_SECS: u64 = 3_600;

/// Configuration for retry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Delay before the first retry.
    pub min_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum number of retry attempts.
    pub max_retries: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
    /// Cap applied to delays requested by the server.
    pub max_retry_after: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: MAX_RETRIES,
            with_jitter: false,
            max_retry_after: Duration::from_secs(MAX_RETRY_AFTER_SECS),
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_retries,
            ..Self::default()
        }
    }

    /// Set whether to use jitter.
    ///
    /// Jittered schedules are no longer guaranteed to be non-decreasing.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Build an exponential backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_factor(2.0)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }

    /// The delays to wait before each retry, in order.
    ///
    /// Yields exactly `max_retries` values: `min_delay × 2^n`, capped at
    /// `max_delay`. The iterator running dry means retries are exhausted.
    pub fn schedule(&self) -> ExponentialBackoff {
        self.clone().into_backoff().build()
    }

    /// Clamp a server-requested delay to `max_retry_after`.
    #[must_use]
    pub fn clamp_retry_after(&self, requested: Duration) -> Duration {
        requested.min(self.max_retry_after)
    }
}

/// Something that can wait for a duration.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested sleeps instead of waiting.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSleeper {
    slept: std::sync::Mutex<Vec<Duration>>,
}

#[cfg(test)]
impl RecordingSleeper {
    pub(crate) fn slept(&self) -> Vec<Duration> {
        self.slept
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(duration);
    }
}
