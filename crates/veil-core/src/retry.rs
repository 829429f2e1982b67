//! Exponential backoff retry
//!
//! ```text
//! attempt 0 ──fail──> sleep d0 ──> attempt 1 ──fail──> sleep d0*f ──> attempt 2 ...
//! ```
//!
//! A task runs at most `1 + max_retries` times. Errors the predicate rejects are
//! returned immediately.

use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Backoff policy for [`with_retry`]
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after every retry
    pub backoff_factor: f64,
    /// Upper bound for a single delay
    pub max_delay: Option<Duration>,
    /// Stretch each delay by a random factor in `[1, 2)`
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(500),
            backoff_factor: 2.0,
            max_delay: Some(Duration::from_secs(30)),
            jitter: false,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay: Duration, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            initial_delay,
            backoff_factor,
            max_delay: None,
            jitter: false,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    /// Never retry
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO, 1.0)
    }

    /// Delay before retry number `retry` (zero-based), ignoring jitter
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.backoff_factor.powi(retry.min(i32::MAX as u32) as i32);
        self.scale(self.initial_delay, factor)
    }

    /// `delay * factor`, saturating at `max_delay` (or `Duration::MAX`) for huge
    /// or NaN products
    fn scale(&self, delay: Duration, factor: f64) -> Duration {
        let limit = self.max_delay.unwrap_or(Duration::MAX);
        let secs = delay.as_secs_f64() * factor;
        if secs.is_nan() || secs >= limit.as_secs_f64() {
            return limit;
        }
        Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(limit)
    }

    fn apply_jitter(&self, delay: Duration) -> Duration {
        if !self.jitter {
            return delay;
        }
        let stretch: f64 = rand::thread_rng().gen_range(1.0..2.0);
        self.scale(delay, stretch)
    }
}

/// Run `task`, retrying retriable failures with exponential backoff.
///
/// Returns the first success, or the last error once the error is not retriable
/// or `max_retries` retries have been spent.
pub async fn with_retry<T, E, F, Fut, P>(
    mut task: F,
    config: &RetryConfig,
    is_retriable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: Display,
{
    let mut retries = 0u32;

    loop {
        match task().await {
            Ok(value) => {
                if retries > 0 {
                    debug!(retries = retries, "Task succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if retries >= config.max_retries || !is_retriable(&err) {
                    return Err(err);
                }

                let delay = config.apply_jitter(config.delay_for(retries));
                warn!(
                    retry = retries + 1,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Task failed, retrying"
                );
                tokio::time::sleep(delay).await;
                retries += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::time::Instant;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Fatal,
    }

    impl Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_twice_with_backoff_delays() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let config = RetryConfig::new(3, Duration::from_millis(100), 2.0);

        let task_calls = calls.clone();
        let result = with_retry(
            move || {
                let calls = task_calls.clone();
                async move {
                    let mut calls = calls.lock();
                    calls.push(Instant::now());
                    if calls.len() < 3 {
                        Err(TestError::Transient)
                    } else {
                        Ok("done")
                    }
                }
            },
            &config,
            |e| *e == TestError::Transient,
        )
        .await;

        assert_eq!(result, Ok("done"));
        let calls = calls.lock();
        assert_eq!(calls.len(), 3);

        let first_gap = calls[1] - calls[0];
        let second_gap = calls[2] - calls[1];
        assert!(first_gap >= Duration::from_millis(100) && first_gap < Duration::from_millis(105));
        assert!(second_gap >= Duration::from_millis(200) && second_gap < Duration::from_millis(205));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retriable_error_returns_immediately() {
        let mut attempts = 0;
        let result: Result<(), TestError> = with_retry(
            || {
                attempts += 1;
                async { Err(TestError::Fatal) }
            },
            &RetryConfig::default(),
            |e| *e == TestError::Transient,
        )
        .await;

        assert_eq!(result, Err(TestError::Fatal));
        assert_eq!(attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_return_last_error() {
        let mut attempts = 0;
        let result: Result<(), TestError> = with_retry(
            || {
                attempts += 1;
                async { Err(TestError::Transient) }
            },
            &RetryConfig::new(2, Duration::from_millis(10), 1.5),
            |_| true,
        )
        .await;

        assert_eq!(result, Err(TestError::Transient));
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_delay_schedule_is_capped() {
        let config = RetryConfig::new(10, Duration::from_secs(1), 3.0)
            .with_max_delay(Duration::from_secs(5));
        assert_eq!(config.delay_for(0), Duration::from_secs(1));
        assert_eq!(config.delay_for(1), Duration::from_secs(3));
        assert_eq!(config.delay_for(2), Duration::from_secs(5));
    }

    #[test]
    fn test_large_retry_index_saturates_at_cap() {
        let config = RetryConfig::new(30, Duration::from_secs(1), 10.0)
            .with_max_delay(Duration::from_secs(5));
        assert_eq!(config.delay_for(20), Duration::from_secs(5));
        assert_eq!(config.delay_for(u32::MAX), Duration::from_secs(5));

        let uncapped = RetryConfig::new(30, Duration::from_secs(1), 10.0);
        assert_eq!(uncapped.delay_for(400), Duration::MAX);
    }

    #[test]
    fn test_nan_backoff_does_not_panic() {
        let config = RetryConfig::new(3, Duration::from_millis(100), f64::NAN)
            .with_max_delay(Duration::from_secs(2));
        assert_eq!(config.delay_for(1), Duration::from_secs(2));
        let jittered = config.with_jitter().apply_jitter(Duration::from_secs(1));
        assert!(jittered >= Duration::from_secs(1) && jittered <= Duration::from_secs(2));
    }
}
