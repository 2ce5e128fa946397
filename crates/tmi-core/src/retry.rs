//! Retry logic for gateway requests.
//!
//! The gateway's web server occasionally drops a request or serves a
//! half-written body while it refreshes its radio state. These failures clear
//! up within a few hundred milliseconds, so fetches are retried a bounded
//! number of times before the error is surfaced.
//!
//! # Example
//!
//! ```
//! use tmi_core::{Error, RetryConfig, TokioClock, with_retry};
//!
//! # async fn example() -> Result<(), Error> {
//! // Three attempts in total, 100ms apart
//! let config = RetryConfig::for_gateway();
//!
//! let value = with_retry(&config, &TokioClock, "fetch_stats", || async {
//!     Ok::<_, Error>(42)
//! }).await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::{Error, Result};

/// How often, and how far apart, a failing fetch is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 means no retries).
    pub max_retries: u32,
    /// Pause before each retry.
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::for_gateway()
    }
}

impl RetryConfig {
    /// No retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Retry configuration for gateway telemetry fetches.
    ///
    /// Three attempts in total with a fixed 100ms pause. The gateway only
    /// refreshes every ~10s, so anything longer would start eating into the
    /// next poll window.
    pub fn for_gateway() -> Self {
        Self::fixed(3, Duration::from_millis(100))
    }

    /// Build a configuration from a total attempt count.
    ///
    /// An attempt count of zero is treated as one.
    pub fn fixed(attempts: u32, delay: Duration) -> Self {
        Self {
            max_retries: attempts.saturating_sub(1),
            delay,
        }
    }

    /// Total number of attempts, including the first one.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Execute an async operation with retry logic.
///
/// Intermediate failures are logged and swallowed. When every attempt fails,
/// the error from the last attempt is returned.
pub async fn with_retry<C, F, Fut, T>(
    config: &RetryConfig,
    clock: &C,
    operation_name: &str,
    operation: F,
) -> Result<T>
where
    C: Clock + ?Sized,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("{} succeeded after {} retries", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(e) => {
                if !is_retryable(&e) || attempt >= config.max_retries {
                    return Err(e);
                }

                let delay = config.delay;
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:?}",
                    operation_name,
                    attempt + 1,
                    config.attempts(),
                    e,
                    delay
                );
                clock.sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Check if an error is retryable.
pub fn is_retryable(error: &Error) -> bool {
    match error {
        Error::Http { .. } => true,
        Error::Status { .. } => true,
        // A half-refreshed payload usually decodes on the next try
        Error::Parse(_) => true,
        Error::Io(_) => true,
        Error::InvalidConfig(_) => false,
        Error::SpeedTestNotInstalled { .. } => false,
        Error::SpeedTestFailed { .. } => false,
        Error::SpeedTestOutput { .. } => false,
        Error::Cancelled => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TokioClock;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tmi_types::ParseError;

    fn status(code: u16) -> Error {
        Error::Status {
            url: "http://gateway".to_string(),
            status: code,
        }
    }

    #[test]
    fn test_gateway_config() {
        let config = RetryConfig::for_gateway();
        assert_eq!(config.attempts(), 3);
        assert_eq!(config.delay, Duration::from_millis(100));
        assert_eq!(RetryConfig::default(), config);
    }

    #[test]
    fn test_fixed_config() {
        let config = RetryConfig::fixed(5, Duration::from_millis(250));
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.delay, Duration::from_millis(250));
        assert_eq!(RetryConfig::fixed(0, Duration::ZERO).attempts(), 1);
        assert_eq!(RetryConfig::none().attempts(), 1);
    }

    #[test]
    fn test_is_retryable() {
        assert!(is_retryable(&status(502)));
        assert!(is_retryable(&Error::Parse(ParseError::InvalidData(
            "truncated".to_string()
        ))));
        assert!(!is_retryable(&Error::Cancelled));
        assert!(!is_retryable(&Error::InvalidConfig("host".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_eventual_success() {
        let attempts = Arc::new(AtomicU32::new(0));
        let start = tokio::time::Instant::now();

        let result: Result<i32> =
            with_retry(&RetryConfig::for_gateway(), &TokioClock, "test", || {
                let attempts = Arc::clone(&attempts);
                async move {
                    let count = attempts.fetch_add(1, Ordering::SeqCst);
                    if count < 2 { Err(status(500)) } else { Ok(42) }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_surfaces_last_error() {
        let attempts = Arc::new(AtomicU32::new(0));

        let result: Result<i32> =
            with_retry(&RetryConfig::for_gateway(), &TokioClock, "test", || {
                let attempts = Arc::clone(&attempts);
                async move {
                    let count = attempts.fetch_add(1, Ordering::SeqCst);
                    Err(status(500 + count as u16))
                }
            })
            .await;

        assert!(matches!(result, Err(Error::Status { status: 502, .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_pauses_are_fixed() {
        let attempts = Arc::new(AtomicU32::new(0));
        let start = tokio::time::Instant::now();
        let config = RetryConfig::fixed(4, Duration::from_millis(250));

        let result: Result<i32> = with_retry(&config, &TokioClock, "test", || {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(status(503))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        // Three retries, each 250ms after the previous failure
        assert_eq!(start.elapsed(), Duration::from_millis(750));
    }

    #[tokio::test]
    async fn test_with_retry_non_retryable_error() {
        let attempts = Arc::new(AtomicU32::new(0));

        let result: Result<i32> =
            with_retry(&RetryConfig::for_gateway(), &TokioClock, "test", || {
                let attempts = Arc::clone(&attempts);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(Error::InvalidConfig("not retryable".to_string()))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
