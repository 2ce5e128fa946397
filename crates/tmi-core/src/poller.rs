//! Stabilized polling of gateway telemetry.
//!
//! The gateway debounces its radio readings internally and only refreshes
//! them roughly every 10 seconds. Polling it faster just returns the same
//! reading again, and storing those repeats would skew every aggregate built
//! on top of the samples. [`GatewayPoller::next_stable`] therefore withholds a
//! sample until it differs from the last accepted one, with an upper bound on
//! how long it is willing to wait.
//!
//! # Algorithm
//!
//! 1. If less than [`PollerConfig::min_wait`] has passed since the last
//!    accepted sample, sleep for the remainder and re-check.
//! 2. Fetch a candidate (with retries, see [`crate::retry`]).
//! 3. Accept it if there is no previous sample, if more than
//!    [`PollerConfig::max_wait`] has passed, or if its signal readings differ
//!    from the previous sample's.
//! 4. Otherwise sleep [`PollerConfig::delay`] and go back to step 2.
//!
//! Elapsed time is measured with a monotonic clock, so wall-clock adjustments
//! cannot stall or short-circuit the loop.
//!
//! # Example
//!
//! ```no_run
//! use tmi_core::{GatewayClient, GatewayPoller, PollerConfig};
//!
//! # async fn example() -> Result<(), tmi_core::Error> {
//! let client = GatewayClient::new(tmi_core::DEFAULT_HOST)?;
//! let mut poller = GatewayPoller::new(client, PollerConfig::default());
//!
//! loop {
//!     let stats = poller.next_stable().await?;
//!     println!("{:?}", stats.signal);
//! }
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use tmi_types::Stats;

use crate::clock::{Clock, TokioClock};
use crate::error::{Error, Result};
use crate::retry::{RetryConfig, with_retry};
use crate::traits::GatewaySource;

/// Don't poll sooner than this after accepting a sample.
pub const DEFAULT_MIN_WAIT: Duration = Duration::from_millis(9000);

/// Force acceptance once this much time has passed since the last sample.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_millis(10000);

/// Pause between polls while the reading is unchanged.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Timing and retry settings for [`GatewayPoller`].
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Minimum time between an accepted sample and the next poll.
    pub min_wait: Duration,
    /// Time after which an unchanged reading is accepted anyway.
    pub max_wait: Duration,
    /// Pause between polls that returned an unchanged reading.
    pub delay: Duration,
    /// Retry policy for individual fetches.
    pub retry: RetryConfig,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            min_wait: DEFAULT_MIN_WAIT,
            max_wait: DEFAULT_MAX_WAIT,
            delay: DEFAULT_DELAY,
            retry: RetryConfig::for_gateway(),
        }
    }
}

impl PollerConfig {
    /// Set the minimum wait.
    #[must_use]
    pub fn min_wait(mut self, wait: Duration) -> Self {
        self.min_wait = wait;
        self
    }

    /// Set the maximum wait.
    #[must_use]
    pub fn max_wait(mut self, wait: Duration) -> Self {
        self.max_wait = wait;
        self
    }

    /// Set the delay between unchanged polls.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the fetch retry policy.
    #[must_use]
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Check that the timings make sense together.
    pub fn validate(&self) -> Result<()> {
        if self.max_wait < self.min_wait {
            return Err(Error::InvalidConfig(format!(
                "max_wait ({:?}) must not be shorter than min_wait ({:?})",
                self.max_wait, self.min_wait
            )));
        }
        if self.delay.is_zero() {
            return Err(Error::InvalidConfig("delay must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Why a sample was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptReason {
    /// First sample of the session.
    First,
    /// Signal readings differ from the previous sample.
    Changed,
    /// Nothing changed within `max_wait`; accepted to keep the series moving.
    Forced,
}

/// The most recently accepted sample.
#[derive(Debug, Clone)]
pub struct Accepted {
    /// Monotonic time of acceptance.
    pub at: Instant,
    /// Why it was accepted.
    pub reason: AcceptReason,
    /// The sample itself.
    pub stats: Stats,
}

/// Produces one stabilized sample per call.
///
/// One poller is one polling session: the last accepted sample is kept
/// between calls and decides how long the next call waits.
pub struct GatewayPoller<S, C = TokioClock> {
    source: S,
    clock: C,
    config: PollerConfig,
    last_accepted: Option<Accepted>,
    cancel: Option<CancellationToken>,
}

impl<S: GatewaySource> GatewayPoller<S, TokioClock> {
    /// Create a poller driven by the tokio clock.
    pub fn new(source: S, config: PollerConfig) -> Self {
        Self::with_clock(source, TokioClock, config)
    }
}

impl<S: GatewaySource, C: Clock> GatewayPoller<S, C> {
    /// Create a poller with a custom clock.
    pub fn with_clock(source: S, clock: C, config: PollerConfig) -> Self {
        Self {
            source,
            clock,
            config,
            last_accepted: None,
            cancel: None,
        }
    }

    /// Abort waits and fetches with [`Error::Cancelled`] once `token` fires.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The underlying telemetry source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The poller's configuration.
    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// The last accepted sample, if any.
    pub fn last_accepted(&self) -> Option<&Accepted> {
        self.last_accepted.as_ref()
    }

    /// Fetch one sample, retrying transient failures.
    ///
    /// Intermediate failures are swallowed; if every attempt fails the last
    /// attempt's error is returned.
    pub async fn fetch_one(&self) -> Result<Stats> {
        let fetch = with_retry(&self.config.retry, &self.clock, "fetch_stats", || {
            self.source.fetch_stats()
        });
        self.cancellable(fetch).await
    }

    /// Wait for and return the next stabilized sample.
    ///
    /// Fetch failures that exhaust the retry policy are returned as-is and
    /// leave the last accepted sample untouched.
    pub async fn next_stable(&mut self) -> Result<Stats> {
        while let Some(elapsed) = self.elapsed() {
            if elapsed >= self.config.min_wait {
                break;
            }
            let remaining = self.config.min_wait - elapsed;
            debug!("Waiting {:?} before polling the gateway", remaining);
            self.pause(remaining).await?;
        }

        loop {
            let elapsed = self.elapsed();
            let candidate = self.fetch_one().await?;

            let reason = match (&self.last_accepted, elapsed) {
                (None, _) => Some(AcceptReason::First),
                // Strictly past max_wait, measured before the fetch: a poll issued
                // exactly at max_wait still needs a change to be accepted
                (Some(_), Some(elapsed)) if elapsed > self.config.max_wait => {
                    Some(AcceptReason::Forced)
                }
                (Some(last), _) if !last.stats.same_signal(&candidate) => {
                    Some(AcceptReason::Changed)
                }
                _ => None,
            };

            if let Some(reason) = reason {
                match reason {
                    AcceptReason::Forced => info!(
                        "Reading unchanged for {:?}; accepting it anyway",
                        elapsed.unwrap_or_default()
                    ),
                    _ => debug!("Accepted sample ({:?})", reason),
                }
                self.last_accepted = Some(Accepted {
                    at: self.clock.now(),
                    reason,
                    stats: candidate.clone(),
                });
                return Ok(candidate);
            }

            debug!(
                "Reading unchanged, polling again in {:?}",
                self.config.delay
            );
            self.pause(self.config.delay).await?;
        }
    }

    /// Time since the last accepted sample, or `None` if there is none.
    fn elapsed(&self) -> Option<Duration> {
        self.last_accepted
            .as_ref()
            .map(|last| self.clock.now().saturating_duration_since(last.at))
    }

    /// Sleep on the poller's clock.
    ///
    /// Returns [`Error::Cancelled`] early if the poller's token fires.
    pub async fn pause(&self, duration: Duration) -> Result<()> {
        self.cancellable(async {
            self.clock.sleep(duration).await;
            Ok(())
        })
        .await
    }

    async fn cancellable<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(Error::Cancelled),
                result = fut => result,
            },
            None => fut.await,
        }
    }
}
