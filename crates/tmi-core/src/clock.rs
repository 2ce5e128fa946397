//! Time source abstraction for the poller.
//!
//! The poller only ever asks two things of time: "what is the monotonic now"
//! and "suspend for this long". Putting both behind [`Clock`] lets tests drive
//! the stabilization state machine with tokio's paused clock, or record the
//! exact waits it requested.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

/// Monotonic time source with an async sleep.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current monotonic instant.
    fn now(&self) -> Instant;

    /// Suspend the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Clock`] backed by `tokio::time`.
///
/// Under `#[tokio::test(start_paused = true)]` this clock only advances when
/// the runtime is idle, which makes timing assertions exact.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[async_trait]
impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}
