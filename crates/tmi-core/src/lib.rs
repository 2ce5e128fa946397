//! Gateway polling and speed-test collection for T-Mobile Home Internet.
//!
//! This crate talks to the gateway's local telemetry endpoint and to the
//! Ookla speed-test CLI, and turns both into typed records from
//! [`tmi_types`].
//!
//! # Features
//!
//! - **Gateway client**: fetch and decode `TMI/v1/gateway?get=all`
//! - **Retries**: bounded retry of transient HTTP and decode failures
//! - **Stabilized polling**: only hand out a sample once the gateway has
//!   actually refreshed its reading (or a maximum wait has passed)
//! - **Cancellation**: every wait can be interrupted with a
//!   [`CancellationToken`](tokio_util::sync::CancellationToken)
//! - **Speed tests**: run the `speedtest` CLI and decode its result
//! - **Mocking**: a scripted [`MockGateway`] for tests
//!
//! # Quick Start
//!
//! ```no_run
//! use tmi_core::{GatewayClient, GatewayPoller, PollerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GatewayClient::new("192.168.12.1")?;
//!     let mut poller = GatewayPoller::new(client, PollerConfig::default());
//!
//!     for _ in 0..3 {
//!         let stats = poller.next_stable().await?;
//!         for (generation, info) in stats.signal.iter() {
//!             println!("{generation}: {:?} SINR {} dB", info.bands, info.sinr);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod error;
pub mod gateway;
pub mod mock;
pub mod poller;
pub mod retry;
pub mod speedtest;
pub mod traits;

pub use clock::{Clock, TokioClock};
pub use error::{Error, Result, SPEEDTEST_INSTALL_HELP};
pub use gateway::{DEFAULT_HOST, DEFAULT_TIMEOUT, GatewayClient, REQUEST_PATH};
pub use mock::MockGateway;
pub use poller::{AcceptReason, Accepted, GatewayPoller, PollerConfig};
pub use retry::{RetryConfig, with_retry};
pub use speedtest::{SpeedTestRun, SpeedTestRunner};
pub use traits::GatewaySource;

// Re-export from tmi-types
pub use tmi_types::{DeviceInfo, Generation, SignalInfo, SignalMap, SpeedTestResult, Stats};
