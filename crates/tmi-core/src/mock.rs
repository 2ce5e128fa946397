//! Mock gateway for testing.
//!
//! [`MockGateway`] implements [`GatewaySource`] by replaying a script of
//! responses, so the poller can be exercised without a gateway on the LAN.
//!
//! # Features
//!
//! - **Scripted responses**: queue samples and failures in the order they
//!   should be returned
//! - **Sticky last sample**: once the script runs out, the last successful
//!   sample is repeated, like a gateway that stopped refreshing
//! - **Call counting**: assert how many fetches a code path performed

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use tmi_types::{DeviceInfo, SignalInfo, SignalMap, Stats};

use crate::error::{Error, Result};
use crate::traits::GatewaySource;

/// A scripted gateway.
///
/// # Example
///
/// ```
/// use tmi_core::{GatewaySource, MockGateway};
///
/// #[tokio::main]
/// async fn main() {
///     let gateway = MockGateway::new()
///         .with_stats(MockGateway::sample_stats(5))
///         .with_stats(MockGateway::sample_stats(7));
///
///     assert_eq!(gateway.fetch_stats().await.unwrap(), MockGateway::sample_stats(5));
///     assert_eq!(gateway.fetch_stats().await.unwrap(), MockGateway::sample_stats(7));
///     // Script exhausted: the last sample repeats
///     assert_eq!(gateway.fetch_stats().await.unwrap(), MockGateway::sample_stats(7));
///     assert_eq!(gateway.fetch_count(), 3);
/// }
/// ```
#[derive(Debug, Default)]
pub struct MockGateway {
    script: Mutex<VecDeque<Result<Stats>>>,
    last: Mutex<Option<Stats>>,
    fetch_count: AtomicU32,
}

impl MockGateway {
    /// Create a mock with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a successful sample to the script.
    #[must_use]
    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.script.get_mut().push_back(Ok(stats));
        self
    }

    /// Append a failure to the script.
    #[must_use]
    pub fn with_error(mut self, error: Error) -> Self {
        self.script.get_mut().push_back(Err(error));
        self
    }

    /// Append a successful sample after construction.
    pub async fn push_stats(&self, stats: Stats) {
        self.script.lock().await.push_back(Ok(stats));
    }

    /// Append a failure after construction.
    pub async fn push_error(&self, error: Error) {
        self.script.lock().await.push_back(Err(error));
    }

    /// Number of fetches performed so far.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// A realistic LTE-only sample whose SINR is `sinr`.
    ///
    /// Samples built with different `sinr` values compare as different
    /// readings; samples with equal `sinr` compare as the same reading.
    pub fn sample_stats(sinr: i64) -> Stats {
        Stats {
            device: DeviceInfo {
                model: Some("KVD21".to_string()),
                software_version: Some("1.00.18".to_string()),
                ..Default::default()
            },
            signal: SignalMap {
                four_g: Some(SignalInfo {
                    bands: vec!["b2".to_string(), "b66".to_string()],
                    bars: 3,
                    cid: 12,
                    enbid: Some(310463),
                    gnbid: None,
                    rsrp: -105,
                    rsrq: -9,
                    rssi: -96,
                    sinr,
                }),
                five_g: None,
            },
        }
    }
}

#[async_trait]
impl GatewaySource for MockGateway {
    async fn fetch_stats(&self) -> Result<Stats> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().await.pop_front();
        match next {
            Some(Ok(stats)) => {
                *self.last.lock().await = Some(stats.clone());
                Ok(stats)
            }
            Some(Err(e)) => Err(e),
            None => self.last.lock().await.clone().ok_or_else(|| {
                Error::InvalidConfig("mock gateway has no scripted responses".to_string())
            }),
        }
    }
}
