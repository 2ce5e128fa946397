//! HTTP client for the gateway's telemetry endpoint.
//!
//! The gateway serves everything it knows about itself from a single
//! unauthenticated endpoint on the LAN:
//!
//! ```text
//! GET http://192.168.12.1/TMI/v1/gateway?get=all
//! ```
//!
//! # Example
//!
//! ```no_run
//! use tmi_core::{GatewayClient, GatewaySource};
//!
//! # async fn example() -> Result<(), tmi_core::Error> {
//! let client = GatewayClient::new(tmi_core::DEFAULT_HOST)?;
//! let stats = client.fetch_stats().await?;
//! println!("{:?}", stats.signal);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use tmi_types::{ParseError, Stats};

use crate::error::{Error, Result};
use crate::traits::GatewaySource;

/// Where the gateway is usually reachable on the local network.
pub const DEFAULT_HOST: &str = "192.168.12.1";

/// Path and query of the telemetry endpoint.
pub const REQUEST_PATH: &str = "/TMI/v1/gateway?get=all";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for one gateway.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    host: String,
    url: String,
}

impl GatewayClient {
    /// Create a client for `host` with the default timeout.
    ///
    /// `host` is a bare host name or address, optionally with a port
    /// (e.g. `192.168.12.1` or `gateway.lan:8080`).
    pub fn new(host: &str) -> Result<Self> {
        Self::with_timeout(host, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    ///
    /// The gateway lives on the LAN, so proxy settings from the environment
    /// are ignored.
    pub fn with_timeout(host: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Self::with_client(host, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(host: &str, client: Client) -> Result<Self> {
        let host = validate_host(host)?;
        let url = format!("http://{host}{REQUEST_PATH}");
        Ok(Self { client, host, url })
    }

    /// The gateway host this client talks to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Full URL of the telemetry endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the raw JSON payload without validating its shape.
    pub async fn fetch_raw(&self) -> Result<serde_json::Value> {
        let body = self.get_body().await?;
        serde_json::from_slice(&body).map_err(|e| Error::Parse(ParseError::Json(e)))
    }

    async fn get_body(&self) -> Result<Vec<u8>> {
        debug!("GET {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Http {
                url: self.url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| Error::Http {
            url: self.url.clone(),
            source: e,
        })?;

        Ok(body.to_vec())
    }
}

#[async_trait]
impl GatewaySource for GatewayClient {
    async fn fetch_stats(&self) -> Result<Stats> {
        let body = self.get_body().await?;
        Ok(Stats::from_slice(&body)?)
    }
}

fn validate_host(host: &str) -> Result<String> {
    let host = host.trim();

    if host.is_empty() {
        return Err(Error::InvalidConfig("gateway host cannot be empty".to_string()));
    }

    if host.contains("://") || host.contains('/') {
        return Err(Error::InvalidConfig(format!(
            "gateway host must be a bare host name or address, got: {host}"
        )));
    }

    Ok(host.to_string())
}
