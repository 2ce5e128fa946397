//! Result record produced by the Ookla `speedtest` CLI.
//!
//! Only the fields the store and display care about are modelled; anything
//! else in the tool's JSON output is ignored on decode.

use serde::{Deserialize, Serialize};

use crate::error::ParseResult;

/// Discriminator the CLI puts in `type`. Only final results are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Result,
}

/// Idle latency measured before the transfers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingLatency {
    pub jitter: f64,
    pub latency: f64,
    pub low: f64,
    pub high: f64,
}

/// Latency measured while a transfer was saturating the link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedLatency {
    pub jitter: f64,
    pub iqm: f64,
    pub low: f64,
    pub high: f64,
}

/// Statistics for one transfer direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferStats {
    /// Throughput in bytes per second.
    pub bandwidth: u64,
    /// Total bytes transferred.
    pub bytes: u64,
    /// Transfer duration in milliseconds.
    pub elapsed: u64,
    pub latency: LoadedLatency,
}

/// Server the test ran against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTestServer {
    pub id: u64,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub location: String,
    /// IPv4 or IPv6 address.
    pub ip: String,
}

/// Link to the result page on speedtest.net.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultLink {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persisted: Option<bool>,
}

/// A completed speed test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedTestResult {
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub ping: PingLatency,
    pub download: TransferStats,
    pub upload: TransferStats,
    /// Packet loss percentage. Omitted by the CLI when the server cannot
    /// measure it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_loss: Option<f64>,
    pub server: SpeedTestServer,
    pub result: ResultLink,
}

impl SpeedTestResult {
    /// Decode the CLI's JSON output.
    pub fn from_json(json: &str) -> ParseResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Upload throughput in bytes per second.
    #[must_use]
    pub fn upload_bps(&self) -> u64 {
        self.upload.bandwidth
    }

    /// Download throughput in bytes per second.
    #[must_use]
    pub fn download_bps(&self) -> u64 {
        self.download.bandwidth
    }
}
