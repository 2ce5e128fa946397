//! Telemetry types for T-Mobile Home Internet gateways.
//!
//! This crate provides the typed records shared by the gateway client
//! (tmi-core), the local store (tmi-store) and the command-line tool.
//!
//! # Features
//!
//! - Decoding and validation of the gateway's `TMI/v1/gateway?get=all` payload
//! - Per-generation (4G/5G) signal readings
//! - Speed-test result records from the Ookla CLI
//! - Error types for payload decoding
//!
//! # Example
//!
//! ```
//! use tmi_types::{Generation, Stats};
//!
//! let body = br#"{"signal": {"5g": {"bands": ["n41"], "bars": 4, "cid": 51,
//!     "gNBID": 1234, "rsrp": -92, "rsrq": -11, "rssi": -80, "sinr": 12}}}"#;
//! let stats = Stats::from_slice(body)?;
//! for (generation, info) in stats.signal.iter() {
//!     assert_eq!(generation, Generation::FiveG);
//!     assert_eq!(info.bands, vec!["n41".to_string()]);
//! }
//! # Ok::<(), tmi_types::ParseError>(())
//! ```

pub mod error;
pub mod speedtest;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use speedtest::{
    LoadedLatency, PingLatency, ResultKind, ResultLink, SpeedTestResult, SpeedTestServer,
    TransferStats,
};
pub use types::{DeviceInfo, Generation, SignalInfo, SignalMap, Stats};
