//! Error types for tmi-core.
//!
//! # Error Recovery Strategies
//!
//! | Error Type | Strategy | Rationale |
//! |------------|----------|-----------|
//! | [`Error::Http`] | Retry | Gateway busy or Wi-Fi hiccup |
//! | [`Error::Status`] | Retry | Gateway web server restarting |
//! | [`Error::Parse`] | Retry | Truncated or half-refreshed payload |
//! | [`Error::Io`] | Retry | Transient local failure |
//! | [`Error::InvalidConfig`] | Do not retry | Fix configuration and restart |
//! | [`Error::SpeedTestNotInstalled`] | Do not retry | Install the Ookla CLI |
//! | [`Error::SpeedTestFailed`] | Do not retry | Inspect the tool's output |
//! | [`Error::SpeedTestOutput`] | Do not retry | Tool version mismatch |
//! | [`Error::Cancelled`] | Do not retry | Shutdown was requested |
//!
//! Gateway fetches are retried by [`crate::with_retry`] using
//! [`crate::RetryConfig::for_gateway`]: three attempts, 100ms apart. Only the
//! final failure reaches the caller.

use thiserror::Error;

use tmi_types::ParseError;

/// Remediation text shown when the speed-test tool is missing.
pub const SPEEDTEST_INSTALL_HELP: &str = "\
Running the speed test requires the \"speedtest\" CLI, which
you can get here: https://www.speedtest.net/apps/cli

Make sure to run it once manually after installing to
accept its EULA.";

/// Errors that can occur while polling the gateway or running a speed test.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The HTTP request could not be completed.
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The gateway answered with a non-success status.
    #[error("Gateway returned HTTP {status} for {url}")]
    Status {
        url: String,
        status: u16,
    },

    /// The gateway payload did not decode into [`tmi_types::Stats`].
    #[error("Invalid gateway payload: {0}")]
    Parse(#[from] ParseError),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The speed-test executable is not on `PATH`.
    #[error("Couldn't find the \"{program}\" command in your PATH.\n\n{help}", help = SPEEDTEST_INSTALL_HELP)]
    SpeedTestNotInstalled { program: String },

    /// The speed-test executable ran but reported failure.
    #[error("Error running \"{program}\" ({status}): {stdout} {stderr}")]
    SpeedTestFailed {
        program: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    /// The speed-test executable succeeded but its output did not decode.
    #[error("Could not parse speed test output: {source}")]
    SpeedTestOutput {
        output: String,
        #[source]
        source: ParseError,
    },

    /// Operation was cancelled.
    #[error("Operation cancelled")]
    Cancelled,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using tmi-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
