//! Speed tests via the Ookla `speedtest` CLI.
//!
//! The tool is run as a child process with JSON output; its stdout is decoded
//! into a [`SpeedTestResult`]. Get the tool from
//! <https://www.speedtest.net/apps/cli> and run it once by hand to accept its
//! license before using it from here.

use std::io::ErrorKind;
use std::process::Stdio;

use time::OffsetDateTime;
use tokio::process::Command;
use tracing::{debug, info};

use tmi_types::SpeedTestResult;

use crate::error::{Error, Result};

/// Executable looked up on `PATH` by default.
pub const DEFAULT_PROGRAM: &str = "speedtest";

/// Arguments requesting machine-readable output.
const JSON_ARGS: &[&str] = &["--format=json-pretty"];

/// A finished speed test together with when it ran.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedTestRun {
    pub started: OffsetDateTime,
    pub finished: OffsetDateTime,
    pub result: SpeedTestResult,
}

/// Runs the speed-test tool.
#[derive(Debug, Clone)]
pub struct SpeedTestRunner {
    program: String,
}

impl Default for SpeedTestRunner {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl SpeedTestRunner {
    /// Create a runner for the given executable name or path.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable this runner invokes.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run one speed test to completion.
    pub async fn run(&self) -> Result<SpeedTestRun> {
        info!("Running speed test with {}", self.program);
        let started = OffsetDateTime::now_utc();

        let output = Command::new(&self.program)
            .args(JSON_ARGS)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::SpeedTestNotInstalled {
                    program: self.program.clone(),
                },
                _ => Error::Io(e),
            })?;

        let finished = OffsetDateTime::now_utc();
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if !output.status.success() {
            return Err(Error::SpeedTestFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let result = parse_output(&stdout)?;
        debug!(
            "Speed test finished: down {} B/s, up {} B/s",
            result.download_bps(),
            result.upload_bps()
        );

        Ok(SpeedTestRun {
            started,
            finished,
            result,
        })
    }
}

/// Decode the tool's stdout.
pub fn parse_output(stdout: &str) -> Result<SpeedTestResult> {
    SpeedTestResult::from_json(stdout).map_err(|source| Error::SpeedTestOutput {
        output: stdout.to_string(),
        source,
    })
}
