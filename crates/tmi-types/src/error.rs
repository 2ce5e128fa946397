//! Error types for decoding gateway and speed-test payloads.

use thiserror::Error;

use crate::types::Generation;

/// Errors that can occur when decoding a telemetry or speed-test payload.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The payload is not valid JSON or does not match the expected shape.
    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A generation was reported without any active bands.
    #[error("Signal info for {0} has no bands")]
    EmptyBands(Generation),

    /// The payload decoded but failed a semantic check.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias using tmi-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
