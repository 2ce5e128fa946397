//! Error types for tmi-store.

use std::path::PathBuf;

/// Result type for tmi-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tmi-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The database was written by an older schema and must be migrated.
    #[error(
        "Database schema version {found} is older than the required version {required}; upgrade required"
    )]
    UpgradeRequired { found: i64, required: i64 },

    /// The database was written by a newer release.
    #[error(
        "Database schema version {found} is newer than the supported version {supported}; unsupported version"
    )]
    UnsupportedVersion { found: i64, supported: i64 },

    /// The schema version marker is present but unreadable.
    #[error("Corrupt schema version marker: {0}")]
    CorruptVersion(String),

    /// A row with the same timestamp key already exists.
    #[error("A {table} entry already exists at timestamp {timestamp_ms} ms")]
    DuplicateTimestamp {
        table: &'static str,
        timestamp_ms: i64,
    },

    /// A signal map failed validation, or a stored row did not decode.
    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] tmi_types::ParseError),

    /// Invalid timestamp.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV export error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
