//! Data models for stored data.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use tmi_types::{Generation, SignalMap, SpeedTestResult};

use crate::error::{Error, Result};

/// An accepted signal sample as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredStats {
    /// When the sample was saved.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Per-generation readings.
    pub signal: SignalMap,
}

/// One band of one generation of one sample.
///
/// The generation's scalar metrics are repeated on every band row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandRow {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub generation: Generation,
    pub band: String,
    pub bars: i64,
    pub sinr: i64,
    pub rsrq: i64,
    pub rsrp: i64,
    pub rssi: i64,
}

/// A speed test as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSpeedTest {
    #[serde(with = "time::serde::rfc3339")]
    pub started: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub finished: OffsetDateTime,
    /// Upload bandwidth in bytes per second.
    pub upload_bps: u64,
    /// Download bandwidth in bytes per second.
    pub download_bps: u64,
    /// The full tool output.
    pub result: SpeedTestResult,
}

/// Kind of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteKind {
    /// A free-standing annotation.
    Note,
    /// Marks the start of a span that runs until the next span start.
    SpanStart,
}

impl NoteKind {
    /// The value stored in the `kind` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::Note => "note",
            NoteKind::SpanStart => "span-start",
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "note" => Ok(NoteKind::Note),
            "span-start" => Ok(NoteKind::SpanStart),
            other => Err(format!("unknown note kind: {other}")),
        }
    }
}

/// A note as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredNote {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub kind: NoteKind,
    pub text: String,
}

/// A note together with the end of its span.
///
/// `end` is only ever set for [`NoteKind::SpanStart`]; the most recent span
/// start is open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSpan {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub kind: NoteKind,
    pub text: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end: Option<OffsetDateTime>,
}

/// Milliseconds since the Unix epoch.
pub(crate) fn to_millis(time: OffsetDateTime) -> i64 {
    (time.unix_timestamp_nanos() / 1_000_000) as i64
}

pub(crate) fn from_millis(ms: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .map_err(|e| Error::InvalidTimestamp(format!("{ms} ms: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_round_trip() {
        let t = from_millis(1_700_000_000_123).unwrap();
        assert_eq!(to_millis(t), 1_700_000_000_123);
        assert_eq!(t.millisecond(), 123);
    }

    #[test]
    fn test_from_millis_out_of_range() {
        assert!(matches!(
            from_millis(i64::MAX),
            Err(Error::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_note_kind_strings() {
        assert_eq!(NoteKind::SpanStart.as_str(), "span-start");
        assert_eq!("note".parse::<NoteKind>().unwrap(), NoteKind::Note);
        assert!("span".parse::<NoteKind>().is_err());
        assert_eq!(
            serde_json::to_string(&NoteKind::SpanStart).unwrap(),
            "\"span-start\""
        );
    }
}
