//! Main store implementation.

use std::io::Write;
use std::path::Path;

use rusqlite::{Connection, ErrorCode, ffi, params, params_from_iter};
use time::OffsetDateTime;
use tracing::{debug, info};

use tmi_types::{SignalMap, SpeedTestResult};

use crate::error::{Error, Result};
use crate::models::{
    BandRow, NoteKind, NoteSpan, StoredSpeedTest, StoredStats, from_millis, to_millis,
};
use crate::queries::RangeQuery;
use crate::schema;

const BAND_COLUMNS: &str = "timestamp_ms, generation, band, bars, sinr, rsrq, rsrp, rssi";

/// SQLite-based store for gateway statistics.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    ///
    /// A new file is initialized at the current schema version; an existing
    /// one must already be at that version.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening database at {}", path.display());
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.init()?;

        // Only once the version check passed; a refused file keeps its journal mode
        store.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(store)
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init()?;
        Ok(store)
    }

    /// Create the schema if the database is new, otherwise check its version.
    ///
    /// Safe to call repeatedly.
    pub fn init(&self) -> Result<()> {
        schema::initialize(&self.conn)
    }

    /// The schema version recorded in the database.
    pub fn schema_version(&self) -> Result<Option<i64>> {
        schema::read_version(&self.conn)
    }

    /// Close the database, reporting any error SQLite raises while doing so.
    ///
    /// Dropping the store also closes it, silently.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Database(e))
    }

    /// Pick a key for a store-assigned row: now, or one millisecond past the
    /// newest existing key if the clock hasn't moved past it.
    fn next_timestamp_ms(&self, table: &str, column: &str) -> Result<i64> {
        let last: Option<i64> = self.conn.query_row(
            &format!("SELECT MAX({column}) FROM {table}"),
            [],
            |row| row.get(0),
        )?;
        let now = to_millis(OffsetDateTime::now_utc());

        Ok(match last {
            Some(last) if last >= now => last + 1,
            _ => now,
        })
    }
}

// Signal operations
impl Store {
    /// Save an accepted signal sample under the current time.
    ///
    /// Returns the timestamp the sample was stored under.
    pub fn save_signal(&self, signal: &SignalMap) -> Result<OffsetDateTime> {
        let ms = self.next_timestamp_ms("stats", "timestamp_ms")?;
        self.insert_signal(ms, signal)
    }

    /// Save a signal sample under an explicit timestamp.
    ///
    /// Fails with [`Error::DuplicateTimestamp`] if a sample already exists
    /// at the same millisecond.
    pub fn save_signal_at(
        &self,
        timestamp: OffsetDateTime,
        signal: &SignalMap,
    ) -> Result<OffsetDateTime> {
        self.insert_signal(to_millis(timestamp), signal)
    }

    fn insert_signal(&self, ms: i64, signal: &SignalMap) -> Result<OffsetDateTime> {
        signal.validate()?;
        let json = serde_json::to_string(signal)?;

        self.conn
            .execute(
                "INSERT INTO stats (timestamp_ms, signal) VALUES (?1, ?2)",
                params![ms, json],
            )
            .map_err(|e| key_conflict(e, "stats", ms))?;

        debug!("Saved signal sample at {ms}");
        from_millis(ms)
    }

    /// The `n` most recent band rows, newest first.
    ///
    /// Rows sharing a timestamp come 4g before 5g, then by band name, so a
    /// limit that splits a sample keeps its leading rows.
    pub fn get_last_stats(&self, n: u32) -> Result<Vec<BandRow>> {
        let sql = format!(
            "SELECT {BAND_COLUMNS} FROM stats_bands
             ORDER BY timestamp_ms DESC, generation, band
             LIMIT ?1"
        );
        self.read_bands(&sql, vec![i64::from(n)])
    }

    /// Raw samples with `start <= timestamp <= end`, oldest first.
    pub fn get_stats(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<StoredStats>> {
        self.query_stats(&RangeQuery::between(start, end))
    }

    /// Raw samples matching a range query.
    pub fn query_stats(&self, query: &RangeQuery) -> Result<Vec<StoredStats>> {
        let (sql, params) =
            query.build_sql("timestamp_ms, signal", "stats", "timestamp_ms", "");
        debug!("Executing query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(ms, json)| -> Result<StoredStats> {
                Ok(StoredStats {
                    timestamp: from_millis(ms)?,
                    signal: SignalMap::from_json(&json)?,
                })
            })
            .collect()
    }

    /// Band rows matching a range query.
    pub fn query_bands(&self, query: &RangeQuery) -> Result<Vec<BandRow>> {
        let (sql, params) =
            query.build_sql(BAND_COLUMNS, "stats_bands", "timestamp_ms", "generation, band");
        self.read_bands(&sql, params)
    }

    fn read_bands(&self, sql: &str, params: Vec<i64>) -> Result<Vec<BandRow>> {
        debug!("Executing query: {}", sql);

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    [
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                        row.get::<_, i64>(6)?,
                        row.get::<_, i64>(7)?,
                    ],
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(ms, generation, band, [bars, sinr, rsrq, rsrp, rssi])| -> Result<BandRow> {
                    Ok(BandRow {
                        timestamp: from_millis(ms)?,
                        generation: generation.parse()?,
                        band,
                        bars,
                        sinr,
                        rsrq,
                        rsrp,
                        rssi,
                    })
                },
            )
            .collect()
    }

    /// Number of stored samples.
    pub fn count_stats(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM stats", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Write band rows matching `query` as CSV, header first.
    ///
    /// Returns the number of data rows written.
    pub fn export_bands_csv<W: Write>(&self, writer: W, query: &RangeQuery) -> Result<usize> {
        let rows = self.query_bands(query)?;

        let mut csv = csv::Writer::from_writer(writer);
        for row in &rows {
            csv.serialize(row)?;
        }
        csv.flush()?;

        info!("Exported {} band rows", rows.len());
        Ok(rows.len())
    }
}

// Speed test operations
impl Store {
    /// Save a completed speed test, keyed by its start time.
    pub fn save_speed_test(
        &self,
        started: OffsetDateTime,
        finished: OffsetDateTime,
        result: &SpeedTestResult,
    ) -> Result<()> {
        let started_ms = to_millis(started);
        let json = serde_json::to_string(result)?;

        self.conn
            .execute(
                "INSERT INTO speed_tests (started_ms, finished_ms, result, upload_bps, download_bps)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    started_ms,
                    to_millis(finished),
                    json,
                    saturating_i64(result.upload_bps()),
                    saturating_i64(result.download_bps()),
                ],
            )
            .map_err(|e| key_conflict(e, "speed_tests", started_ms))?;

        debug!("Saved speed test started at {started_ms}");
        Ok(())
    }

    /// Speed tests matching a range query on their start time.
    pub fn query_speed_tests(&self, query: &RangeQuery) -> Result<Vec<StoredSpeedTest>> {
        let (sql, params) = query.build_sql(
            "started_ms, finished_ms, result, upload_bps, download_bps",
            "speed_tests",
            "started_ms",
            "",
        );
        debug!("Executing query: {}", sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(started, finished, json, upload, download)| -> Result<StoredSpeedTest> {
                Ok(StoredSpeedTest {
                    started: from_millis(started)?,
                    finished: from_millis(finished)?,
                    upload_bps: upload.max(0) as u64,
                    download_bps: download.max(0) as u64,
                    result: SpeedTestResult::from_json(&json)?,
                })
            })
            .collect()
    }

    /// Speed tests started within `[start, end]`, oldest first.
    pub fn get_speed_tests(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<StoredSpeedTest>> {
        self.query_speed_tests(&RangeQuery::between(start, end))
    }

    /// The most recently started speed test.
    pub fn get_last_speed_test(&self) -> Result<Option<StoredSpeedTest>> {
        let mut tests = self.query_speed_tests(&RangeQuery::new().newest_first().limit(1))?;
        Ok(tests.pop())
    }
}

// Note operations
impl Store {
    /// Save a note under the current time.
    pub fn save_note(&self, kind: NoteKind, text: &str) -> Result<OffsetDateTime> {
        let ms = self.next_timestamp_ms("notes", "timestamp_ms")?;
        self.insert_note(ms, kind, text)
    }

    /// Save a note under an explicit timestamp.
    pub fn save_note_at(
        &self,
        timestamp: OffsetDateTime,
        kind: NoteKind,
        text: &str,
    ) -> Result<OffsetDateTime> {
        self.insert_note(to_millis(timestamp), kind, text)
    }

    fn insert_note(&self, ms: i64, kind: NoteKind, text: &str) -> Result<OffsetDateTime> {
        self.conn
            .execute(
                "INSERT INTO notes (timestamp_ms, kind, text) VALUES (?1, ?2, ?3)",
                params![ms, kind.as_str(), text],
            )
            .map_err(|e| key_conflict(e, "notes", ms))?;

        debug!("Saved {kind} at {ms}");
        from_millis(ms)
    }

    /// All notes with their span ends, oldest first.
    pub fn get_notes(&self) -> Result<Vec<NoteSpan>> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp_ms, kind, text, end_ms FROM note_spans ORDER BY timestamp_ms",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(ms, kind, text, end)| -> Result<NoteSpan> {
                let kind = kind
                    .parse::<NoteKind>()
                    .map_err(|e| Error::InvalidRecord(tmi_types::ParseError::InvalidData(e)))?;
                Ok(NoteSpan {
                    timestamp: from_millis(ms)?,
                    kind,
                    text,
                    end: end.map(from_millis).transpose()?,
                })
            })
            .collect()
    }
}

/// Map a primary-key collision on insert to [`Error::DuplicateTimestamp`].
fn key_conflict(error: rusqlite::Error, table: &'static str, timestamp_ms: i64) -> Error {
    match &error {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == ErrorCode::ConstraintViolation
                && matches!(
                    err.extended_code,
                    ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                        | ffi::SQLITE_CONSTRAINT_ROWID
                        | ffi::SQLITE_CONSTRAINT_UNIQUE
                ) =>
        {
            Error::DuplicateTimestamp {
                table,
                timestamp_ms,
            }
        }
        _ => Error::Database(error),
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{expand_bands, pair_spans};
    use crate::models::StoredNote;
    use time::Duration;
    use tmi_types::{Generation, SignalInfo};

    const SPEEDTEST_JSON: &str = r#"{
        "type": "result",
        "ping": {"jitter": 1.5, "latency": 30.0, "low": 28.0, "high": 33.0},
        "download": {"bandwidth": 40000000, "bytes": 500000000, "elapsed": 12000,
            "latency": {"iqm": 80.0, "low": 30.0, "high": 400.0, "jitter": 20.0}},
        "upload": {"bandwidth": 2500000, "bytes": 30000000, "elapsed": 9000,
            "latency": {"iqm": 60.0, "low": 28.0, "high": 250.0, "jitter": 14.0}},
        "packetLoss": 0.5,
        "server": {"id": 42, "host": "speedtest.example.net", "port": 8080,
            "name": "Example", "location": "Portland, OR", "ip": "203.0.113.9"},
        "result": {"url": "https://www.speedtest.net/result/c/xyz"}
    }"#;

    fn info(bands: &[&str], sinr: i64) -> SignalInfo {
        SignalInfo {
            bands: bands.iter().map(|b| b.to_string()).collect(),
            bars: 3,
            cid: 12,
            enbid: Some(310463),
            gnbid: None,
            rsrp: -105,
            rsrq: -9,
            rssi: -96,
            sinr,
        }
    }

    fn lte(sinr: i64) -> SignalMap {
        SignalMap {
            four_g: Some(info(&["b2", "b66"], sinr)),
            five_g: None,
        }
    }

    fn at(ms: i64) -> OffsetDateTime {
        from_millis(1_700_000_000_000 + ms).unwrap()
    }

    #[test]
    fn test_open_in_memory() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), Some(crate::SCHEMA_VERSION));
        assert_eq!(store.count_stats().unwrap(), 0);
        assert!(store.get_notes().unwrap().is_empty());
        assert!(store.get_last_speed_test().unwrap().is_none());
    }

    #[test]
    fn test_init_twice_is_noop() {
        let store = Store::open_in_memory().unwrap();
        store.save_signal(&lte(5)).unwrap();
        store.init().unwrap();
        assert_eq!(store.count_stats().unwrap(), 1);
    }

    #[test]
    fn test_signal_round_trip() {
        let store = Store::open_in_memory().unwrap();
        let signal = SignalMap {
            four_g: Some(info(&["b66"], 4)),
            five_g: Some(SignalInfo {
                gnbid: Some(1_234_567),
                enbid: None,
                ..info(&["n41"], 17)
            }),
        };

        let saved_at = store.save_signal_at(at(0), &signal).unwrap();
        let stats = store.get_stats(at(0), at(0)).unwrap();

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].timestamp, saved_at);
        assert_eq!(stats[0].signal, signal);
    }

    #[test]
    fn test_save_signal_rejects_empty_bands() {
        let store = Store::open_in_memory().unwrap();
        let result = store.save_signal(&SignalMap {
            four_g: Some(info(&[], 1)),
            five_g: None,
        });
        assert!(matches!(result, Err(Error::InvalidRecord(_))));
        assert_eq!(store.count_stats().unwrap(), 0);
    }

    #[test]
    fn test_store_assigned_timestamps_strictly_increase() {
        let store = Store::open_in_memory().unwrap();
        let first = store.save_signal(&lte(1)).unwrap();
        let second = store.save_signal(&lte(2)).unwrap();
        let third = store.save_signal(&lte(3)).unwrap();

        assert!(first < second && second < third);
        assert_eq!(store.count_stats().unwrap(), 3);
    }

    #[test]
    fn test_store_assigned_timestamp_after_future_row() {
        let store = Store::open_in_memory().unwrap();
        let future = OffsetDateTime::now_utc() + Duration::hours(1);
        store.save_signal_at(future, &lte(1)).unwrap();

        let saved = store.save_signal(&lte(2)).unwrap();
        assert_eq!(to_millis(saved), to_millis(future) + 1);
    }

    #[test]
    fn test_duplicate_explicit_timestamp() {
        let store = Store::open_in_memory().unwrap();
        store.save_signal_at(at(10), &lte(1)).unwrap();

        let result = store.save_signal_at(at(10), &lte(2));
        assert!(matches!(
            result,
            Err(Error::DuplicateTimestamp { table: "stats", .. })
        ));

        store.save_note_at(at(10), NoteKind::Note, "a").unwrap();
        let result = store.save_note_at(at(10), NoteKind::Note, "b");
        assert!(matches!(
            result,
            Err(Error::DuplicateTimestamp { table: "notes", .. })
        ));
    }

    #[test]
    fn test_get_stats_range_is_inclusive_and_ascending() {
        let store = Store::open_in_memory().unwrap();
        for (ms, sinr) in [(300, 3), (100, 1), (200, 2), (400, 4)] {
            store.save_signal_at(at(ms), &lte(sinr)).unwrap();
        }

        let stats = store.get_stats(at(100), at(300)).unwrap();
        let sinrs: Vec<_> = stats
            .iter()
            .map(|s| s.signal.four_g.as_ref().unwrap().sinr)
            .collect();
        assert_eq!(sinrs, vec![1, 2, 3]);

        assert!(store.get_stats(at(301), at(399)).unwrap().is_empty());
    }

    #[test]
    fn test_band_expansion_lte_only() {
        let store = Store::open_in_memory().unwrap();
        store.save_signal_at(at(0), &lte(7)).unwrap();

        let rows = store.get_last_stats(10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].band, "b2");
        assert_eq!(rows[1].band, "b66");
        for row in &rows {
            assert_eq!(row.generation, Generation::FourG);
            assert_eq!(row.timestamp, at(0));
            assert_eq!(
                (row.bars, row.sinr, row.rsrq, row.rsrp, row.rssi),
                (3, 7, -9, -105, -96)
            );
        }
    }

    #[test]
    fn test_get_last_stats_newest_first() {
        let store = Store::open_in_memory().unwrap();
        for ms in [0, 1_000, 2_000] {
            store.save_signal_at(at(ms), &lte(ms / 1_000)).unwrap();
        }

        let rows = store.get_last_stats(3).unwrap();
        let keys: Vec<_> = rows.iter().map(|r| (r.timestamp, r.band.as_str())).collect();
        assert_eq!(
            keys,
            vec![(at(2_000), "b2"), (at(2_000), "b66"), (at(1_000), "b2")]
        );

        assert!(store.get_last_stats(0).unwrap().is_empty());
    }

    #[test]
    fn test_get_last_stats_counts_band_rows() {
        let store = Store::open_in_memory().unwrap();
        store.save_signal(&lte(1)).unwrap();
        store.save_signal(&lte(2)).unwrap();

        let rows = store.get_last_stats(1).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].sinr, rows[0].band.as_str()), (2, "b2"));

        assert_eq!(store.get_last_stats(100).unwrap().len(), 4);
    }

    #[test]
    fn test_band_view_matches_expand_bands() {
        let store = Store::open_in_memory().unwrap();
        store.save_signal_at(at(0), &lte(1)).unwrap();
        store
            .save_signal_at(
                at(5),
                &SignalMap {
                    four_g: Some(info(&["b12"], 2)),
                    five_g: Some(info(&["n71", "n41"], 11)),
                },
            )
            .unwrap();

        let key = |r: &BandRow| (r.timestamp, r.generation, r.band.clone());

        let mut from_view = store.query_bands(&RangeQuery::new()).unwrap();
        let mut from_records: Vec<BandRow> = store
            .query_stats(&RangeQuery::new())
            .unwrap()
            .iter()
            .flat_map(expand_bands)
            .collect();

        from_view.sort_by_key(key);
        from_records.sort_by_key(key);
        assert_eq!(from_view.len(), 5);
        assert_eq!(from_view, from_records);
    }

    #[test]
    fn test_note_spans() {
        let store = Store::open_in_memory().unwrap();
        store.save_note_at(at(1), NoteKind::SpanStart, "on the windowsill").unwrap();
        store.save_note_at(at(2), NoteKind::Note, "storm").unwrap();
        store.save_note_at(at(3), NoteKind::SpanStart, "moved upstairs").unwrap();

        let notes = store.get_notes().unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!((notes[0].kind, notes[0].end), (NoteKind::SpanStart, Some(at(3))));
        assert_eq!((notes[1].kind, notes[1].end), (NoteKind::Note, None));
        assert_eq!((notes[2].kind, notes[2].end), (NoteKind::SpanStart, None));
        assert_eq!(notes[1].text, "storm");
    }

    #[test]
    fn test_note_view_matches_pair_spans() {
        let store = Store::open_in_memory().unwrap();
        let notes = [
            (at(0), NoteKind::Note, "before anything"),
            (at(10), NoteKind::SpanStart, "a"),
            (at(20), NoteKind::Note, "inside a"),
            (at(30), NoteKind::SpanStart, "b"),
            (at(40), NoteKind::SpanStart, "c"),
            (at(50), NoteKind::Note, "inside c"),
        ];
        for (timestamp, kind, text) in notes {
            store.save_note_at(timestamp, kind, text).unwrap();
        }

        let records: Vec<StoredNote> = notes
            .iter()
            .map(|(timestamp, kind, text)| StoredNote {
                timestamp: *timestamp,
                kind: *kind,
                text: text.to_string(),
            })
            .collect();

        assert_eq!(store.get_notes().unwrap(), pair_spans(&records));
    }

    #[test]
    fn test_speed_test_round_trip() {
        let store = Store::open_in_memory().unwrap();
        let result = SpeedTestResult::from_json(SPEEDTEST_JSON).unwrap();

        store.save_speed_test(at(0), at(25_000), &result).unwrap();

        let stored = store.get_last_speed_test().unwrap().unwrap();
        assert_eq!(stored.started, at(0));
        assert_eq!(stored.finished, at(25_000));
        assert_eq!(stored.download_bps, 40_000_000);
        assert_eq!(stored.upload_bps, 2_500_000);
        assert_eq!(stored.result, result);
    }

    #[test]
    fn test_speed_test_range_and_duplicate() {
        let store = Store::open_in_memory().unwrap();
        let result = SpeedTestResult::from_json(SPEEDTEST_JSON).unwrap();

        store.save_speed_test(at(0), at(1), &result).unwrap();
        store.save_speed_test(at(100), at(101), &result).unwrap();
        assert!(matches!(
            store.save_speed_test(at(100), at(200), &result),
            Err(Error::DuplicateTimestamp {
                table: "speed_tests",
                ..
            })
        ));

        assert_eq!(store.get_speed_tests(at(50), at(150)).unwrap().len(), 1);
        assert_eq!(
            store.get_last_speed_test().unwrap().unwrap().started,
            at(100)
        );
    }

    #[test]
    fn test_export_bands_csv() {
        let store = Store::open_in_memory().unwrap();
        store.save_signal_at(at(0), &lte(6)).unwrap();
        store.save_signal_at(at(1_000), &lte(8)).unwrap();

        let mut out = Vec::new();
        let written = store
            .export_bands_csv(&mut out, &RangeQuery::new().since(at(500)))
            .unwrap();
        assert_eq!(written, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "timestamp,generation,band,bars,sinr,rsrq,rsrp,rssi");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains(",4g,b2,3,8,-9,-105,-96"));
    }

    #[test]
    fn test_file_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stats.db");

        let store = Store::open(&path).unwrap();
        store.save_signal(&lte(5)).unwrap();
        store.save_note(NoteKind::SpanStart, "baseline").unwrap();
        store.close().unwrap();

        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.count_stats().unwrap(), 1);
        assert_eq!(reopened.get_notes().unwrap()[0].text, "baseline");
    }

    #[test]
    fn test_open_refuses_newer_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.db");

        let store = Store::open(&path).unwrap();
        store
            .conn
            .execute("UPDATE schema_version SET version = 99", [])
            .unwrap();
        drop(store);

        match Store::open(&path) {
            Err(Error::UnsupportedVersion { found, supported }) => {
                assert_eq!(found, 99);
                assert_eq!(supported, crate::SCHEMA_VERSION);
            }
            Err(other) => panic!("expected UnsupportedVersion, got {other:?}"),
            Ok(_) => panic!("expected UnsupportedVersion, got a store"),
        }
    }

    #[test]
    fn test_refused_database_keeps_journal_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.db");

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE schema_version (id INTEGER PRIMARY KEY, version INTEGER NOT NULL);
                 INSERT INTO schema_version (id, version) VALUES (1, 0);",
            )
            .unwrap();
        }

        assert!(matches!(
            Store::open(&path),
            Err(Error::UpgradeRequired { found: 0, .. })
        ));

        let conn = Connection::open(&path).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "delete");
    }

    #[test]
    fn test_opened_database_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("stats.db")).unwrap();
        let mode: String = store
            .conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
    }
}
