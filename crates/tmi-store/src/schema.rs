//! Database schema and version checks.
//!
//! The version marker lives in a single-row `schema_version` table. A fresh
//! database gets the marker, the base tables and the derived views in one
//! transaction. Databases written by another schema version are refused
//! rather than migrated.

use rusqlite::Connection;
use rusqlite::types::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Current schema version.
pub const SCHEMA_VERSION: i64 = 1;

/// Initialize the database schema, or verify an existing one.
pub fn initialize(conn: &Connection) -> Result<()> {
    match read_version(conn)? {
        None => {
            let tx = conn.unchecked_transaction()?;
            create_schema_v1(&tx)?;
            set_schema_version(&tx, SCHEMA_VERSION)?;
            tx.commit()?;
            info!("Created database schema version {SCHEMA_VERSION}");
            Ok(())
        }
        Some(found) if found == SCHEMA_VERSION => {
            debug!("Database schema version {found} is current");
            Ok(())
        }
        Some(found) if found < SCHEMA_VERSION => Err(Error::UpgradeRequired {
            found,
            required: SCHEMA_VERSION,
        }),
        Some(found) => Err(Error::UnsupportedVersion {
            found,
            supported: SCHEMA_VERSION,
        }),
    }
}

/// Read the version marker. `None` means the database has never been
/// initialized.
pub fn read_version(conn: &Connection) -> Result<Option<i64>> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(None);
    }

    let mut stmt = conn.prepare("SELECT version FROM schema_version")?;
    let values = stmt
        .query_map([], |row| row.get::<_, Value>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    match values.as_slice() {
        [Value::Integer(version)] => Ok(Some(*version)),
        [other] => Err(Error::CorruptVersion(format!(
            "expected an integer version, found {other:?}"
        ))),
        [] => Err(Error::CorruptVersion(
            "schema_version table has no rows".to_string(),
        )),
        rows => Err(Error::CorruptVersion(format!(
            "schema_version table has {} rows",
            rows.len()
        ))),
    }
}

fn set_schema_version(conn: &Connection, version: i64) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?)",
        [version],
    )?;
    Ok(())
}

/// Create the initial schema (version 1).
fn create_schema_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        );

        -- One row per accepted gateway sample; signal is the SignalMap JSON
        CREATE TABLE stats (
            timestamp_ms INTEGER PRIMARY KEY,
            signal TEXT NOT NULL CHECK (json_valid(signal))
        );

        CREATE TABLE speed_tests (
            started_ms INTEGER PRIMARY KEY,
            finished_ms INTEGER NOT NULL,
            result TEXT NOT NULL CHECK (json_valid(result)),
            upload_bps INTEGER NOT NULL,
            download_bps INTEGER NOT NULL
        );

        CREATE INDEX idx_speed_tests_upload ON speed_tests(upload_bps);
        CREATE INDEX idx_speed_tests_download ON speed_tests(download_bps);

        CREATE TABLE notes (
            timestamp_ms INTEGER PRIMARY KEY,
            kind TEXT NOT NULL CHECK (kind IN ('note', 'span-start')),
            text TEXT NOT NULL
        );

        -- One row per (sample, generation, band)
        CREATE VIEW stats_bands AS
        SELECT
            s.timestamp_ms AS timestamp_ms,
            g.key AS generation,
            b.value AS band,
            json_extract(g.value, '$.bars') AS bars,
            json_extract(g.value, '$.sinr') AS sinr,
            json_extract(g.value, '$.rsrq') AS rsrq,
            json_extract(g.value, '$.rsrp') AS rsrp,
            json_extract(g.value, '$.rssi') AS rssi
        FROM stats AS s,
            json_each(s.signal) AS g,
            json_each(g.value, '$.bands') AS b
        WHERE g.key IN ('4g', '5g');

        -- Each span-start ends at the next strictly later span-start
        CREATE VIEW note_spans AS
        SELECT
            n.timestamp_ms AS timestamp_ms,
            n.kind AS kind,
            n.text AS text,
            MIN(m.timestamp_ms) AS end_ms
        FROM notes AS n
        LEFT JOIN notes AS m
            ON n.kind = 'span-start'
            AND m.kind = 'span-start'
            AND m.timestamp_ms > n.timestamp_ms
        GROUP BY n.timestamp_ms, n.kind, n.text;
        "#,
    )?;

    Ok(())
}
