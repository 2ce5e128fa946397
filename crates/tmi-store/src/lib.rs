//! Local persistence for T-Mobile Home Internet gateway statistics.
//!
//! A single SQLite file holds every accepted signal sample, speed-test result
//! and note, keyed by millisecond UTC timestamps. Derived views expand
//! samples into per-band rows and pair span markers into ranges.
//!
//! # Features
//!
//! - Append-only signal, speed-test and note tables
//! - Schema version check on open (upgrade/unsupported/corrupt detection)
//! - `stats_bands` and `note_spans` SQL views for external tooling
//! - Range queries and CSV export of band rows
//!
//! # Example
//!
//! ```no_run
//! use tmi_store::{RangeQuery, Store};
//!
//! let store = Store::open_default()?;
//!
//! for row in store.get_last_stats(5)? {
//!     println!("{} {} {} SINR {}", row.timestamp, row.generation, row.band, row.sinr);
//! }
//!
//! let recent = store.query_stats(&RangeQuery::new().newest_first().limit(10))?;
//! println!("{} recent samples", recent.len());
//! # Ok::<(), tmi_store::Error>(())
//! ```

mod error;
mod models;
mod queries;
mod schema;
mod store;
pub mod views;

pub use error::{Error, Result};
pub use models::{BandRow, NoteKind, NoteSpan, StoredNote, StoredSpeedTest, StoredStats};
pub use queries::RangeQuery;
pub use schema::SCHEMA_VERSION;
pub use store::Store;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/tmi-stats/stats.db`
/// - macOS: `~/Library/Application Support/tmi-stats/stats.db`
/// - Windows: `C:\Users\<user>\AppData\Local\tmi-stats\stats.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("tmi-stats")
        .join("stats.db")
}
