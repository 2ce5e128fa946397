//! Time-range query builder.
//!
//! [`RangeQuery`] is shared by the signal, band and speed-test range reads.
//! Bounds are inclusive.
//!
//! # Example
//!
//! ```
//! use tmi_store::{RangeQuery, Store};
//! use time::{Duration, OffsetDateTime};
//!
//! let store = Store::open_in_memory()?;
//! let now = OffsetDateTime::now_utc();
//!
//! let last_day = RangeQuery::new().since(now - Duration::days(1));
//! let samples = store.query_stats(&last_day)?;
//!
//! let latest_tests = RangeQuery::new().newest_first().limit(5);
//! let tests = store.query_speed_tests(&latest_tests)?;
//! # assert!(samples.is_empty() && tests.is_empty());
//! # Ok::<(), tmi_store::Error>(())
//! ```

use time::OffsetDateTime;

use crate::models::to_millis;

/// Fluent query builder over a timestamp column.
///
/// By default a query covers all time, has no limit, and returns rows
/// oldest first.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RangeQuery {
    /// Include rows at or after this time.
    pub since: Option<OffsetDateTime>,
    /// Include rows at or before this time.
    pub until: Option<OffsetDateTime>,
    /// Maximum number of rows.
    pub limit: Option<u32>,
    /// Order by timestamp descending.
    pub newest_first: bool,
}

impl RangeQuery {
    /// Create an unbounded, oldest-first query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Query the inclusive range `[start, end]`.
    pub fn between(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self::new().since(start).until(end)
    }

    /// Filter to rows at or after this time.
    #[must_use]
    pub fn since(mut self, time: OffsetDateTime) -> Self {
        self.since = Some(time);
        self
    }

    /// Filter to rows at or before this time.
    #[must_use]
    pub fn until(mut self, time: OffsetDateTime) -> Self {
        self.until = Some(time);
        self
    }

    /// Limit the number of rows.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Return the newest rows first.
    #[must_use]
    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    /// Return the oldest rows first (the default).
    #[must_use]
    pub fn oldest_first(mut self) -> Self {
        self.newest_first = false;
        self
    }

    /// Build the WHERE clause and its parameters for `column`.
    pub(crate) fn build_where(&self, column: &str) -> (String, Vec<i64>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(since) = self.since {
            conditions.push(format!("{column} >= ?"));
            params.push(to_millis(since));
        }

        if let Some(until) = self.until {
            conditions.push(format!("{column} <= ?"));
            params.push(to_millis(until));
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        (clause, params)
    }

    /// Build the full statement: `select` from `source`, filtered and
    /// ordered on `column`, with `tiebreak` appended to the ordering.
    pub(crate) fn build_sql(
        &self,
        select: &str,
        source: &str,
        column: &str,
        tiebreak: &str,
    ) -> (String, Vec<i64>) {
        let (where_clause, params) = self.build_where(column);
        let order = if self.newest_first { "DESC" } else { "ASC" };

        let mut sql =
            format!("SELECT {select} FROM {source}{where_clause} ORDER BY {column} {order}");
        if !tiebreak.is_empty() {
            sql.push_str(", ");
            sql.push_str(tiebreak);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query() {
        let query = RangeQuery::new();
        let (sql, params) = query.build_sql("*", "stats", "timestamp_ms", "");
        assert_eq!(sql, "SELECT * FROM stats ORDER BY timestamp_ms ASC");
        assert!(params.is_empty());
    }

    #[test]
    fn test_bounded_query() {
        let start = OffsetDateTime::from_unix_timestamp(1_000).unwrap();
        let end = OffsetDateTime::from_unix_timestamp(2_000).unwrap();
        let query = RangeQuery::between(start, end).newest_first().limit(3);

        let (sql, params) = query.build_sql("*", "stats_bands", "timestamp_ms", "band");
        assert_eq!(
            sql,
            "SELECT * FROM stats_bands WHERE timestamp_ms >= ? AND timestamp_ms <= ? \
             ORDER BY timestamp_ms DESC, band LIMIT 3"
        );
        assert_eq!(params, vec![1_000_000, 2_000_000]);
    }

    #[test]
    fn test_oldest_first_resets_order() {
        let query = RangeQuery::new().newest_first().oldest_first();
        assert!(!query.newest_first);
    }
}
