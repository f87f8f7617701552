//! Query builder for readings.
//!
//! [`ReadingQuery`] follows the builder pattern; every filter is optional.
//! The organization is not part of the query: it is always passed to
//! [`Store::query_readings`](crate::Store::query_readings) separately, so a
//! query can never escape its tenant.
//!
//! # Example
//!
//! ```
//! use poolchem_store::{NewPool, ReadingQuery, Store};
//! use poolchem_types::OrgId;
//! use time::{Duration, OffsetDateTime};
//!
//! let store = Store::open_in_memory()?;
//! let org = OrgId::new("acme");
//! let pool = store.create_pool(&org, &NewPool::named("Main"))?;
//! let last_week = OffsetDateTime::now_utc() - Duration::days(7);
//!
//! let query = ReadingQuery::new()
//!     .pool(&pool.id)
//!     .since(last_week)
//!     .limit(50);
//!
//! let readings = store.query_readings(&org, &query)?;
//! assert!(readings.is_empty());
//! # Ok::<(), poolchem_store::Error>(())
//! ```

use time::OffsetDateTime;

/// Fluent query builder for stored readings.
///
/// By default, queries return results ordered by `captured_at` descending
/// (newest first).
#[derive(Debug, Default, Clone)]
pub struct ReadingQuery {
    /// Filter by pool ID.
    pub pool_id: Option<String>,
    /// Filter readings at or after this time.
    pub since: Option<OffsetDateTime>,
    /// Filter readings at or before this time.
    pub until: Option<OffsetDateTime>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
    /// Order by captured_at descending (newest first).
    pub newest_first: bool,
}

impl ReadingQuery {
    /// Create a new query with default settings.
    ///
    /// Default behavior:
    /// - No pool filter (all pools of the organization)
    /// - No time range filter
    /// - No limit (all matching records)
    /// - Ordered by newest first
    pub fn new() -> Self {
        Self {
            newest_first: true,
            ..Default::default()
        }
    }

    /// Filter by pool ID.
    pub fn pool(mut self, pool_id: &str) -> Self {
        self.pool_id = Some(pool_id.to_string());
        self
    }

    /// Filter to readings captured at or after this time.
    pub fn since(mut self, time: OffsetDateTime) -> Self {
        self.since = Some(time);
        self
    }

    /// Filter to readings captured at or before this time.
    pub fn until(mut self, time: OffsetDateTime) -> Self {
        self.until = Some(time);
        self
    }

    /// Limit the maximum number of results returned.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first N results.
    ///
    /// Use with `limit()` for pagination. For example, to get page 2
    /// with 50 items per page: `.limit(50).offset(50)`.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Order results by oldest first (ascending by `captured_at`).
    pub fn oldest_first(mut self) -> Self {
        self.newest_first = false;
        self
    }

    /// Build the SQL WHERE clause and parameters. The organization is always
    /// the first parameter.
    pub(crate) fn build_where(&self, org_id: &str) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = vec!["org_id = ?"];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(org_id.to_string())];

        if let Some(ref pool_id) = self.pool_id {
            conditions.push("pool_id = ?");
            params.push(Box::new(pool_id.clone()));
        }

        if let Some(since) = self.since {
            conditions.push("captured_at >= ?");
            params.push(Box::new(since.unix_timestamp()));
        }

        if let Some(until) = self.until {
            conditions.push("captured_at <= ?");
            params.push(Box::new(until.unix_timestamp()));
        }

        (format!("WHERE {}", conditions.join(" AND ")), params)
    }

    /// Build the full SQL query.
    pub(crate) fn build_sql(&self, where_clause: &str) -> String {
        let order = if self.newest_first { "DESC" } else { "ASC" };

        let mut sql = format!(
            "SELECT id, pool_id, org_id, captured_at, ph, chlorine_free, chlorine_total, \
             alkalinity, calcium_hardness, cyanuric_acid \
             FROM readings {} ORDER BY captured_at {}, rowid {}",
            where_clause, order, order
        );

        // SQLite requires a LIMIT before OFFSET
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset)),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
            (None, None) => {}
        }

        sql
    }
}
