//! Database handle: one host-provided connection plus its own statement cache.
//!
//! The connection's lifecycle (opening, pragmas, closing the file) belongs to the
//! caller. A [`Database`] borrows it and caches prepared statements keyed by SQL text,
//! so a builder that renders the same SQL twice is parsed once.
//!
//! # Example
//! ```
//! use liteorm::prelude::*;
//! use liteorm::{qb, Database};
//!
//! # fn main() -> OrmResult<()> {
//! let conn = rusqlite::Connection::open_in_memory()?;
//! let db = Database::new(&conn);
//! db.exec("CREATE TABLE kv (k TEXT PRIMARY KEY, v TEXT)")?;
//!
//! for k in ["a", "b", "c"] {
//!     qb::insert("kv", [("k", k), ("v", "x")]).execute(&db)?;
//! }
//! assert_eq!(db.cache_stats().misses, 1);
//! assert_eq!(db.cache_stats().hits, 2);
//! # Ok(())
//! # }
//! ```

mod config;
mod statement_cache;

pub use config::{DatabaseConfig, StatementCacheConfig};
pub use statement_cache::StatementCacheStats;

use crate::client::{self, GenericClient};
use crate::error::{OrmError, OrmResult};
use crate::row::{self, Row};
use crate::value::Value;
use rusqlite::{Connection, Statement};
use statement_cache::{StatementCache, StmtCacheLookup};
use std::cell::RefCell;
use std::time::Instant;

/// A connection wrapper that routes every statement through a private LRU cache.
///
/// Not `Sync`: the engine serializes statements on one connection and the cache is
/// unsynchronized.
pub struct Database<'c> {
    conn: &'c Connection,
    config: DatabaseConfig,
    cache: RefCell<StatementCache<'c>>,
}

impl<'c> Database<'c> {
    /// Wrap a connection with the default configuration.
    pub fn new(conn: &'c Connection) -> Self {
        Self::with_config(conn, DatabaseConfig::default())
    }

    /// Wrap a connection with an explicit configuration.
    pub fn with_config(conn: &'c Connection, config: DatabaseConfig) -> Self {
        let cache = StatementCache::new(config.statement_cache.capacity);
        Self {
            conn,
            config,
            cache: RefCell::new(cache),
        }
    }

    /// The underlying connection.
    pub fn connection(&self) -> &'c Connection {
        self.conn
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Run one or more raw statements without parameters or caching.
    pub fn exec(&self, sql: &str) -> OrmResult<()> {
        tracing::debug!(target: "liteorm.sql", sql = %self.display_sql(sql), "exec");
        self.conn
            .execute_batch(sql)
            .map_err(OrmError::from_db_error)
    }

    /// Current statement cache counters.
    pub fn cache_stats(&self) -> StatementCacheStats {
        self.cache.borrow().stats()
    }

    /// Drop every cached statement.
    pub fn clear_statement_cache(&self) {
        self.cache.borrow_mut().clear();
        tracing::debug!(target: "liteorm.cache", "statement cache cleared");
    }

    /// Release the cache and give the connection back to the caller.
    pub fn close(self) -> &'c Connection {
        self.clear_statement_cache();
        self.conn
    }

    fn display_sql<'s>(&self, sql: &'s str) -> std::borrow::Cow<'s, str> {
        match self.config.log_max_sql_length {
            Some(max) if sql.len() > max => {
                format!("{}...", truncate_sql_bytes(sql, max)).into()
            }
            _ => sql.into(),
        }
    }

    /// Run `f` against a prepared statement for `sql`, cached when enabled.
    fn with_statement<R>(
        &self,
        sql: &str,
        params: &[Value],
        f: impl FnOnce(&mut Statement<'c>) -> OrmResult<R>,
    ) -> OrmResult<R> {
        let start = Instant::now();

        let result = if self.config.cache_enabled() {
            let mut cache = self.cache.borrow_mut();
            let (stmt, lookup) = cache.get_or_prepare(self.conn, sql)?;
            self.log_statement(sql, params, lookup);
            f(stmt)
        } else {
            let mut stmt = self.conn.prepare(sql).map_err(OrmError::from_db_error)?;
            self.log_statement(sql, params, StmtCacheLookup::Disabled);
            f(&mut stmt)
        };

        let elapsed = start.elapsed();
        if let Some(threshold) = self.config.slow_query_threshold {
            if elapsed >= threshold {
                tracing::warn!(
                    target: "liteorm.sql",
                    elapsed_ms = elapsed.as_millis() as u64,
                    sql = %self.display_sql(sql),
                    "slow query"
                );
            }
        }
        result
    }

    fn log_statement(&self, sql: &str, params: &[Value], lookup: StmtCacheLookup) {
        tracing::debug!(
            target: "liteorm.sql",
            query_type = ?QueryType::from_sql(sql),
            param_count = params.len(),
            cache = lookup.as_str(),
            sql = %self.display_sql(sql),
        );
    }
}

impl GenericClient for Database<'_> {
    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        self.with_statement(sql, params, |stmt| row::collect_rows(stmt, params))
    }

    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        self.with_statement(sql, params, |stmt| client::run_statement(stmt, params))
    }

    fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }
}

/// The type of SQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl QueryType {
    fn from_sql(sql: &str) -> Self {
        let keyword = sql
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        match keyword.as_str() {
            "SELECT" => QueryType::Select,
            "INSERT" | "REPLACE" => QueryType::Insert,
            "UPDATE" => QueryType::Update,
            "DELETE" => QueryType::Delete,
            _ => QueryType::Other,
        }
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
