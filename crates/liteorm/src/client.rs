//! Generic client trait for unified database access.

use crate::error::{OrmError, OrmResult};
use crate::row::{self, Row};
use crate::value::Value;

/// The synchronous execution seam every builder runs through.
///
/// Implemented for a bare [`rusqlite::Connection`] (statements are prepared on every
/// call) and for [`crate::Database`] (statements come from its cache).
pub trait GenericClient {
    /// Execute a query and return all rows.
    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>>;

    /// Execute a query and return the first row, if any.
    ///
    /// Multiple rows are not an error; the rest are discarded.
    fn query_opt(&self, sql: &str, params: &[Value]) -> OrmResult<Option<Row>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }

    /// Execute a query and return the first row.
    ///
    /// Returns `OrmError::NotFound` if no rows are returned.
    fn query_one(&self, sql: &str, params: &[Value]) -> OrmResult<Row> {
        self.query_opt(sql, params)?
            .ok_or_else(|| OrmError::not_found("Expected one row, got none"))
    }

    /// Execute a statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64>;

    /// Rowid of the most recent successful INSERT on this connection.
    fn last_insert_rowid(&self) -> i64;
}

impl GenericClient for rusqlite::Connection {
    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        let mut stmt = self.prepare(sql).map_err(OrmError::from_db_error)?;
        row::collect_rows(&mut stmt, params)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        let mut stmt = self.prepare(sql).map_err(OrmError::from_db_error)?;
        run_statement(&mut stmt, params)
    }

    fn last_insert_rowid(&self) -> i64 {
        rusqlite::Connection::last_insert_rowid(self)
    }
}

pub(crate) fn run_statement(stmt: &mut rusqlite::Statement<'_>, params: &[Value]) -> OrmResult<u64> {
    let affected = stmt
        .execute(rusqlite::params_from_iter(params.iter()))
        .map_err(OrmError::from_db_error)?;
    Ok(affected as u64)
}
