//! Trait definitions for query builders.

use crate::client::GenericClient;
use crate::error::OrmResult;
use crate::row::{FromRow, Row};
use crate::value::Value;

/// Base trait for all query builders.
///
/// Rendering is pure: `build` can be called any number of times and always yields the
/// statement a terminal method would execute.
pub trait SqlQb {
    /// Render the SQL text and its parameters.
    fn build(&self) -> OrmResult<BuiltQuery>;

    /// Debug helper: exactly what a terminal call would execute, with no side effects.
    fn to_sql(&self) -> OrmResult<BuiltQuery> {
        self.build()
    }

    /// Execute query and return all rows.
    fn query(&self, conn: &impl GenericClient) -> OrmResult<Vec<Row>> {
        let built = self.build()?;
        conn.query(&built.sql, &built.params)
    }

    /// Execute query and map all rows to `T`.
    fn fetch_all<T: FromRow>(&self, conn: &impl GenericClient) -> OrmResult<Vec<T>> {
        let rows = self.query(conn)?;
        rows.iter().map(T::from_row).collect()
    }
}

/// Trait for write builders whose terminal result is an affected-row count.
pub trait MutationQb: SqlQb {
    /// Execute and return affected row count.
    fn execute(&self, conn: &impl GenericClient) -> OrmResult<u64> {
        let built = self.build()?;
        conn.execute(&built.sql, &built.params)
    }

    /// Alias for [`MutationQb::execute`].
    fn run(&self, conn: &impl GenericClient) -> OrmResult<u64> {
        self.execute(conn)
    }
}

/// The result of building a query.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl BuiltQuery {
    /// Create a new built query.
    pub fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }

    /// Number of `?` placeholders outside quoted identifiers and string literals.
    pub fn placeholder_count(&self) -> usize {
        let mut count = 0;
        let mut quote: Option<char> = None;
        for ch in self.sql.chars() {
            match (quote, ch) {
                (None, '"' | '\'') => quote = Some(ch),
                (Some(q), c) if c == q => quote = None,
                (None, '?') => count += 1,
                _ => {}
            }
        }
        count
    }
}
