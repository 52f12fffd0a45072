//! DELETE query builder.

use crate::condition::{normalize, Conditions};
use crate::error::OrmResult;
use crate::ident;
use crate::qb::clause::{self, OrderBy, SortOrder, WhereClause};
use crate::qb::param::ParamList;
use crate::qb::traits::{BuiltQuery, MutationQb, SqlQb};
use crate::value::Value;

/// DELETE query builder.
///
/// Without a filter every row is deleted.
#[derive(Clone, Debug)]
pub struct DeleteQb {
    /// Table name
    table: String,
    where_clause: WhereClause,
    order_by: Vec<OrderBy>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl DeleteQb {
    /// Create a new DELETE query builder.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            where_clause: WhereClause::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Merge a condition mapping into the AND filter.
    pub fn and_where(mut self, conditions: impl Into<Conditions>) -> Self {
        self.where_clause.and_where(conditions.into());
        self
    }

    /// Add `column <symbol> value` to the AND filter.
    pub fn where_cmp(mut self, column: &str, symbol: &str, value: impl Into<Value>) -> Self {
        self.where_clause.and_column(column, normalize(symbol, value));
        self
    }

    /// Register an alternative filter.
    pub fn or_where(mut self, conditions: impl Into<Conditions>) -> Self {
        self.where_clause.or_where(conditions.into());
        self
    }

    /// Register `column <symbol> value` as an alternative filter.
    pub fn or_where_cmp(mut self, column: &str, symbol: &str, value: impl Into<Value>) -> Self {
        self.where_clause
            .or_where(Conditions::new().with(column, normalize(symbol, value)));
        self
    }

    pub fn order_by(mut self, column: &str, order: SortOrder) -> Self {
        self.order_by.push((column.to_string(), order));
        self
    }

    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Build the DELETE SQL and parameters.
    fn build_delete(&self) -> OrmResult<BuiltQuery> {
        let mut params = ParamList::new();
        let table = ident::quote(&self.table)?;
        let mut sql = format!("DELETE FROM {table}");
        clause::push_write_filter(
            &mut sql,
            &table,
            &self.where_clause,
            &self.order_by,
            self.limit,
            self.offset,
            &mut params,
        )?;
        Ok(BuiltQuery::new(sql, params.into_vec()))
    }
}

impl SqlQb for DeleteQb {
    fn build(&self) -> OrmResult<BuiltQuery> {
        self.build_delete()
    }
}

impl MutationQb for DeleteQb {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_basic() {
        let built = DeleteQb::new("users").and_where([("id", 1)]).to_sql().unwrap();
        assert_eq!(built.sql, r#"DELETE FROM "users" WHERE "id" = ?"#);
        assert_eq!(built.params, vec![Value::from(1)]);
    }

    #[test]
    fn test_delete_all() {
        let built = DeleteQb::new("users").to_sql().unwrap();
        assert_eq!(built.sql, r#"DELETE FROM "users""#);
    }

    #[test]
    fn test_delete_cmp() {
        let built = DeleteQb::new("product")
            .where_cmp("price", "<", 25.0)
            .to_sql()
            .unwrap();
        assert_eq!(built.sql, r#"DELETE FROM "product" WHERE "price" < ?"#);
        assert_eq!(built.params, vec![Value::Real(25.0)]);
    }

    #[test]
    fn test_delete_bounded() {
        let built = DeleteQb::new("log")
            .order_by("created_at", SortOrder::Asc)
            .limit(100)
            .offset(10)
            .to_sql()
            .unwrap();
        assert_eq!(
            built.sql,
            r#"DELETE FROM "log" WHERE rowid IN (SELECT rowid FROM "log" ORDER BY "created_at" ASC LIMIT 100 OFFSET 10)"#
        );
        assert!(built.params.is_empty());
    }
}
