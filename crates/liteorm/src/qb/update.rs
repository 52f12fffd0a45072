//! UPDATE query builder.

use crate::condition::{normalize, Conditions};
use crate::error::{OrmError, OrmResult};
use crate::ident;
use crate::qb::clause::{self, OrderBy, SortOrder, WhereClause};
use crate::qb::param::ParamList;
use crate::qb::traits::{BuiltQuery, MutationQb, SqlQb};
use crate::row::Data;
use crate::value::Value;

/// UPDATE query builder.
///
/// SET values bind before WHERE values. Without a filter every row is updated.
#[derive(Clone, Debug)]
pub struct UpdateQb {
    /// Table name
    table: String,
    /// SET clauses
    data: Data,
    where_clause: WhereClause,
    order_by: Vec<OrderBy>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl UpdateQb {
    /// Create a new UPDATE query builder with the columns to write.
    pub fn new(table: &str, data: impl Into<Data>) -> Self {
        Self {
            table: table.to_string(),
            data: data.into(),
            where_clause: WhereClause::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Set a column value.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.data.insert(column, value);
        self
    }

    // ==================== WHERE ====================

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

    // ==================== Bounds ====================

    /// Append an ORDER BY key (applies together with `limit`/`offset`).
    pub fn order_by(mut self, column: &str, order: SortOrder) -> Self {
        self.order_by.push((column.to_string(), order));
        self
    }

    /// Update at most `n` rows.
    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Skip the first `n` matching rows.
    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    // ==================== Build ====================

    /// Build the UPDATE SQL and parameters.
    fn build_update(&self) -> OrmResult<BuiltQuery> {
        if self.data.is_empty() {
            return Err(OrmError::render(format!(
                "UPDATE \"{}\" has no columns to set",
                self.table
            )));
        }

        let mut params = ParamList::new();
        let table = ident::quote(&self.table)?;

        let mut set_parts = Vec::with_capacity(self.data.len());
        for (column, value) in self.data.iter() {
            set_parts.push(format!("{} = ?", ident::quote(column)?));
            params.push(value);
        }

        let mut sql = format!("UPDATE {table} SET {}", set_parts.join(", "));
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

impl SqlQb for UpdateQb {
    fn build(&self) -> OrmResult<BuiltQuery> {
        self.build_update()
    }
}

impl MutationQb for UpdateQb {}
