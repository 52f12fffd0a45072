//! SELECT query builder.

use crate::client::GenericClient;
use crate::condition::{self, normalize, Conditions};
use crate::error::{OrmError, OrmResult};
use crate::ident;
use crate::qb::clause::{self, OrderBy, SortOrder, WhereClause};
use crate::qb::param::ParamList;
use crate::qb::traits::{BuiltQuery, SqlQb};
use crate::record::Record;
use crate::row::{FromRow, Row};
use crate::value::{FromValue, Value};

/// SELECT query builder.
///
/// Clause order is fixed at render time: WHERE, GROUP BY, HAVING, ORDER BY, LIMIT,
/// OFFSET, whatever order the builder methods were called in.
#[derive(Clone, Debug)]
pub struct SelectQb {
    /// Table name
    table: String,
    /// Selected columns (empty means `*`)
    columns: Vec<String>,
    /// Raw column expression, replaces `columns` when set
    select_raw: Option<String>,
    distinct: bool,
    where_clause: WhereClause,
    group_by: Vec<String>,
    having: Conditions,
    order_by: Vec<OrderBy>,
    limit: Option<i64>,
    offset: Option<i64>,
    /// Primary key used to wrap rows returned by `first`
    primary_key: Option<String>,
}

impl SelectQb {
    /// Create a new SELECT query builder for a table.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            select_raw: None,
            distinct: false,
            where_clause: WhereClause::new(),
            group_by: Vec::new(),
            having: Conditions::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            primary_key: None,
        }
    }

    /// Primary key column of the table, needed by [`Record`] mutations.
    pub fn with_primary_key(mut self, column: &str) -> Self {
        self.primary_key = Some(column.to_string());
        self
    }

    // ==================== SELECT columns ====================

    /// Replace the selected columns.
    pub fn select(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|c| c.to_string()).collect();
        self.select_raw = None;
        self
    }

    /// Use a raw column expression, e.g. `"category", COUNT(*) AS "n"`.
    ///
    /// The expression is emitted verbatim and never parameterized.
    pub fn select_raw(mut self, expr: &str) -> Self {
        self.select_raw = Some(expr.to_string());
        self
    }

    /// Emit `SELECT DISTINCT`.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ==================== WHERE ====================

    /// Merge a condition mapping into the AND filter (last write wins per column).
    pub fn and_where(mut self, conditions: impl Into<Conditions>) -> Self {
        self.where_clause.and_where(conditions.into());
        self
    }

    /// Add `column <symbol> value` to the AND filter.
    pub fn where_cmp(mut self, column: &str, symbol: &str, value: impl Into<Value>) -> Self {
        self.where_clause.and_column(column, normalize(symbol, value));
        self
    }

    /// Register an alternative filter that matches independently of the AND filter.
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

    // ==================== Ordering & Grouping ====================

    /// Append an ORDER BY key.
    pub fn order_by(mut self, column: &str, order: SortOrder) -> Self {
        self.order_by.push((column.to_string(), order));
        self
    }

    /// Append ORDER BY column ASC.
    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by(column, SortOrder::Asc)
    }

    /// Append ORDER BY column DESC.
    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, SortOrder::Desc)
    }

    /// Replace the GROUP BY columns.
    pub fn group_by(mut self, cols: &[&str]) -> Self {
        self.group_by = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Merge a condition mapping into HAVING.
    pub fn having(mut self, conditions: impl Into<Conditions>) -> Self {
        self.having.merge(conditions.into());
        self
    }

    /// Add `column <symbol> value` to HAVING.
    pub fn having_cmp(mut self, column: &str, symbol: &str, value: impl Into<Value>) -> Self {
        self.having.insert(column, normalize(symbol, value));
        self
    }

    // ==================== Pagination ====================

    /// Set LIMIT.
    pub fn limit(mut self, n: i64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, n: i64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Pagination helper.
    ///
    /// `page` is 1-based (clamped to >= 1).
    /// `per_page` is clamped to >= 1.
    pub fn paginate(mut self, page: i64, per_page: i64) -> Self {
        let p = page.max(1);
        let size = per_page.max(1);
        self.limit = Some(size);
        self.offset = Some((p - 1) * size);
        self
    }

    // ==================== Build helpers ====================

    fn table_sql(&self) -> OrmResult<String> {
        ident::quote(&self.table)
    }

    fn columns_sql(&self) -> OrmResult<String> {
        if let Some(raw) = &self.select_raw {
            return Ok(raw.clone());
        }
        if self.columns.is_empty() {
            return Ok("*".to_string());
        }
        ident::quote_list(&self.columns)
    }

    fn build_select(&self) -> OrmResult<BuiltQuery> {
        let mut params = ParamList::new();
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.columns_sql()?);
        sql.push_str(" FROM ");
        sql.push_str(&self.table_sql()?);

        let where_sql = self.where_clause.build(&mut params)?;
        clause::push_where(&mut sql, &where_sql);

        self.push_group_by(&mut sql)?;

        let having_sql = condition::compile(&self.having, &mut params)?;
        if !having_sql.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&having_sql);
        }

        clause::push_order_by(&mut sql, &self.order_by)?;
        clause::push_limit_offset(&mut sql, self.limit, self.offset);

        Ok(BuiltQuery::new(sql, params.into_vec()))
    }

    fn push_group_by(&self, sql: &mut String) -> OrmResult<()> {
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&ident::quote_list(&self.group_by)?);
        }
        Ok(())
    }

    /// `SELECT COUNT(*)` over the AND filter only.
    ///
    /// OR branches and grouping are not applied here.
    fn build_count(&self) -> OrmResult<BuiltQuery> {
        let mut params = ParamList::new();
        let mut sql = format!(r#"SELECT COUNT(*) AS "count" FROM {}"#, self.table_sql()?);
        let where_sql = self.where_clause.build_and(&mut params)?;
        clause::push_where(&mut sql, &where_sql);
        Ok(BuiltQuery::new(sql, params.into_vec()))
    }

    /// Aggregate over the AND filter, respecting GROUP BY but not OR branches.
    fn build_aggregate(&self, func: &str, column: &str) -> OrmResult<BuiltQuery> {
        let mut params = ParamList::new();
        let mut sql = format!(
            r#"SELECT {func}({}) AS "aggregate" FROM {}"#,
            ident::quote(column)?,
            self.table_sql()?
        );
        let where_sql = self.where_clause.build_and(&mut params)?;
        clause::push_where(&mut sql, &where_sql);
        self.push_group_by(&mut sql)?;
        Ok(BuiltQuery::new(sql, params.into_vec()))
    }

    fn build_exists(&self) -> OrmResult<BuiltQuery> {
        let inner = self.build_select()?;
        Ok(BuiltQuery::new(
            format!(r#"SELECT EXISTS({}) AS "exists""#, inner.sql),
            inner.params,
        ))
    }

    /// The COUNT statement `count` would execute (for debugging).
    pub fn to_count_sql(&self) -> OrmResult<BuiltQuery> {
        self.build_count()
    }

    /// The EXISTS statement `exists` would execute (for debugging).
    pub fn to_exists_sql(&self) -> OrmResult<BuiltQuery> {
        self.build_exists()
    }

    fn wrap(&self, row: Row) -> Record {
        Record::new(&self.table, self.primary_key.as_deref(), row)
    }

    // ==================== Execution ====================

    /// Execute and return every row.
    pub fn all(&self, conn: &impl GenericClient) -> OrmResult<Vec<Row>> {
        self.query(conn)
    }

    /// Execute with LIMIT 1 and wrap the row, if any.
    pub fn first(&self, conn: &impl GenericClient) -> OrmResult<Option<Record>> {
        let built = self.clone().limit(1).build_select()?;
        let row = conn.query_opt(&built.sql, &built.params)?;
        Ok(row.map(|r| self.wrap(r)))
    }

    /// Like [`SelectQb::first`], but a missing row is [`OrmError::NotFound`].
    pub fn first_or_fail(&self, conn: &impl GenericClient) -> OrmResult<Record> {
        self.first(conn)?.ok_or_else(|| {
            OrmError::not_found(format!("No row in \"{}\" matches the query", self.table))
        })
    }

    /// Execute with LIMIT 1 and map the row to `T`.
    pub fn first_as<T: FromRow>(&self, conn: &impl GenericClient) -> OrmResult<Option<T>> {
        let built = self.clone().limit(1).build_select()?;
        let row = conn.query_opt(&built.sql, &built.params)?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Whether any row matches the full filter.
    pub fn exists(&self, conn: &impl GenericClient) -> OrmResult<bool> {
        let built = self.build_exists()?;
        let row = conn.query_one(&built.sql, &built.params)?;
        row.get("exists")
    }

    /// Count rows matching the AND filter.
    pub fn count(&self, conn: &impl GenericClient) -> OrmResult<i64> {
        let built = self.build_count()?;
        let row = conn.query_one(&built.sql, &built.params)?;
        row.get("count")
    }

    /// Select one column and collect its values.
    pub fn pluck<T: FromValue>(&self, conn: &impl GenericClient, column: &str) -> OrmResult<Vec<T>> {
        let built = self.clone().select(&[column]).build_select()?;
        let rows = conn.query(&built.sql, &built.params)?;
        rows.iter().map(|r| r.get_at(0)).collect()
    }

    /// Runs the aggregate and keeps the first result row.
    ///
    /// With `group_by` set the engine returns one row per group; only the first, in
    /// engine order, is returned and the rest are discarded. Narrow the AND filter to
    /// one group, or use `select_raw` with `all`, to read every group.
    fn aggregate(&self, conn: &impl GenericClient, func: &str, column: &str) -> OrmResult<Value> {
        let built = self.build_aggregate(func, column)?;
        let row = conn.query_opt(&built.sql, &built.params)?;
        Ok(row
            .and_then(|r| r.value_at(0).cloned())
            .unwrap_or(Value::Null))
    }

    /// `SUM(column)`; NULL when no row matches.
    ///
    /// Uses the AND filter only. With `group_by` set, yields the first group's value.
    pub fn sum(&self, conn: &impl GenericClient, column: &str) -> OrmResult<Value> {
        self.aggregate(conn, "SUM", column)
    }

    /// `AVG(column)`; NULL when no row matches.
    ///
    /// Uses the AND filter only. With `group_by` set, yields the first group's value.
    pub fn avg(&self, conn: &impl GenericClient, column: &str) -> OrmResult<Value> {
        self.aggregate(conn, "AVG", column)
    }

    /// `MIN(column)`; NULL when no row matches.
    ///
    /// Uses the AND filter only. With `group_by` set, yields the first group's value.
    pub fn min(&self, conn: &impl GenericClient, column: &str) -> OrmResult<Value> {
        self.aggregate(conn, "MIN", column)
    }

    /// `MAX(column)`; NULL when no row matches.
    ///
    /// Uses the AND filter only. With `group_by` set, yields the first group's value.
    pub fn max(&self, conn: &impl GenericClient, column: &str) -> OrmResult<Value> {
        self.aggregate(conn, "MAX", column)
    }
}

impl SqlQb for SelectQb {
    fn build(&self) -> OrmResult<BuiltQuery> {
        self.build_select()
    }
}
