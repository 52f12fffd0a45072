//! Clause state shared by the statement builders.

use crate::condition::{self, Conditions, WhereValue};
use crate::error::OrmResult;
use crate::ident;
use crate::qb::param::ParamList;

/// WHERE state: one AND mapping plus a list of OR alternatives.
///
/// OR branches are alternatives to the whole AND mapping, not extra terms inside it:
/// AND `{status: "active"}` with branch `{role: "admin"}` renders
/// `("status" = ?) OR ("role" = ?)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WhereClause {
    and: Conditions,
    or: Vec<Conditions>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge into the AND mapping (last write wins per column).
    pub fn and_where(&mut self, conditions: Conditions) {
        self.and.merge(conditions);
    }

    /// Merge one column constraint into the AND mapping.
    pub fn and_column(&mut self, column: impl Into<String>, value: impl Into<WhereValue>) {
        self.and.insert(column, value);
    }

    /// Register a new OR alternative.
    pub fn or_where(&mut self, conditions: Conditions) {
        self.or.push(conditions);
    }

    /// Whether neither the AND mapping nor any OR branch holds entries.
    pub fn is_empty(&self) -> bool {
        self.and.is_empty() && self.or.iter().all(Conditions::is_empty)
    }

    /// Render the full filter (AND mapping, then OR branches).
    ///
    /// Returns an empty string when nothing constrains the statement.
    pub fn build(&self, params: &mut ParamList) -> OrmResult<String> {
        let mut fragments = Vec::with_capacity(1 + self.or.len());

        let and_sql = condition::compile(&self.and, params)?;
        if !and_sql.is_empty() {
            fragments.push(and_sql);
        }
        for branch in &self.or {
            let branch_sql = condition::compile(branch, params)?;
            if !branch_sql.is_empty() {
                fragments.push(branch_sql);
            }
        }

        Ok(match fragments.len() {
            0 => String::new(),
            1 => fragments.remove(0),
            _ => fragments
                .iter()
                .map(|f| format!("({f})"))
                .collect::<Vec<_>>()
                .join(" OR "),
        })
    }

    /// Render only the AND mapping, ignoring OR branches.
    pub fn build_and(&self, params: &mut ParamList) -> OrmResult<String> {
        condition::compile(&self.and, params)
    }
}

/// Sort direction for ORDER BY.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

pub(crate) type OrderBy = (String, SortOrder);

pub(crate) fn push_where(sql: &mut String, fragment: &str) {
    if !fragment.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(fragment);
    }
}

pub(crate) fn push_order_by(sql: &mut String, order_by: &[OrderBy]) -> OrmResult<()> {
    if order_by.is_empty() {
        return Ok(());
    }
    let parts = order_by
        .iter()
        .map(|(column, dir)| Ok(format!("{} {}", ident::quote(column)?, dir.as_sql())))
        .collect::<OrmResult<Vec<_>>>()?;
    sql.push_str(" ORDER BY ");
    sql.push_str(&parts.join(", "));
    Ok(())
}

/// LIMIT/OFFSET are rendered as literals. OFFSET alone needs `LIMIT -1` in SQLite.
pub(crate) fn push_limit_offset(sql: &mut String, limit: Option<i64>, offset: Option<i64>) {
    match (limit, offset) {
        (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
        (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
        (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
        (None, None) => {}
    }
}

/// Filter for UPDATE/DELETE.
///
/// Bounded writes go through a rowid subquery since the bundled engine is compiled
/// without `UPDATE ... LIMIT`. ORDER BY only matters when a bound is present.
pub(crate) fn push_write_filter(
    sql: &mut String,
    table: &str,
    where_clause: &WhereClause,
    order_by: &[OrderBy],
    limit: Option<i64>,
    offset: Option<i64>,
    params: &mut ParamList,
) -> OrmResult<()> {
    let where_sql = where_clause.build(params)?;
    if limit.is_none() && offset.is_none() {
        push_where(sql, &where_sql);
        return Ok(());
    }

    let mut inner = format!("SELECT rowid FROM {table}");
    push_where(&mut inner, &where_sql);
    push_order_by(&mut inner, order_by)?;
    push_limit_offset(&mut inner, limit, offset);

    sql.push_str(" WHERE rowid IN (");
    sql.push_str(&inner);
    sql.push(')');
    Ok(())
}
