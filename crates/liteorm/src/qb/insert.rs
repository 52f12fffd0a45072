//! INSERT query builder with conflict resolution.

use crate::client::GenericClient;
use crate::condition::{self, Conditions};
use crate::error::OrmResult;
use crate::ident;
use crate::qb::clause;
use crate::qb::param::ParamList;
use crate::qb::select::SelectQb;
use crate::qb::traits::{BuiltQuery, SqlQb};
use crate::row::{Data, Row};
use crate::value::Value;

/// What the engine does when the new row collides with a uniqueness constraint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConflictMode {
    /// Fail with a constraint violation.
    #[default]
    Abort,
    /// `INSERT OR IGNORE`: skip the row silently.
    Ignore,
    /// `INSERT OR REPLACE`: delete the conflicting row, then insert.
    Replace,
}

impl ConflictMode {
    fn keyword(self) -> &'static str {
        match self {
            ConflictMode::Abort => "INSERT INTO",
            ConflictMode::Ignore => "INSERT OR IGNORE INTO",
            ConflictMode::Replace => "INSERT OR REPLACE INTO",
        }
    }
}

/// INSERT query builder.
#[derive(Clone, Debug)]
pub struct InsertQb {
    /// Table name
    table: String,
    data: Data,
    conflict: ConflictMode,
    /// Skip the insert when a row matching this mapping exists
    if_not_exists: Option<Conditions>,
    /// Used to re-fetch the inserted row
    primary_key: Option<String>,
}

impl InsertQb {
    /// Create a new INSERT query builder for one row.
    pub fn new(table: &str, data: impl Into<Data>) -> Self {
        Self {
            table: table.to_string(),
            data: data.into(),
            conflict: ConflictMode::Abort,
            if_not_exists: None,
            primary_key: None,
        }
    }

    /// Primary key column, used by [`InsertQb::run`] to re-fetch the row.
    pub fn with_primary_key(mut self, column: &str) -> Self {
        self.primary_key = Some(column.to_string());
        self
    }

    /// Set a column value.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.data.insert(column, value);
        self
    }

    /// Choose the conflict resolution mode.
    pub fn on_conflict(mut self, mode: ConflictMode) -> Self {
        self.conflict = mode;
        self
    }

    /// `INSERT OR IGNORE`
    pub fn or_ignore(self) -> Self {
        self.on_conflict(ConflictMode::Ignore)
    }

    /// `INSERT OR REPLACE`
    pub fn or_replace(self) -> Self {
        self.on_conflict(ConflictMode::Replace)
    }

    /// Only insert when no row matches `conditions`.
    pub fn if_not_exists(mut self, conditions: impl Into<Conditions>) -> Self {
        self.if_not_exists = Some(conditions.into());
        self
    }

    // ==================== Build ====================

    fn build_insert(&self) -> OrmResult<BuiltQuery> {
        let mut params = ParamList::new();
        let mut sql = format!("{} {}", self.conflict.keyword(), ident::quote(&self.table)?);

        if self.data.is_empty() {
            sql.push_str(" DEFAULT VALUES");
            return Ok(BuiltQuery::new(sql, Vec::new()));
        }

        let mut columns = Vec::with_capacity(self.data.len());
        for (column, value) in self.data.iter() {
            columns.push(ident::quote(column)?);
            params.push(value);
        }
        let placeholders = vec!["?"; columns.len()].join(", ");
        sql.push_str(&format!(" ({}) VALUES ({placeholders})", columns.join(", ")));

        Ok(BuiltQuery::new(sql, params.into_vec()))
    }

    fn build_precondition(&self, conditions: &Conditions) -> OrmResult<BuiltQuery> {
        let mut params = ParamList::new();
        let mut inner = format!("SELECT 1 FROM {}", ident::quote(&self.table)?);
        let where_sql = condition::compile(conditions, &mut params)?;
        clause::push_where(&mut inner, &where_sql);
        Ok(BuiltQuery::new(
            format!(r#"SELECT EXISTS({inner}) AS "exists""#),
            params.into_vec(),
        ))
    }

    /// The existence check `run` performs first, if `if_not_exists` was set.
    pub fn to_precondition_sql(&self) -> OrmResult<Option<BuiltQuery>> {
        self.if_not_exists
            .as_ref()
            .map(|c| self.build_precondition(c))
            .transpose()
    }

    // ==================== Execution ====================

    /// Execute the INSERT and return the affected row count.
    ///
    /// The `if_not_exists` precondition is not consulted here.
    pub fn execute(&self, conn: &impl GenericClient) -> OrmResult<u64> {
        let built = self.build_insert()?;
        conn.execute(&built.sql, &built.params)
    }

    /// Insert the row and return it.
    ///
    /// Returns `None` when the precondition matched an existing row or the engine
    /// skipped the row (`or_ignore`). With a primary key the stored row is re-fetched:
    /// by the supplied key value when the data carries one, otherwise by the engine's
    /// last inserted rowid. Without a primary key the supplied data is returned as-is.
    pub fn run(&self, conn: &impl GenericClient) -> OrmResult<Option<Row>> {
        if let Some(check) = self.to_precondition_sql()? {
            let row = conn.query_one(&check.sql, &check.params)?;
            if row.get::<bool>("exists")? {
                tracing::debug!(
                    target: "liteorm.sql",
                    table = %self.table,
                    "insert skipped, a matching row exists"
                );
                return Ok(None);
            }
        }

        if self.execute(conn)? == 0 {
            return Ok(None);
        }

        let Some(pk) = self.primary_key.as_deref() else {
            return Ok(Some(Row::from(self.data.clone())));
        };
        // keys filled by the engine (rowid alias or a column DEFAULT) are found by rowid
        let filter = match self.data.get(pk) {
            Some(v) if !v.is_null() => Conditions::new().with(pk, v),
            _ => Conditions::new().with("rowid", conn.last_insert_rowid()),
        };

        let fetch = SelectQb::new(&self.table)
            .and_where(filter)
            .limit(1)
            .build()?;
        conn.query_opt(&fetch.sql, &fetch.params)
    }
}

impl SqlQb for InsertQb {
    fn build(&self) -> OrmResult<BuiltQuery> {
        self.build_insert()
    }
}
