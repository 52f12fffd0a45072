//! Statement builders.
//!
//! Each builder accumulates clause state through chained calls and renders SQL only
//! when a terminal method (or [`SqlQb::to_sql`]) runs. All four share the same WHERE
//! model: an AND mapping plus OR alternatives (see [`WhereClause`]).
//!
//! # Usage
//!
//! ```
//! use liteorm::prelude::*;
//! use liteorm::qb;
//!
//! # fn main() -> OrmResult<()> {
//! let conn = rusqlite::Connection::open_in_memory()?;
//! conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)")?;
//!
//! qb::insert("users", [("name", "alice")]).set("age", 31).run(&conn)?;
//!
//! let adults = qb::select("users")
//!     .where_cmp("age", ">=", 18)
//!     .order_by_asc("name")
//!     .all(&conn)?;
//! assert_eq!(adults.len(), 1);
//!
//! let changed = qb::update("users", [("age", 32)])
//!     .and_where([("name", "alice")])
//!     .run(&conn)?;
//! assert_eq!(changed, 1);
//!
//! qb::delete("users").where_cmp("age", ">", 30).run(&conn)?;
//! # Ok(())
//! # }
//! ```

mod clause;
mod delete;
mod insert;
mod param;
mod select;
mod traits;
mod update;

pub use clause::{SortOrder, WhereClause};
pub use delete::DeleteQb;
pub use insert::{ConflictMode, InsertQb};
pub use param::ParamList;
pub use select::SelectQb;
pub use traits::{BuiltQuery, MutationQb, SqlQb};
pub use update::UpdateQb;

use crate::row::Data;

/// Create a SELECT query builder for the given table.
pub fn select(table: &str) -> SelectQb {
    SelectQb::new(table)
}

/// Create an INSERT query builder for one row.
pub fn insert(table: &str, data: impl Into<Data>) -> InsertQb {
    InsertQb::new(table, data)
}

/// Create an UPDATE query builder writing `data`.
pub fn update(table: &str, data: impl Into<Data>) -> UpdateQb {
    UpdateQb::new(table, data)
}

/// Create a DELETE query builder for the given table.
pub fn delete(table: &str) -> DeleteQb {
    DeleteQb::new(table)
}
