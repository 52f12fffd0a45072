//! # liteorm
//!
//! A typed query builder and WHERE-clause compiler for embedded SQLite.
//!
//! ## Features
//!
//! - **Structured conditions**: column → value or operator bag, compiled to `?` placeholders
//! - **Two calling conventions, one code path**: `where_cmp("age", ">", 18)` and
//!   `and_where(Conditions::new().with("age", OpBag::new().gt(18)))` render identically
//! - **OR alternatives**: `or_where` adds a filter that matches independently of the AND filter
//! - **Conflict handling**: `INSERT OR IGNORE`, `INSERT OR REPLACE`, and `if_not_exists`
//! - **Statement cache**: a per-handle LRU of prepared statements keyed by SQL text
//! - **Records**: fetched rows that can update, delete and refresh themselves
//!
//! ## Query Builder (qb)
//!
//! ```
//! use liteorm::prelude::*;
//! use liteorm::{qb, Database, Table};
//!
//! const PRODUCTS: Table = Table::new("product").with_primary_key("id");
//!
//! # fn main() -> OrmResult<()> {
//! let conn = rusqlite::Connection::open_in_memory()?;
//! let db = Database::new(&conn);
//! db.exec("CREATE TABLE product (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, price REAL)")?;
//!
//! for (name, price) in [("a", 10.0), ("b", 20.0), ("c", 30.0)] {
//!     PRODUCTS.insert(Data::new().set("name", name).set("price", price)).run(&db)?;
//! }
//!
//! let cheap = PRODUCTS
//!     .select()
//!     .and_where(Conditions::new().with("price", OpBag::new().gte(10.0).lt(25.0)))
//!     .order_by_desc("price")
//!     .all(&db)?;
//! assert_eq!(cheap.len(), 2);
//!
//! let mut c = PRODUCTS.find_or_fail(&db, 3)?;
//! c.update(&db, [("price", 35.0)])?;
//!
//! assert_eq!(qb::delete("product").where_cmp("price", "<", 25.0).run(&db)?, 2);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod condition;
pub mod database;
pub mod error;
pub mod ident;
pub mod prelude;
pub mod qb;
pub mod record;
pub mod row;
pub mod table;
pub mod transaction;
pub mod value;

pub use client::GenericClient;
pub use condition::{compile_conditions, normalize, Conditions, Op, OpBag, WhereValue};
pub use database::{Database, DatabaseConfig, StatementCacheConfig, StatementCacheStats};
pub use error::{OrmError, OrmResult};
pub use ident::Ident;
pub use record::Record;
pub use row::{Data, FromRow, Row};
pub use table::Table;
pub use value::{FromValue, Value};

// Re-export qb module for easy access
pub use qb::{
    BuiltQuery, ConflictMode, DeleteQb, InsertQb, MutationQb, SelectQb, SortOrder, SqlQb,
    UpdateQb, delete, insert, select, update,
};
