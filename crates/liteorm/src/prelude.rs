//! Convenient imports for typical `liteorm` usage.
//!
//! ```
//! use liteorm::prelude::*;
//! ```

pub use crate::{
    Conditions, Data, FromRow, GenericClient, MutationQb, OpBag, OrmError, OrmResult, Record,
    Row, SortOrder, SqlQb, Value,
};
