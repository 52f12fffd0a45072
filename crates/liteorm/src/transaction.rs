//! Transaction bracket for [`Database`].
//!
//! A transaction is `BEGIN` / `COMMIT` / `ROLLBACK` around ordinary builder calls on
//! the same handle. Nesting is rejected: `begin` while a transaction is open fails
//! with [`OrmError::Transaction`] instead of silently joining the outer one.
//!
//! # Example
//!
//! ```
//! use liteorm::prelude::*;
//! use liteorm::{qb, Database};
//!
//! # fn main() -> OrmResult<()> {
//! let conn = rusqlite::Connection::open_in_memory()?;
//! let db = Database::new(&conn);
//! db.exec("CREATE TABLE accounts (id INTEGER PRIMARY KEY, balance INTEGER)")?;
//!
//! db.transaction(|db| {
//!     qb::insert("accounts", [("balance", 100)]).execute(db)?;
//!     qb::insert("accounts", [("balance", 50)]).execute(db)?;
//!     Ok(())
//! })?;
//! assert_eq!(qb::select("accounts").count(&db)?, 2);
//! # Ok(())
//! # }
//! ```

use crate::database::Database;
use crate::error::{OrmError, OrmResult};

impl Database<'_> {
    /// Whether a transaction is currently open on the connection.
    pub fn in_transaction(&self) -> bool {
        !self.connection().is_autocommit()
    }

    /// Open a transaction.
    pub fn begin(&self) -> OrmResult<()> {
        if self.in_transaction() {
            return Err(OrmError::Transaction(
                "a transaction is already open; nested transactions are not supported"
                    .to_string(),
            ));
        }
        tracing::debug!(target: "liteorm.tx", "begin");
        self.exec("BEGIN")
    }

    /// Commit the open transaction.
    pub fn commit(&self) -> OrmResult<()> {
        if !self.in_transaction() {
            return Err(OrmError::Transaction("no transaction is open".to_string()));
        }
        tracing::debug!(target: "liteorm.tx", "commit");
        self.exec("COMMIT")
    }

    /// Roll back the open transaction.
    pub fn rollback(&self) -> OrmResult<()> {
        if !self.in_transaction() {
            return Err(OrmError::Transaction("no transaction is open".to_string()));
        }
        tracing::debug!(target: "liteorm.tx", "rollback");
        self.exec("ROLLBACK")
    }

    /// Runs `f` inside a transaction.
    ///
    /// - Begins a transaction.
    /// - Commits on `Ok(_)`.
    /// - Rolls back on `Err(_)` and returns the original error.
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> OrmResult<T>) -> OrmResult<T> {
        self.begin()?;
        match f(self) {
            Ok(value) => match self.commit() {
                Ok(()) => Ok(value),
                Err(error) => Err(self.abort(error)),
            },
            Err(error) => Err(self.abort(error)),
        }
    }

    /// Roll back after `error`, folding a rollback failure into the message.
    fn abort(&self, error: OrmError) -> OrmError {
        if !self.in_transaction() {
            return error;
        }
        match self.rollback() {
            Ok(()) => error,
            Err(rollback_err) => {
                OrmError::Other(format!("{error} (rollback failed: {rollback_err})"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GenericClient;
    use crate::value::Value;
    use rusqlite::Connection;

    fn setup(conn: &Connection) -> Database<'_> {
        let db = Database::new(conn);
        db.exec("CREATE TABLE t (id INTEGER PRIMARY KEY, v INTEGER UNIQUE)")
            .unwrap();
        db
    }

    fn count(db: &Database<'_>) -> i64 {
        db.query_one("SELECT COUNT(*) AS n FROM t", &[])
            .unwrap()
            .get("n")
            .unwrap()
    }

    #[test]
    fn commits_on_ok() {
        let conn = Connection::open_in_memory().unwrap();
        let db = setup(&conn);
        let out = db
            .transaction(|db| {
                db.execute("INSERT INTO t (v) VALUES (?)", &[Value::Integer(1)])?;
                Ok(7)
            })
            .unwrap();
        assert_eq!(out, 7);
        assert_eq!(count(&db), 1);
        assert!(!db.in_transaction());
    }

    #[test]
    fn rolls_back_on_err() {
        let conn = Connection::open_in_memory().unwrap();
        let db = setup(&conn);
        let err = db
            .transaction(|db| {
                db.execute("INSERT INTO t (v) VALUES (?)", &[Value::Integer(1)])?;
                db.execute("INSERT INTO t (v) VALUES (?)", &[Value::Integer(1)])?;
                Ok(())
            })
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(count(&db), 0);
        assert!(!db.in_transaction());
    }

    #[test]
    fn nested_begin_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let db = setup(&conn);
        db.begin().unwrap();
        assert!(matches!(db.begin(), Err(OrmError::Transaction(_))));
        let nested = db.transaction(|_| Ok(()));
        assert!(matches!(nested, Err(OrmError::Transaction(_))));
        // the outer transaction is still usable
        assert!(db.in_transaction());
        db.rollback().unwrap();
    }

    #[test]
    fn commit_without_begin_fails() {
        let conn = Connection::open_in_memory().unwrap();
        let db = setup(&conn);
        assert!(matches!(db.commit(), Err(OrmError::Transaction(_))));
        assert!(matches!(db.rollback(), Err(OrmError::Transaction(_))));
    }
}
