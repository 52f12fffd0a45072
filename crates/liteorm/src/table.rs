use crate::client::GenericClient;
use crate::condition::Conditions;
use crate::error::{OrmError, OrmResult};
use crate::qb::{DeleteQb, InsertQb, SelectQb, UpdateQb};
use crate::record::Record;
use crate::row::Data;
use crate::value::Value;

/// Database table metadata helper.
///
/// Creates builders that already know the table's primary key, so fetched rows come
/// back as [`Record`]s that can write themselves back.
///
/// # Example
///
/// ```rust
/// use liteorm::prelude::*;
/// use liteorm::Table;
///
/// const USERS: Table = Table::new("users").with_primary_key("id");
///
/// let built = USERS.select().where_cmp("id", "=", 1).to_sql().unwrap();
/// assert_eq!(built.sql, r#"SELECT * FROM "users" WHERE "id" = ?"#);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub primary_key: Option<&'static str>,
}

impl Table {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            primary_key: None,
        }
    }

    pub const fn with_primary_key(mut self, col: &'static str) -> Self {
        self.primary_key = Some(col);
        self
    }

    pub fn select(&self) -> SelectQb {
        let qb = SelectQb::new(self.name);
        match self.primary_key {
            Some(pk) => qb.with_primary_key(pk),
            None => qb,
        }
    }

    pub fn insert(&self, data: impl Into<Data>) -> InsertQb {
        let qb = InsertQb::new(self.name, data);
        match self.primary_key {
            Some(pk) => qb.with_primary_key(pk),
            None => qb,
        }
    }

    pub fn update(&self, data: impl Into<Data>) -> UpdateQb {
        UpdateQb::new(self.name, data)
    }

    pub fn delete(&self) -> DeleteQb {
        DeleteQb::new(self.name)
    }

    fn pk(&self) -> OrmResult<&'static str> {
        self.primary_key.ok_or_else(|| {
            OrmError::configuration(format!("table \"{}\" has no primary key", self.name))
        })
    }

    /// Fetch the row whose primary key equals `id`.
    pub fn find(&self, conn: &impl GenericClient, id: impl Into<Value>) -> OrmResult<Option<Record>> {
        let pk = self.pk()?;
        self.select()
            .and_where(Conditions::new().with(pk, id.into()))
            .first(conn)
    }

    /// Like [`Table::find`], but a missing row is [`OrmError::NotFound`].
    pub fn find_or_fail(&self, conn: &impl GenericClient, id: impl Into<Value>) -> OrmResult<Record> {
        let id = id.into();
        self.find(conn, id.clone())?.ok_or_else(|| {
            OrmError::not_found(format!("No row in \"{}\" with key {id}", self.name))
        })
    }
}
