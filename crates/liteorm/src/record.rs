//! A fetched row bound to its table and primary key.

use crate::client::GenericClient;
use crate::condition::Conditions;
use crate::error::{OrmError, OrmResult};
use crate::qb::{DeleteQb, MutationQb, SelectQb, UpdateQb};
use crate::row::{Data, Row};
use crate::value::{FromValue, Value};

/// A row that can write itself back.
///
/// Every mutation targets `WHERE <primary key> = <this row's key value>`. Without a
/// configured primary key (or with the key column missing from the row) they fail
/// with [`OrmError::Configuration`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    table: String,
    primary_key: Option<String>,
    row: Row,
}

impl Record {
    pub fn new(table: &str, primary_key: Option<&str>, row: Row) -> Self {
        Self {
            table: table.to_string(),
            primary_key: primary_key.map(str::to_string),
            row,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn into_row(self) -> Row {
        self.row
    }

    /// Typed field access.
    pub fn get<T: FromValue>(&self, column: &str) -> OrmResult<T> {
        self.row.get(column)
    }

    /// Change a field in memory; [`Record::save`] writes it back.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) {
        self.row.set(column, value);
    }

    /// The primary-key column and this row's value for it.
    pub fn id(&self) -> OrmResult<(&str, &Value)> {
        let pk = self.primary_key.as_deref().ok_or_else(|| {
            OrmError::configuration(format!("table \"{}\" has no primary key", self.table))
        })?;
        match self.row.value(pk) {
            Some(value) if !value.is_null() => Ok((pk, value)),
            _ => Err(OrmError::configuration(format!(
                "row from \"{}\" carries no value for primary key \"{pk}\"",
                self.table
            ))),
        }
    }

    fn id_filter(&self) -> OrmResult<Conditions> {
        let (pk, value) = self.id()?;
        Ok(Conditions::new().with(pk, value))
    }

    /// Delete this row; returns the affected count.
    pub fn delete(&self, conn: &impl GenericClient) -> OrmResult<u64> {
        DeleteQb::new(&self.table)
            .and_where(self.id_filter()?)
            .run(conn)
    }

    /// Write `data` to this row and mirror it in memory; returns the affected count.
    pub fn update(&mut self, conn: &impl GenericClient, data: impl Into<Data>) -> OrmResult<u64> {
        let data = data.into();
        let affected = UpdateQb::new(&self.table, data.clone())
            .and_where(self.id_filter()?)
            .run(conn)?;
        for (column, value) in data.iter() {
            self.row.set(column, value);
        }
        Ok(affected)
    }

    /// Write every non-key field back; returns the affected count.
    pub fn save(&self, conn: &impl GenericClient) -> OrmResult<u64> {
        let (pk, _) = self.id()?;
        let data: Data = self
            .row
            .iter()
            .filter(|(column, _)| *column != pk)
            .map(|(column, value)| (column, value.clone()))
            .collect();
        if data.is_empty() {
            return Ok(0);
        }
        UpdateQb::new(&self.table, data)
            .and_where(self.id_filter()?)
            .run(conn)
    }

    /// Re-read this row; `None` if it no longer exists.
    pub fn refresh(&self, conn: &impl GenericClient) -> OrmResult<Option<Record>> {
        self.select_self()?.first(conn)
    }

    /// Whether this row still exists.
    pub fn exists(&self, conn: &impl GenericClient) -> OrmResult<bool> {
        self.select_self()?.exists(conn)
    }

    fn select_self(&self) -> OrmResult<SelectQb> {
        let filter = self.id_filter()?;
        let mut qb = SelectQb::new(&self.table).and_where(filter);
        if let Some(pk) = &self.primary_key {
            qb = qb.with_primary_key(pk);
        }
        Ok(qb)
    }
}

impl From<Record> for Row {
    fn from(record: Record) -> Self {
        record.row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cols: &[&str], values: Vec<Value>) -> Row {
        let data: Data = cols.iter().copied().zip(values).collect();
        Row::from(data)
    }

    #[test]
    fn missing_primary_key_is_configuration_error() {
        let record = Record::new("t", None, row(&["id"], vec![Value::Integer(1)]));
        assert!(matches!(record.id(), Err(OrmError::Configuration(_))));
    }

    #[test]
    fn missing_key_value_is_configuration_error() {
        let record = Record::new("t", Some("id"), row(&["name"], vec!["a".into()]));
        assert!(matches!(record.id(), Err(OrmError::Configuration(_))));

        let record = Record::new("t", Some("id"), row(&["id"], vec![Value::Null]));
        assert!(matches!(record.id(), Err(OrmError::Configuration(_))));
    }

    #[test]
    fn set_and_get() {
        let mut record = Record::new("t", Some("id"), row(&["id", "n"], vec![1.into(), 2.into()]));
        record.set("n", 5);
        assert_eq!(record.get::<i64>("n").unwrap(), 5);
        assert_eq!(record.id().unwrap(), ("id", &Value::Integer(1)));
    }
}
