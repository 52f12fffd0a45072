//! Row mapping traits and utilities

use crate::error::{OrmError, OrmResult};
use crate::value::{self, FromValue, Value};
use std::sync::Arc;

/// An owned result row: column names plus one [`Value`] per column.
///
/// Rows fetched by the same statement share their column-name list.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Column names, in result order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Raw value of a column, if present.
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.index_of(column).map(|i| &self.values[i])
    }

    /// Raw value at a column index, if present.
    pub fn value_at(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Typed value of a column, returning [`OrmError::Decode`] on failure.
    pub fn get<T: FromValue>(&self, column: &str) -> OrmResult<T> {
        let value = self
            .value(column)
            .ok_or_else(|| OrmError::decode(column, "no such column"))?;
        value::decode(column, value)
    }

    /// Typed value at a column index.
    pub fn get_at<T: FromValue>(&self, idx: usize) -> OrmResult<T> {
        let column = self.columns.get(idx).map(String::as_str).unwrap_or("?");
        let value = self
            .values
            .get(idx)
            .ok_or_else(|| OrmError::decode(column, format!("column index {idx} out of range")))?;
        value::decode(column, value)
    }

    /// Overwrite a column, appending it if the row has no such column.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.index_of(column) {
            Some(i) => self.values[i] = value,
            None => {
                let mut columns = self.columns.to_vec();
                columns.push(column.to_string());
                self.columns = columns.into();
                self.values.push(value);
            }
        }
    }

    /// Iterate `(column, value)` pairs in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Convert into a JSON object keyed by column name.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .iter()
            .map(|(c, v)| (c.to_string(), v.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }

    /// Copy every column into a write payload.
    pub fn to_data(&self) -> Data {
        self.iter().map(|(c, v)| (c, v.clone())).collect()
    }
}

impl From<Data> for Row {
    fn from(data: Data) -> Self {
        let (columns, values): (Vec<String>, Vec<Value>) = data.entries.into_iter().unzip();
        Row::new(columns.into(), values)
    }
}

/// Trait for converting a database row into a Rust struct.
///
/// # Example
///
/// ```
/// use liteorm::{FromRow, OrmResult, Row};
///
/// struct User {
///     id: i64,
///     email: Option<String>,
/// }
///
/// impl FromRow for User {
///     fn from_row(row: &Row) -> OrmResult<Self> {
///         Ok(Self {
///             id: row.get("id")?,
///             email: row.get("email")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> OrmResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(row.clone())
    }
}

impl FromRow for serde_json::Value {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(row.to_json())
    }
}

/// Run a prepared statement and collect every row.
pub(crate) fn collect_rows(
    stmt: &mut rusqlite::Statement<'_>,
    params: &[Value],
) -> OrmResult<Vec<Row>> {
    let columns: Arc<[String]> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut rows = stmt
        .query(rusqlite::params_from_iter(params.iter()))
        .map_err(OrmError::from_db_error)?;

    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(OrmError::from_db_error)? {
        let values = (0..columns.len())
            .map(|i| row.get_ref(i).map(Value::from_value_ref))
            .collect::<Result<Vec<_>, _>>()?;
        out.push(Row::new(Arc::clone(&columns), values));
    }
    Ok(out)
}

/// Ordered column → value payload for INSERT and UPDATE.
///
/// Setting a column twice replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Data {
    entries: Vec<(String, Value)>,
}

impl Data {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value (consuming builder).
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let pos = self.entries.iter().position(|(c, _)| c == column)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Build a payload from any serializable struct or map.
    ///
    /// Nested arrays and objects are stored as JSON text. Field order follows
    /// `serde_json`'s object order.
    pub fn from_serialize<T: serde::Serialize + ?Sized>(value: &T) -> OrmResult<Self> {
        let json =
            serde_json::to_value(value).map_err(|e| OrmError::Serialization(e.to_string()))?;
        match json {
            serde_json::Value::Object(map) => Ok(map
                .iter()
                .map(|(k, v)| (k.as_str(), Value::from_json(v)))
                .collect()),
            other => Err(OrmError::Serialization(format!(
                "expected a struct or map, got {other}"
            ))),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Data {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Data::new();
        for (column, value) in iter {
            data.insert(column, value);
        }
        data
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Data {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}
