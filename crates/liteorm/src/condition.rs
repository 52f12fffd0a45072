//! Condition mappings and the WHERE/HAVING compiler.
//!
//! A [`Conditions`] value maps column names to a [`WhereValue`], which is either a
//! plain scalar (equality) or an [`OpBag`] holding several operators on the same
//! column. Entries are AND-combined. [`compile`] turns a mapping into a SQL fragment
//! with `?` placeholders and appends the bound values to a [`ParamList`] in exactly
//! the order the placeholders appear.
//!
//! Both calling conventions converge here: `where_cmp("age", ">", 18)` goes through
//! [`normalize`] and produces the same one-key mapping as
//! `Conditions::new().with("age", OpBag::new().gt(18))`.
//!
//! # Example
//! ```
//! use liteorm::{compile_conditions, Conditions, OpBag, Value};
//!
//! let conds = Conditions::new()
//!     .with("status", "active")
//!     .with("age", OpBag::new().gte(10).lt(20));
//! let (sql, params) = compile_conditions(&conds)?;
//! assert_eq!(sql, r#""status" = ? AND "age" >= ? AND "age" < ?"#);
//! assert_eq!(params, vec![Value::from("active"), Value::from(10), Value::from(20)]);
//! # Ok::<(), liteorm::OrmError>(())
//! ```

use crate::error::OrmResult;
use crate::ident;
use crate::qb::ParamList;
use crate::value::Value;

/// Fragment emitted for `IN` with an empty list: never matches.
const ALWAYS_FALSE: &str = "1=0";
/// Fragment emitted for `NOT IN` with an empty list: always matches.
const ALWAYS_TRUE: &str = "1=1";

/// A single query operator with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Equal: column = value
    Eq(Value),
    /// Not equal: column != value
    Ne(Value),
    /// Greater than: column > value
    Gt(Value),
    /// Greater than or equal: column >= value
    Gte(Value),
    /// Less than: column < value
    Lt(Value),
    /// Less than or equal: column <= value
    Lte(Value),
    /// LIKE pattern match
    Like(Value),
    /// NOT LIKE pattern match
    NotLike(Value),
    /// IN (list)
    In(Vec<Value>),
    /// NOT IN (list)
    NotIn(Vec<Value>),
    /// BETWEEN a AND b
    Between(Value, Value),
    /// IS NULL (`true`) or IS NOT NULL (`false`)
    IsNull(bool),
}

/// Several operators constraining one column, AND-combined.
///
/// Each operator occupies one slot; setting the same operator twice keeps the last
/// payload. Slots render in a fixed order (eq, ne, gt, gte, lt, lte, like, not_like,
/// in, not_in, between, is_null) regardless of the order they were set in.
///
/// ```
/// use liteorm::OpBag;
///
/// let price_band = OpBag::new().gte(10).lt(20);
/// let not_deleted = OpBag::new().is_null(true);
/// # let _ = (price_band, not_deleted);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpBag {
    eq: Option<Value>,
    ne: Option<Value>,
    gt: Option<Value>,
    gte: Option<Value>,
    lt: Option<Value>,
    lte: Option<Value>,
    like: Option<Value>,
    not_like: Option<Value>,
    in_list: Option<Vec<Value>>,
    not_in: Option<Vec<Value>>,
    between: Option<(Value, Value)>,
    is_null: Option<bool>,
}

impl OpBag {
    /// Create an empty bag. An empty bag contributes nothing when compiled.
    pub fn new() -> Self {
        Self::default()
    }

    /// column = value
    pub fn eq(mut self, value: impl Into<Value>) -> Self {
        self.eq = Some(value.into());
        self
    }

    /// column != value
    pub fn ne(mut self, value: impl Into<Value>) -> Self {
        self.ne = Some(value.into());
        self
    }

    /// column > value
    pub fn gt(mut self, value: impl Into<Value>) -> Self {
        self.gt = Some(value.into());
        self
    }

    /// column >= value
    pub fn gte(mut self, value: impl Into<Value>) -> Self {
        self.gte = Some(value.into());
        self
    }

    /// column < value
    pub fn lt(mut self, value: impl Into<Value>) -> Self {
        self.lt = Some(value.into());
        self
    }

    /// column <= value
    pub fn lte(mut self, value: impl Into<Value>) -> Self {
        self.lte = Some(value.into());
        self
    }

    /// column LIKE pattern
    pub fn like(mut self, pattern: impl Into<String>) -> Self {
        self.like = Some(Value::Text(pattern.into()));
        self
    }

    /// column NOT LIKE pattern
    pub fn not_like(mut self, pattern: impl Into<String>) -> Self {
        self.not_like = Some(Value::Text(pattern.into()));
        self
    }

    /// column IN (values...). An empty list never matches.
    pub fn in_list<T: Into<Value>>(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.in_list = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// column NOT IN (values...). An empty list always matches.
    pub fn not_in<T: Into<Value>>(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.not_in = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// column BETWEEN low AND high
    pub fn between(mut self, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.between = Some((low.into(), high.into()));
        self
    }

    /// column IS NULL (`true`) / IS NOT NULL (`false`)
    pub fn is_null(mut self, is_null: bool) -> Self {
        self.is_null = Some(is_null);
        self
    }

    /// Put a single operator into its slot, replacing any previous payload.
    pub fn with(mut self, op: Op) -> Self {
        match op {
            Op::Eq(v) => self.eq = Some(v),
            Op::Ne(v) => self.ne = Some(v),
            Op::Gt(v) => self.gt = Some(v),
            Op::Gte(v) => self.gte = Some(v),
            Op::Lt(v) => self.lt = Some(v),
            Op::Lte(v) => self.lte = Some(v),
            Op::Like(v) => self.like = Some(v),
            Op::NotLike(v) => self.not_like = Some(v),
            Op::In(vs) => self.in_list = Some(vs),
            Op::NotIn(vs) => self.not_in = Some(vs),
            Op::Between(lo, hi) => self.between = Some((lo, hi)),
            Op::IsNull(b) => self.is_null = Some(b),
        }
        self
    }

    /// Whether no operator slot is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Compile this bag for `column`. Returns an empty string for an empty bag.
    fn build(&self, column: &str, params: &mut ParamList) -> String {
        let mut parts: Vec<String> = Vec::new();

        let comparisons = [
            (&self.eq, "="),
            (&self.ne, "!="),
            (&self.gt, ">"),
            (&self.gte, ">="),
            (&self.lt, "<"),
            (&self.lte, "<="),
            (&self.like, "LIKE"),
            (&self.not_like, "NOT LIKE"),
        ];
        for (slot, op) in comparisons {
            if let Some(value) = slot {
                params.push(value.clone());
                parts.push(format!("{column} {op} ?"));
            }
        }

        for (slot, op, empty) in [
            (&self.in_list, "IN", ALWAYS_FALSE),
            (&self.not_in, "NOT IN", ALWAYS_TRUE),
        ] {
            let Some(values) = slot else {
                continue;
            };
            if values.is_empty() {
                parts.push(empty.to_string());
                continue;
            }
            let placeholders = vec!["?"; values.len()].join(", ");
            for v in values {
                params.push(v.clone());
            }
            parts.push(format!("{column} {op} ({placeholders})"));
        }

        if let Some((low, high)) = &self.between {
            params.push(low.clone());
            params.push(high.clone());
            parts.push(format!("{column} BETWEEN ? AND ?"));
        }

        match self.is_null {
            Some(true) => parts.push(format!("{column} IS NULL")),
            Some(false) => parts.push(format!("{column} IS NOT NULL")),
            None => {}
        }

        parts.join(" AND ")
    }
}

impl From<Op> for OpBag {
    fn from(op: Op) -> Self {
        OpBag::new().with(op)
    }
}

/// Map a comparison symbol and value onto a single-operator bag.
///
/// Recognized symbols: `=`, `!=`, `<>`, `>`, `<`, `>=`, `<=`, `LIKE`, `NOT LIKE`
/// (keywords are case-insensitive). Any other symbol falls back to equality.
pub fn normalize(symbol: &str, value: impl Into<Value>) -> OpBag {
    let value = value.into();
    let symbol = symbol
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();

    let op = match symbol.as_str() {
        "=" => Op::Eq(value),
        "!=" | "<>" => Op::Ne(value),
        ">" => Op::Gt(value),
        ">=" => Op::Gte(value),
        "<" => Op::Lt(value),
        "<=" => Op::Lte(value),
        "LIKE" => Op::Like(value),
        "NOT LIKE" => Op::NotLike(value),
        other => {
            tracing::debug!(
                target: "liteorm.condition",
                symbol = other,
                "unknown comparison symbol, using '='"
            );
            Op::Eq(value)
        }
    };
    OpBag::from(op)
}

/// The value side of one condition entry: a scalar (equality) or an operator bag.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereValue {
    /// `column = ?`
    Scalar(Value),
    /// Every set operator in the bag, AND-combined.
    Ops(OpBag),
}

impl From<OpBag> for WhereValue {
    fn from(bag: OpBag) -> Self {
        WhereValue::Ops(bag)
    }
}

impl From<Op> for WhereValue {
    fn from(op: Op) -> Self {
        WhereValue::Ops(OpBag::from(op))
    }
}

impl From<Value> for WhereValue {
    fn from(value: Value) -> Self {
        WhereValue::Scalar(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for WhereValue {
    fn from(value: Option<T>) -> Self {
        WhereValue::Scalar(value.into())
    }
}

macro_rules! impl_where_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for WhereValue {
                fn from(v: $t) -> Self {
                    WhereValue::Scalar(Value::from(v))
                }
            }
        )*
    };
}

impl_where_scalar!(
    i8, i16, i32, i64, u8, u16, u32, bool, f32, f64, String, &str, &String, Vec<u8>, &Value
);

/// An ordered column → [`WhereValue`] mapping whose entries are AND-combined.
///
/// Inserting a column that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    entries: Vec<(String, WhereValue)>,
}

impl Conditions {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a column constraint (consuming builder).
    pub fn with(mut self, column: impl Into<String>, value: impl Into<WhereValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Add or replace a column constraint.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<WhereValue>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    /// Merge another mapping into this one; its entries win on conflicting columns.
    pub fn merge(&mut self, other: Conditions) {
        for (column, value) in other.entries {
            self.insert(column, value);
        }
    }

    /// Look up the constraint for a column.
    pub fn get(&self, column: &str) -> Option<&WhereValue> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WhereValue)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<WhereValue>> FromIterator<(K, V)> for Conditions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut conditions = Conditions::new();
        for (column, value) in iter {
            conditions.insert(column, value);
        }
        conditions
    }
}

impl<K: Into<String>, V: Into<WhereValue>, const N: usize> From<[(K, V); N]> for Conditions {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Compile a mapping into an AND-joined fragment, appending bound values to `params`.
///
/// Returns an empty string when nothing constrains the query; callers must then omit
/// the owning keyword (`WHERE`, `HAVING`) entirely.
pub fn compile(conditions: &Conditions, params: &mut ParamList) -> OrmResult<String> {
    let mut parts = Vec::with_capacity(conditions.len());

    for (column, value) in conditions.iter() {
        let column = ident::quote(column)?;
        match value {
            WhereValue::Scalar(v) => {
                params.push(v.clone());
                parts.push(format!("{column} = ?"));
            }
            WhereValue::Ops(bag) => {
                let fragment = bag.build(&column, params);
                if !fragment.is_empty() {
                    parts.push(fragment);
                }
            }
        }
    }

    Ok(parts.join(" AND "))
}

/// Compile a mapping on its own, returning the fragment and its parameters.
pub fn compile_conditions(conditions: &Conditions) -> OrmResult<(String, Vec<Value>)> {
    let mut params = ParamList::new();
    let sql = compile(conditions, &mut params)?;
    Ok((sql, params.into_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled(conds: &Conditions) -> (String, Vec<Value>) {
        compile_conditions(conds).unwrap()
    }

    #[test]
    fn empty_mapping_compiles_to_empty_fragment() {
        let (sql, params) = compiled(&Conditions::new());
        assert_eq!(sql, "");
        assert!(params.is_empty());
    }

    #[test]
    fn scalar_is_equality() {
        let (sql, params) = compiled(&Conditions::new().with("status", "active"));
        assert_eq!(sql, r#""status" = ?"#);
        assert_eq!(params, vec![Value::from("active")]);
    }

    #[test]
    fn columns_are_and_joined_in_insertion_order() {
        let conds = Conditions::new().with("b", 2).with("a", 1);
        let (sql, params) = compiled(&conds);
        assert_eq!(sql, r#""b" = ? AND "a" = ?"#);
        assert_eq!(params, vec![Value::from(2), Value::from(1)]);
    }

    #[test]
    fn bag_renders_in_fixed_order() {
        let conds = Conditions::new().with("age", OpBag::new().lt(20).gte(10));
        let (sql, params) = compiled(&conds);
        assert_eq!(sql, r#""age" >= ? AND "age" < ?"#);
        assert_eq!(params, vec![Value::from(10), Value::from(20)]);
    }

    #[test]
    fn every_operator() {
        let cases: Vec<(OpBag, &str, usize)> = vec![
            (OpBag::new().eq(1), r#""c" = ?"#, 1),
            (OpBag::new().ne(1), r#""c" != ?"#, 1),
            (OpBag::new().gt(1), r#""c" > ?"#, 1),
            (OpBag::new().gte(1), r#""c" >= ?"#, 1),
            (OpBag::new().lt(1), r#""c" < ?"#, 1),
            (OpBag::new().lte(1), r#""c" <= ?"#, 1),
            (OpBag::new().like("a%"), r#""c" LIKE ?"#, 1),
            (OpBag::new().not_like("a%"), r#""c" NOT LIKE ?"#, 1),
            (OpBag::new().in_list([1, 2, 3]), r#""c" IN (?, ?, ?)"#, 3),
            (OpBag::new().not_in([1, 2]), r#""c" NOT IN (?, ?)"#, 2),
            (OpBag::new().between(1, 9), r#""c" BETWEEN ? AND ?"#, 2),
            (OpBag::new().is_null(true), r#""c" IS NULL"#, 0),
            (OpBag::new().is_null(false), r#""c" IS NOT NULL"#, 0),
        ];
        for (bag, expected, n) in cases {
            let (sql, params) = compiled(&Conditions::new().with("c", bag));
            assert_eq!(sql, expected);
            assert_eq!(params.len(), n, "param count for {expected}");
        }
    }

    #[test]
    fn empty_in_lists_short_circuit() {
        let conds = Conditions::new()
            .with("a", OpBag::new().in_list(Vec::<i64>::new()))
            .with("b", OpBag::new().not_in(Vec::<i64>::new()));
        let (sql, params) = compiled(&conds);
        assert_eq!(sql, "1=0 AND 1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn empty_bag_is_dropped() {
        let conds = Conditions::new()
            .with("a", OpBag::new())
            .with("b", 2);
        let (sql, params) = compiled(&conds);
        assert_eq!(sql, r#""b" = ?"#);
        assert_eq!(params, vec![Value::from(2)]);
    }

    #[test]
    fn repeated_column_replaces_in_place() {
        let mut conds = Conditions::new().with("a", 1).with("b", 2);
        conds.insert("a", 3);
        let (sql, params) = compiled(&conds);
        assert_eq!(sql, r#""a" = ? AND "b" = ?"#);
        assert_eq!(params, vec![Value::from(3), Value::from(2)]);
    }

    #[test]
    fn normalize_maps_symbols() {
        assert_eq!(normalize("=", 1), OpBag::new().eq(1));
        assert_eq!(normalize("!=", 1), OpBag::new().ne(1));
        assert_eq!(normalize("<>", 1), OpBag::new().ne(1));
        assert_eq!(normalize(">", 1), OpBag::new().gt(1));
        assert_eq!(normalize(">=", 1), OpBag::new().gte(1));
        assert_eq!(normalize("<", 1), OpBag::new().lt(1));
        assert_eq!(normalize("<=", 1), OpBag::new().lte(1));
        assert_eq!(normalize("like", "a%"), OpBag::new().like("a%"));
        assert_eq!(normalize("NOT  LIKE", "a%"), OpBag::new().not_like("a%"));
    }

    #[test]
    fn normalize_unknown_symbol_falls_back_to_eq() {
        assert_eq!(normalize("~=", 5), OpBag::new().eq(5));
    }

    #[test]
    fn triple_and_mapping_compile_identically() {
        let from_triple = Conditions::new().with("age", normalize(">", 18));
        let from_mapping = Conditions::new().with("age", OpBag::new().gt(18));
        assert_eq!(compiled(&from_triple), compiled(&from_mapping));

        let eq_triple = Conditions::new().with("name", normalize("=", "bob"));
        let eq_mapping = Conditions::new().with("name", "bob");
        assert_eq!(compiled(&eq_triple), compiled(&eq_mapping));
    }

    #[test]
    fn invalid_column_is_a_render_error() {
        let conds = Conditions::new().with("", 1);
        assert!(matches!(
            compile_conditions(&conds),
            Err(crate::OrmError::Render(_))
        ));
    }

    #[test]
    fn from_array_and_iterator() {
        let a = Conditions::from([("x", 1), ("y", 2)]);
        let b: Conditions = vec![("x", 1), ("y", 2)].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.get("y"), Some(&WhereValue::Scalar(Value::from(2))));
    }
}
