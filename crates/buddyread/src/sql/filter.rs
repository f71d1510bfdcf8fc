//! `WHERE` equality-conjunction builder.

use super::Clause;
use crate::error::{Error, Result};
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a filter value is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Coerced to an integer before binding (`"2"` binds as `2`).
    Numeric,
    /// Bound as supplied.
    Text,
}

/// One recognized filter key and the predicate it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterKey {
    pub key: &'static str,
    pub column: &'static str,
    pub kind: FilterKind,
}

impl FilterKey {
    pub const fn numeric(key: &'static str, column: &'static str) -> Self {
        Self {
            key,
            column,
            kind: FilterKind::Numeric,
        }
    }

    pub const fn text(key: &'static str, column: &'static str) -> Self {
        Self {
            key,
            column,
            kind: FilterKind::Text,
        }
    }
}

/// Keys understood by [`sql_for_filter`], in predicate order.
pub const DEFAULT_FILTER_KEYS: &[FilterKey] = &[
    FilterKey::numeric("buddy", "buddy"),
    FilterKey::numeric("createdBy", "created_by"),
    FilterKey::text("email", "email"),
];

pub const BUDDYREAD_FILTER_KEYS: &[FilterKey] = &[
    FilterKey::numeric("buddy", "buddy"),
    FilterKey::numeric("createdBy", "created_by"),
];

pub const USER_FILTER_KEYS: &[FilterKey] = &[FilterKey::text("email", "email")];

pub const POST_FILTER_KEYS: &[FilterKey] = &[
    FilterKey::numeric("buddyreadId", "buddyread_id"),
    FilterKey::numeric("userId", "user_id"),
];

/// Sparse filter input, typically the parsed query string of a list request.
///
/// Any key may be present; only the keys of the table passed to the builder
/// turn into predicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterCriteria(pub Map<String, Value>);

impl FilterCriteria {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Chainable insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FilterCriteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// `null`, `false`, `0` and `""` count as "not supplied".
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn coerce_numeric(key: &str, value: &Value) -> Result<SqlValue> {
    let not_numeric = || Error::invalid_argument(format!("{key} must be numeric"));

    let n = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        _ => None,
    };
    n.map(SqlValue::Int).ok_or_else(not_numeric)
}

fn whole(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

/// Build a `WHERE` conjunction from [`DEFAULT_FILTER_KEYS`].
///
/// See [`sql_for_filter_with`].
pub fn sql_for_filter(criteria: &FilterCriteria) -> Result<Clause> {
    sql_for_filter_with(criteria, DEFAULT_FILTER_KEYS)
}

/// Build a `WHERE` conjunction from a call-site key table.
///
/// Predicates follow the order of `keys`, not of `criteria`, and are joined
/// with `" AND "`. Unrecognized keys are ignored, so the result may be empty;
/// treat an empty clause as "no WHERE". Fails with
/// [`Error::InvalidArgument`] when `criteria` has no keys at all, or when a
/// numeric key cannot be coerced.
pub fn sql_for_filter_with(criteria: &FilterCriteria, keys: &[FilterKey]) -> Result<Clause> {
    if criteria.is_empty() {
        return Err(Error::invalid_argument("No filtering criteria"));
    }

    let mut predicates = Vec::new();
    let mut values = Vec::new();

    for fk in keys {
        let Some(value) = criteria.get(fk.key).filter(|v| is_set(v)) else {
            continue;
        };
        let bound = match fk.kind {
            FilterKind::Numeric => coerce_numeric(fk.key, value)?,
            FilterKind::Text => SqlValue::from_json(value)?,
        };
        values.push(bound);
        predicates.push(format!("{}=${}", fk.column, values.len()));
    }

    Ok(Clause {
        sql: predicates.join(" AND "),
        values,
    })
}
