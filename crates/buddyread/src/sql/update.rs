//! `SET` list builder for partial updates.

use super::Clause;
use crate::error::{Error, Result};
use crate::ident;
use crate::value::SqlValue;
use std::fmt::Write;

/// Ordered `(logical name, new value)` pairs for a partial update.
///
/// Names are unique: setting a name twice replaces the earlier value in place,
/// so the placeholder order is the order in which names were first set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    fields: Vec<(String, SqlValue)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Chainable [`FieldMap::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set `name` to `value`, keeping the position of an existing entry.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    /// Set `name` only when `value` is present.
    pub fn set_opt<T: Into<SqlValue>>(&mut self, name: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.set(name, v);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: Into<String>,
    V: Into<SqlValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (k, v) in iter {
            map.set(k, v);
        }
        map
    }
}

/// Static logical-name → column-name table for one call site.
///
/// Names missing from the table are used verbatim as the column name.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap(&'static [(&'static str, &'static str)]);

impl ColumnMap {
    /// No renames: every logical name is its own column.
    pub const EMPTY: ColumnMap = ColumnMap(&[]);

    pub const fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Self(pairs)
    }

    /// Physical column for `logical`. An empty target counts as unmapped.
    pub fn column_for<'a>(&self, logical: &'a str) -> &'a str {
        self.0
            .iter()
            .find(|(from, _)| *from == logical)
            .map(|(_, to)| *to)
            .filter(|to| !to.is_empty())
            .unwrap_or(logical)
    }
}

/// Build the assignment list of an `UPDATE ... SET` statement.
///
/// Each field becomes `"<column>"=$<i>` in `fields` order, joined by `", "`.
/// Fails with [`Error::InvalidArgument`] when `fields` is empty.
///
/// Names are written into the SQL text, so they must come from a trusted,
/// static set (never straight from a request).
pub fn sql_for_partial_update(fields: &FieldMap, columns: &ColumnMap) -> Result<Clause> {
    if fields.is_empty() {
        return Err(Error::invalid_argument("No data"));
    }

    let mut sql = String::with_capacity(fields.len() * 16);
    let mut values = Vec::with_capacity(fields.len());

    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        ident::write_quoted(&mut sql, columns.column_for(name))?;
        let _ = write!(&mut sql, "=${}", i + 1);
        values.push(value.clone());
    }

    Ok(Clause { sql, values })
}

/// [`sql_for_partial_update`] restricted to an allow-list of logical names.
///
/// Any field outside `allowed` (an identifier column, say) is rejected with
/// [`Error::InvalidArgument`] before any SQL is produced.
pub fn sql_for_partial_update_checked(
    fields: &FieldMap,
    columns: &ColumnMap,
    allowed: &[&str],
) -> Result<Clause> {
    if let Some(name) = fields.names().find(|n| !allowed.contains(n)) {
        return Err(Error::invalid_argument(format!(
            "Field cannot be updated: {name}"
        )));
    }
    sql_for_partial_update(fields, columns)
}
