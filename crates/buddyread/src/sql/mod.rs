//! Clause builders for partial updates and equality filters.
//!
//! Both builders turn a sparse set of caller-supplied fields into a SQL
//! fragment with `$1, $2, ...` placeholders and a matching list of values.
//! Values are never interpolated into the text; only column names from
//! static, compile-time tables are.
//!
//! The fragment never includes the `SET`/`WHERE` keyword. The caller wraps it
//! into a full statement and appends its own predicates starting at
//! [`Clause::next_index`].
//!
//! # Example
//!
//! ```
//! use buddyread::sql::{ColumnMap, FieldMap, sql_for_partial_update};
//!
//! const COLUMNS: ColumnMap = ColumnMap::new(&[("firstName", "first_name")]);
//!
//! let fields = FieldMap::new().with("firstName", "Aliya").with("age", 32);
//! let set = sql_for_partial_update(&fields, &COLUMNS)?;
//!
//! assert_eq!(set.sql, r#""first_name"=$1, "age"=$2"#);
//! let sql = format!("UPDATE users SET {} WHERE id = ${}", set.sql, set.next_index());
//! assert_eq!(sql, r#"UPDATE users SET "first_name"=$1, "age"=$2 WHERE id = $3"#);
//! # Ok::<(), buddyread::Error>(())
//! ```

mod filter;
mod update;


pub use filter::{
    BUDDYREAD_FILTER_KEYS, DEFAULT_FILTER_KEYS, FilterCriteria, FilterKey, FilterKind,
    POST_FILTER_KEYS, USER_FILTER_KEYS, sql_for_filter, sql_for_filter_with,
};
pub use update::{ColumnMap, FieldMap, sql_for_partial_update, sql_for_partial_update_checked};

use crate::value::SqlValue;
use serde::Serialize;
use tokio_postgres::types::ToSql;

/// A rendered SQL fragment plus the values for its placeholders.
///
/// `values[i]` binds to `$<i + 1>` in `sql`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Clause {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

impl Clause {
    /// `true` when no predicate/assignment was produced.
    ///
    /// An empty filter clause means "no WHERE at all".
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Placeholder index for the first parameter the caller appends.
    pub fn next_index(&self) -> usize {
        self.values.len() + 1
    }

    /// Split into text and values, for callers that append more parameters.
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.values)
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        params_ref(&self.values)
    }
}

/// Borrow a value list as `tokio-postgres` parameters.
pub fn params_ref(values: &[SqlValue]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}
