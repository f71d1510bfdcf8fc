//! Resource models: users, buddy-reads, buddy-read stats and posts.
//!
//! Each model composes its statements around the clause builders in
//! [`crate::sql`]: updates go through [`sql_for_partial_update_checked`] with
//! the model's column map and updatable-field list, list queries through
//! [`sql_for_filter_with`] with the model's filter key table.
//!
//! All functions take any [`GenericClient`], so they run equally on a plain
//! connection, a pooled one or inside a transaction.

pub mod buddyread;
pub mod buddyreadstat;
pub mod post;
pub mod user;

pub use buddyread::{BuddyRead, BuddyReadDetail, BuddyReadPatch, NewBuddyRead};
pub use buddyreadstat::{BuddyReadStat, BuddyReadStatPatch, NewBuddyReadStat};
pub use post::{NewPost, Post, PostDetail, PostPatch};
pub use user::{NewUser, User, UserPatch, UserSummary};

use crate::client::GenericClient;
use crate::error::Result;
use crate::row::FromRow;
use crate::sql::{
    ColumnMap, FieldMap, FilterCriteria, FilterKey, params_ref, sql_for_filter_with,
    sql_for_partial_update_checked,
};
use crate::value::SqlValue;
use serde::{Deserialize, Deserializer};

/// Compose `UPDATE <table> SET ... WHERE <keys> RETURNING <returning>`.
///
/// Key predicates are numbered after the SET placeholders, in `keys` order,
/// and their values are appended after the field values.
pub(crate) fn update_statement(
    table: &str,
    fields: &FieldMap,
    columns: &ColumnMap,
    updatable: &[&str],
    keys: &[(&str, SqlValue)],
    returning: &str,
) -> Result<(String, Vec<SqlValue>)> {
    let set = sql_for_partial_update_checked(fields, columns, updatable)?;
    let (set_cols, mut values) = set.into_parts();

    let mut predicates = Vec::with_capacity(keys.len());
    for (column, value) in keys {
        values.push(value.clone());
        predicates.push(format!("{column} = ${}", values.len()));
    }

    let sql = format!(
        "UPDATE {table} SET {set_cols} WHERE {} RETURNING {returning}",
        predicates.join(" AND ")
    );
    Ok((sql, values))
}

/// Compose `<select> [WHERE <filter>] ORDER BY <order_by>`.
///
/// `None` lists everything; `Some` with no keys at all is rejected by the
/// filter builder.
pub(crate) fn select_statement(
    select: &str,
    filter: Option<&FilterCriteria>,
    keys: &[FilterKey],
    order_by: &str,
) -> Result<(String, Vec<SqlValue>)> {
    let mut sql = select.to_string();
    let mut values = Vec::new();

    if let Some(criteria) = filter {
        let clause = sql_for_filter_with(criteria, keys)?;
        if !clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause.sql);
            values = clause.values;
        }
    }

    sql.push_str(" ORDER BY ");
    sql.push_str(order_by);
    Ok((sql, values))
}

pub(crate) async fn fetch_all<T: FromRow>(
    conn: &impl GenericClient,
    sql: &str,
    values: &[SqlValue],
) -> Result<Vec<T>> {
    let rows = conn.query(sql, &params_ref(values)).await?;
    rows.iter().map(T::from_row).collect()
}

pub(crate) async fn fetch_opt<T: FromRow>(
    conn: &impl GenericClient,
    sql: &str,
    values: &[SqlValue],
) -> Result<Option<T>> {
    let row = conn.query_opt(sql, &params_ref(values)).await?;
    row.as_ref().map(T::from_row).transpose()
}

/// Distinguish "absent" from "explicitly null" for nullable patch fields.
pub(crate) fn double_option<'de, D, T>(d: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::BUDDYREAD_FILTER_KEYS;

    #[test]
    fn update_statement_appends_key_after_set() {
        let fields = FieldMap::new().with("status", "accepted");
        let (sql, values) = update_statement(
            "buddyreads",
            &fields,
            &ColumnMap::EMPTY,
            &["status"],
            &[("id", SqlValue::Int(1))],
            "id",
        )
        .unwrap();
        assert_eq!(
            sql,
            r#"UPDATE buddyreads SET "status"=$1 WHERE id = $2 RETURNING id"#
        );
        assert_eq!(values, vec![SqlValue::from("accepted"), SqlValue::Int(1)]);
    }

    #[test]
    fn update_statement_composite_key() {
        let fields = FieldMap::new().with("progress", 40).with("rating", 5);
        let (sql, values) = update_statement(
            "buddyreadstats",
            &fields,
            &ColumnMap::EMPTY,
            &["progress", "rating"],
            &[("buddyread_id", SqlValue::Int(1)), ("user_id", SqlValue::Int(2))],
            "progress",
        )
        .unwrap();
        assert_eq!(
            sql,
            r#"UPDATE buddyreadstats SET "progress"=$1, "rating"=$2 WHERE buddyread_id = $3 AND user_id = $4 RETURNING progress"#
        );
        assert_eq!(values.len(), 4);
        assert_eq!(values[2], SqlValue::Int(1));
        assert_eq!(values[3], SqlValue::Int(2));
    }

    #[test]
    fn update_statement_rejects_identity_field() {
        let fields = FieldMap::new().with("id", 5);
        let err = update_statement(
            "buddyreads",
            &fields,
            &ColumnMap::EMPTY,
            &["status"],
            &[("id", SqlValue::Int(1))],
            "id",
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn select_statement_without_filter() {
        let (sql, values) =
            select_statement("SELECT id FROM buddyreads", None, BUDDYREAD_FILTER_KEYS, "id")
                .unwrap();
        assert_eq!(sql, "SELECT id FROM buddyreads ORDER BY id");
        assert!(values.is_empty());
    }

    #[test]
    fn select_statement_with_filter() {
        let criteria = FilterCriteria::new().with("createdBy", "1").with("buddy", "2");
        let (sql, values) = select_statement(
            "SELECT id FROM buddyreads",
            Some(&criteria),
            BUDDYREAD_FILTER_KEYS,
            "id",
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT id FROM buddyreads WHERE buddy=$1 AND created_by=$2 ORDER BY id"
        );
        assert_eq!(values, vec![SqlValue::Int(2), SqlValue::Int(1)]);
    }

    #[test]
    fn select_statement_unrecognized_filter_lists_all() {
        let criteria = FilterCriteria::new().with("page", "3");
        let (sql, values) = select_statement(
            "SELECT id FROM buddyreads",
            Some(&criteria),
            BUDDYREAD_FILTER_KEYS,
            "id",
        )
        .unwrap();
        assert_eq!(sql, "SELECT id FROM buddyreads ORDER BY id");
        assert!(values.is_empty());
    }

    #[test]
    fn select_statement_empty_filter_is_invalid() {
        let err = select_statement(
            "SELECT id FROM buddyreads",
            Some(&FilterCriteria::new()),
            BUDDYREAD_FILTER_KEYS,
            "id",
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
