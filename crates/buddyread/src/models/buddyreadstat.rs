//! Per-participant reading progress and rating, keyed by
//! `(buddyread_id, user_id)`.

use super::{double_option, fetch_all, fetch_opt, update_statement};
use crate::client::GenericClient;
use crate::error::{Error, Result};
use crate::row::{FromRow, RowExt};
use crate::sql::{ColumnMap, FieldMap, params_ref};
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub const COLUMNS: ColumnMap =
    ColumnMap::new(&[("buddyreadId", "buddyread_id"), ("userId", "user_id")]);

pub const UPDATABLE: &[&str] = &["progress", "rating"];

const RETURNING: &str = r#"buddyread_id AS "buddyreadId",
    user_id AS "userId",
    progress,
    rating"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuddyReadStat {
    pub buddyread_id: i32,
    pub user_id: i32,
    pub progress: i32,
    pub rating: Option<i32>,
}

impl FromRow for BuddyReadStat {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            buddyread_id: row.try_get_column("buddyreadId")?,
            user_id: row.try_get_column("userId")?,
            progress: row.try_get_column("progress")?,
            rating: row.try_get_column("rating")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewBuddyReadStat {
    pub buddyread_id: i32,
    pub user_id: i32,
    #[serde(default)]
    pub progress: i32,
    #[serde(default)]
    pub rating: Option<i32>,
}

/// `rating: null` clears the rating; an absent `rating` leaves it alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuddyReadStatPatch {
    pub progress: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub rating: Option<Option<i32>>,
}

impl BuddyReadStatPatch {
    pub fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.set_opt("progress", self.progress);
        if let Some(rating) = self.rating {
            fields.set("rating", rating);
        }
        fields
    }
}

fn missing(buddyread_id: i32, user_id: i32) -> Error {
    Error::not_found(format!(
        "No buddyreadstat for buddyread: {buddyread_id} and user: {user_id}"
    ))
}

pub async fn create(conn: &impl GenericClient, new: &NewBuddyReadStat) -> Result<BuddyReadStat> {
    let sql = format!(
        "INSERT INTO buddyreadstats (buddyread_id, user_id, progress, rating)
         VALUES ($1, $2, $3, $4)
         RETURNING {RETURNING}"
    );
    let row = conn
        .query_one(
            &sql,
            &[&new.buddyread_id, &new.user_id, &new.progress, &new.rating],
        )
        .await?;
    BuddyReadStat::from_row(&row)
}

pub async fn find_all(conn: &impl GenericClient) -> Result<Vec<BuddyReadStat>> {
    let sql = format!("SELECT {RETURNING} FROM buddyreadstats ORDER BY buddyread_id, user_id");
    fetch_all(conn, &sql, &[]).await
}

pub async fn get(conn: &impl GenericClient, buddyread_id: i32, user_id: i32) -> Result<BuddyReadStat> {
    let sql = format!(
        "SELECT {RETURNING} FROM buddyreadstats WHERE buddyread_id = $1 AND user_id = $2"
    );
    fetch_opt(conn, &sql, &[buddyread_id.into(), user_id.into()])
        .await?
        .ok_or_else(|| missing(buddyread_id, user_id))
}

pub async fn update(
    conn: &impl GenericClient,
    buddyread_id: i32,
    user_id: i32,
    patch: &BuddyReadStatPatch,
) -> Result<BuddyReadStat> {
    update_fields(conn, buddyread_id, user_id, &patch.to_fields()).await
}

/// Partial update; the two key predicates follow the SET placeholders.
pub async fn update_fields(
    conn: &impl GenericClient,
    buddyread_id: i32,
    user_id: i32,
    fields: &FieldMap,
) -> Result<BuddyReadStat> {
    let (sql, values) = update_statement(
        "buddyreadstats",
        fields,
        &COLUMNS,
        UPDATABLE,
        &[
            ("buddyread_id", SqlValue::from(buddyread_id)),
            ("user_id", SqlValue::from(user_id)),
        ],
        RETURNING,
    )?;
    fetch_opt(conn, &sql, &values)
        .await?
        .ok_or_else(|| missing(buddyread_id, user_id))
}

pub async fn remove(conn: &impl GenericClient, buddyread_id: i32, user_id: i32) -> Result<()> {
    let values = [SqlValue::from(buddyread_id), SqlValue::from(user_id)];
    let row = conn
        .query_opt(
            "DELETE FROM buddyreadstats WHERE buddyread_id = $1 AND user_id = $2 RETURNING user_id",
            &params_ref(&values),
        )
        .await?;
    row.map(|_| ()).ok_or_else(|| missing(buddyread_id, user_id))
}
