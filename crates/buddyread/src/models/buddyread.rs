//! Buddy-reads: two users reading one book together.

use super::user::{self, UserSummary};
use super::{fetch_all, fetch_opt, select_statement, update_statement};
use crate::client::GenericClient;
use crate::error::{Error, Result};
use crate::row::{FromRow, RowExt};
use crate::sql::{BUDDYREAD_FILTER_KEYS, ColumnMap, FieldMap, FilterCriteria, params_ref};
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub const COLUMNS: ColumnMap = ColumnMap::new(&[("bookId", "book_id"), ("createdBy", "created_by")]);

pub const UPDATABLE: &[&str] = &["status"];

const RETURNING: &str = r#"id,
    book_id AS "bookId",
    created_by AS "createdBy",
    buddy,
    status"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuddyRead {
    pub id: i32,
    pub book_id: String,
    pub created_by: i32,
    pub buddy: i32,
    pub status: String,
}

impl FromRow for BuddyRead {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            book_id: row.try_get_column("bookId")?,
            created_by: row.try_get_column("createdBy")?,
            buddy: row.try_get_column("buddy")?,
            status: row.try_get_column("status")?,
        })
    }
}

/// A buddy-read with both participants resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuddyReadDetail {
    pub id: i32,
    pub book_id: String,
    pub created_by: UserSummary,
    pub buddy: UserSummary,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewBuddyRead {
    pub book_id: String,
    pub created_by: i32,
    pub buddy: i32,
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuddyReadPatch {
    pub status: Option<String>,
}

impl BuddyReadPatch {
    pub fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.set_opt("status", self.status.clone());
        fields
    }
}

pub async fn create(conn: &impl GenericClient, new: &NewBuddyRead) -> Result<BuddyRead> {
    let sql = format!(
        "INSERT INTO buddyreads (book_id, created_by, buddy, status)
         VALUES ($1, $2, $3, $4)
         RETURNING {RETURNING}"
    );
    let row = conn
        .query_one(&sql, &[&new.book_id, &new.created_by, &new.buddy, &new.status])
        .await?;
    BuddyRead::from_row(&row)
}

/// All buddy-reads, optionally filtered by `buddy` and/or `createdBy`.
pub async fn find_all(
    conn: &impl GenericClient,
    filter: Option<&FilterCriteria>,
) -> Result<Vec<BuddyRead>> {
    let select = format!("SELECT {RETURNING} FROM buddyreads");
    let (sql, values) = select_statement(&select, filter, BUDDYREAD_FILTER_KEYS, "id")?;
    fetch_all(conn, &sql, &values).await
}

pub(crate) async fn get_plain(conn: &impl GenericClient, id: i32) -> Result<BuddyRead> {
    let sql = format!("SELECT {RETURNING} FROM buddyreads WHERE id = $1");
    fetch_opt(conn, &sql, &[SqlValue::from(id)])
        .await?
        .ok_or_else(|| Error::not_found(format!("No buddyread: {id}")))
}

/// One buddy-read with its creator and buddy.
pub async fn get(conn: &impl GenericClient, id: i32) -> Result<BuddyReadDetail> {
    let br = get_plain(conn, id).await?;
    let created_by = user::summary(conn, br.created_by).await?;
    let buddy = user::summary(conn, br.buddy).await?;

    Ok(BuddyReadDetail {
        id: br.id,
        book_id: br.book_id,
        created_by,
        buddy,
        status: br.status,
    })
}

pub async fn update(conn: &impl GenericClient, id: i32, patch: &BuddyReadPatch) -> Result<BuddyRead> {
    update_fields(conn, id, &patch.to_fields()).await
}

/// Partial update from a field map; only `status` may change.
pub async fn update_fields(
    conn: &impl GenericClient,
    id: i32,
    fields: &FieldMap,
) -> Result<BuddyRead> {
    let (sql, values) = update_statement(
        "buddyreads",
        fields,
        &COLUMNS,
        UPDATABLE,
        &[("id", SqlValue::from(id))],
        RETURNING,
    )?;
    fetch_opt(conn, &sql, &values)
        .await?
        .ok_or_else(|| Error::not_found(format!("No buddyread: {id}")))
}

pub async fn remove(conn: &impl GenericClient, id: i32) -> Result<()> {
    let values = [SqlValue::from(id)];
    let row = conn
        .query_opt("DELETE FROM buddyreads WHERE id = $1 RETURNING id", &params_ref(&values))
        .await?;
    row.map(|_| ())
        .ok_or_else(|| Error::not_found(format!("No buddyread: {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_update_statement() {
        let patch = BuddyReadPatch {
            status: Some("accepted".into()),
        };
        let (sql, values) = update_statement(
            "buddyreads",
            &patch.to_fields(),
            &COLUMNS,
            UPDATABLE,
            &[("id", SqlValue::Int(1))],
            "id",
        )
        .unwrap();
        assert_eq!(sql, r#"UPDATE buddyreads SET "status"=$1 WHERE id = $2 RETURNING id"#);
        assert_eq!(values, vec![SqlValue::from("accepted"), SqlValue::Int(1)]);
    }

    #[test]
    fn creator_is_not_updatable() {
        let fields = FieldMap::new().with("createdBy", 2);
        let err = update_statement(
            "buddyreads",
            &fields,
            &COLUMNS,
            UPDATABLE,
            &[("id", SqlValue::Int(1))],
            "id",
        )
        .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn patch_deserializes_camel_case() {
        let patch: BuddyReadPatch =
            serde_json::from_value(serde_json::json!({ "status": "pending" })).unwrap();
        assert_eq!(patch.status.as_deref(), Some("pending"));
        assert!(serde_json::from_value::<BuddyReadPatch>(serde_json::json!({ "id": 5 })).is_err());
    }

    #[test]
    fn detail_serializes_nested_users() {
        let u = |id: i32| UserSummary {
            id,
            email: format!("u{id}@email.com"),
            first_name: format!("U{id}F"),
            last_name: format!("U{id}L"),
            profile_picture: None,
        };
        let detail = BuddyReadDetail {
            id: 1,
            book_id: "book1".into(),
            created_by: u(1),
            buddy: u(2),
            status: "pending".into(),
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["bookId"], "book1");
        assert_eq!(json["createdBy"]["firstName"], "U1F");
        assert_eq!(json["buddy"]["id"], 2);
    }
}
