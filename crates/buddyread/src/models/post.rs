//! Page-by-page commentary posted inside a buddy-read.

use super::buddyread::{self, BuddyRead};
use super::user::{self, UserSummary};
use super::{fetch_all, fetch_opt, select_statement, update_statement};
use crate::client::GenericClient;
use crate::error::{Error, Result};
use crate::row::{FromRow, RowExt};
use crate::sql::{ColumnMap, FieldMap, FilterCriteria, POST_FILTER_KEYS, params_ref};
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub const UPDATABLE: &[&str] = &["page", "message", "viewed", "liked"];

const RETURNING: &str = r#"id,
    buddyread_id AS "buddyreadId",
    user_id AS "userId",
    page,
    message,
    viewed,
    liked"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub buddyread_id: i32,
    pub user_id: i32,
    pub page: i32,
    pub message: String,
    pub viewed: bool,
    pub liked: bool,
}

impl FromRow for Post {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            buddyread_id: row.try_get_column("buddyreadId")?,
            user_id: row.try_get_column("userId")?,
            page: row.try_get_column("page")?,
            message: row.try_get_column("message")?,
            viewed: row.try_get_column("viewed")?,
            liked: row.try_get_column("liked")?,
        })
    }
}

/// A post with its buddy-read and author in place of the two ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetail {
    pub id: i32,
    #[serde(rename = "buddyreadId")]
    pub buddyread: BuddyRead,
    #[serde(rename = "userId")]
    pub user: UserSummary,
    pub page: i32,
    pub message: String,
    pub viewed: bool,
    pub liked: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewPost {
    pub buddyread_id: i32,
    pub user_id: i32,
    pub page: i32,
    pub message: String,
    #[serde(default)]
    pub viewed: bool,
    #[serde(default)]
    pub liked: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PostPatch {
    pub page: Option<i32>,
    pub message: Option<String>,
    pub viewed: Option<bool>,
    pub liked: Option<bool>,
}

impl PostPatch {
    pub fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields
            .set_opt("page", self.page)
            .set_opt("message", self.message.clone())
            .set_opt("viewed", self.viewed)
            .set_opt("liked", self.liked);
        fields
    }
}

pub async fn create(conn: &impl GenericClient, new: &NewPost) -> Result<Post> {
    let sql = format!(
        "INSERT INTO posts (buddyread_id, user_id, page, message, viewed, liked)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {RETURNING}"
    );
    let row = conn
        .query_one(
            &sql,
            &[
                &new.buddyread_id,
                &new.user_id,
                &new.page,
                &new.message,
                &new.viewed,
                &new.liked,
            ],
        )
        .await?;
    Post::from_row(&row)
}

/// All posts, optionally filtered by `buddyreadId` and/or `userId`.
pub async fn find_all(conn: &impl GenericClient, filter: Option<&FilterCriteria>) -> Result<Vec<Post>> {
    let select = format!("SELECT {RETURNING} FROM posts");
    let (sql, values) = select_statement(&select, filter, POST_FILTER_KEYS, "id")?;
    fetch_all(conn, &sql, &values).await
}

pub async fn get(conn: &impl GenericClient, id: i32) -> Result<PostDetail> {
    let sql = format!("SELECT {RETURNING} FROM posts WHERE id = $1");
    let post: Post = fetch_opt(conn, &sql, &[SqlValue::from(id)])
        .await?
        .ok_or_else(|| Error::not_found(format!("No post: {id}")))?;

    let buddyread = buddyread::get_plain(conn, post.buddyread_id).await?;
    let user = user::summary(conn, post.user_id).await?;

    Ok(PostDetail {
        id: post.id,
        buddyread,
        user,
        page: post.page,
        message: post.message,
        viewed: post.viewed,
        liked: post.liked,
    })
}

pub async fn update(conn: &impl GenericClient, id: i32, patch: &PostPatch) -> Result<Post> {
    update_fields(conn, id, &patch.to_fields()).await
}

pub async fn update_fields(conn: &impl GenericClient, id: i32, fields: &FieldMap) -> Result<Post> {
    let (sql, values) = update_statement(
        "posts",
        fields,
        &ColumnMap::EMPTY,
        UPDATABLE,
        &[("id", SqlValue::from(id))],
        RETURNING,
    )?;
    fetch_opt(conn, &sql, &values)
        .await?
        .ok_or_else(|| Error::not_found(format!("No post: {id}")))
}

pub async fn remove(conn: &impl GenericClient, id: i32) -> Result<()> {
    let values = [SqlValue::from(id)];
    let row = conn
        .query_opt("DELETE FROM posts WHERE id = $1 RETURNING id", &params_ref(&values))
        .await?;
    row.map(|_| ())
        .ok_or_else(|| Error::not_found(format!("No post: {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_uses_logical_names_verbatim() {
        let patch = PostPatch {
            message: Some("new message".into()),
            liked: Some(true),
            ..Default::default()
        };
        let (sql, values) = update_statement(
            "posts",
            &patch.to_fields(),
            &ColumnMap::EMPTY,
            UPDATABLE,
            &[("id", SqlValue::Int(3))],
            "id",
        )
        .unwrap();
        assert_eq!(
            sql,
            r#"UPDATE posts SET "message"=$1, "liked"=$2 WHERE id = $3 RETURNING id"#
        );
        assert_eq!(
            values,
            vec![SqlValue::from("new message"), SqlValue::Bool(true), SqlValue::Int(3)]
        );
    }

    #[test]
    fn owner_fields_are_not_updatable() {
        for name in ["userId", "buddyreadId", "id"] {
            let fields = FieldMap::new().with(name, 1);
            let err = update_statement(
                "posts",
                &fields,
                &ColumnMap::EMPTY,
                UPDATABLE,
                &[("id", SqlValue::Int(3))],
                "id",
            )
            .unwrap_err();
            assert!(err.is_invalid_argument(), "{name} should be rejected");
        }
    }

    #[test]
    fn filter_by_buddyread() {
        let criteria = FilterCriteria::new().with("buddyreadId", 2);
        let (sql, values) =
            select_statement("SELECT id FROM posts", Some(&criteria), POST_FILTER_KEYS, "id")
                .unwrap();
        assert_eq!(sql, "SELECT id FROM posts WHERE buddyread_id=$1 ORDER BY id");
        assert_eq!(values, vec![SqlValue::Int(2)]);
    }

    #[test]
    fn new_post_defaults_flags() {
        let new: NewPost = serde_json::from_value(serde_json::json!({
            "buddyreadId": 1,
            "userId": 2,
            "page": 10,
            "message": "hi",
        }))
        .unwrap();
        assert!(!new.viewed);
        assert!(!new.liked);
    }

    #[test]
    fn detail_uses_original_field_names() {
        let detail = PostDetail {
            id: 1,
            buddyread: BuddyRead {
                id: 4,
                book_id: "book1".into(),
                created_by: 1,
                buddy: 2,
                status: "accepted".into(),
            },
            user: UserSummary {
                id: 1,
                email: "u1@email.com".into(),
                first_name: "U1F".into(),
                last_name: "U1L".into(),
                profile_picture: None,
            },
            page: 10,
            message: "hi".into(),
            viewed: false,
            liked: true,
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["buddyreadId"]["bookId"], "book1");
        assert_eq!(json["userId"]["lastName"], "U1L");
    }
}
