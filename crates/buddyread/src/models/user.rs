//! Users.

use super::{fetch_all, fetch_opt, select_statement, update_statement};
use crate::auth::PasswordHasher;
use crate::client::GenericClient;
use crate::error::{Error, Result};
use crate::row::{FromRow, RowExt};
use crate::sql::{ColumnMap, FieldMap, FilterCriteria, USER_FILTER_KEYS, params_ref};
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub const COLUMNS: ColumnMap = ColumnMap::new(&[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("profilePicture", "profile_picture"),
    ("isAdmin", "is_admin"),
]);

pub const UPDATABLE: &[&str] = &[
    "firstName",
    "lastName",
    "email",
    "password",
    "profilePicture",
    "isAdmin",
];

const RETURNING: &str = r#"id,
    email,
    first_name AS "firstName",
    last_name AS "lastName",
    profile_picture AS "profilePicture",
    is_admin AS "isAdmin""#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture: Option<String>,
    pub is_admin: bool,
}

impl FromRow for User {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            email: row.try_get_column("email")?,
            first_name: row.try_get_column("firstName")?,
            last_name: row.try_get_column("lastName")?,
            profile_picture: row.try_get_column("profilePicture")?,
            is_admin: row.try_get_column("isAdmin")?,
        })
    }
}

/// The public part of a user, embedded in buddy-reads and posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture: Option<String>,
}

impl FromRow for UserSummary {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            email: row.try_get_column("email")?,
            first_name: row.try_get_column("firstName")?,
            last_name: row.try_get_column("lastName")?,
            profile_picture: row.try_get_column("profilePicture")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// Partial update payload; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
    pub is_admin: Option<bool>,
}

impl UserPatch {
    pub fn to_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields
            .set_opt("firstName", self.first_name.clone())
            .set_opt("lastName", self.last_name.clone())
            .set_opt("email", self.email.clone())
            .set_opt("password", self.password.clone())
            .set_opt("profilePicture", self.profile_picture.clone())
            .set_opt("isAdmin", self.is_admin);
        fields
    }
}

/// Replace a non-empty plaintext `password` field with its hash.
fn hash_password_field(fields: &FieldMap, hasher: &impl PasswordHasher) -> Result<FieldMap> {
    let mut fields = fields.clone();
    match fields.get("password") {
        None => {}
        Some(SqlValue::Text(plain)) if plain.is_empty() => {}
        Some(SqlValue::Text(plain)) => {
            let hashed = hasher.hash(plain)?;
            fields.set("password", hashed);
        }
        Some(_) => return Err(Error::invalid_argument("password must be a string")),
    }
    Ok(fields)
}

/// Look up a user by email and check the password.
///
/// Fails with [`Error::Unauthorized`] for an unknown email or a wrong password.
pub async fn authenticate(
    conn: &impl GenericClient,
    hasher: &impl PasswordHasher,
    email: &str,
    password: &str,
) -> Result<User> {
    let sql = format!("SELECT password, {RETURNING} FROM users WHERE email = $1");
    let row = conn.query_opt(&sql, &[&email]).await?;

    if let Some(row) = row {
        let stored: String = row.try_get_column("password")?;
        if hasher.verify(password, &stored)? {
            return User::from_row(&row);
        }
    }

    tracing::info!(target: "buddyread.auth", "authentication failed");
    Err(Error::unauthorized("Invalid username/password"))
}

/// Register a new user, hashing the password.
///
/// Fails with [`Error::InvalidArgument`] when the email is taken.
pub async fn register(
    conn: &impl GenericClient,
    hasher: &impl PasswordHasher,
    user: &NewUser,
) -> Result<User> {
    let duplicate = conn
        .query_opt("SELECT email FROM users WHERE email = $1", &[&user.email])
        .await?;
    if duplicate.is_some() {
        return Err(Error::invalid_argument(format!(
            "Duplicate email: {}",
            user.email
        )));
    }

    let hashed = hasher.hash(&user.password)?;
    let sql = format!(
        "INSERT INTO users (email, password, first_name, last_name, profile_picture, is_admin)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {RETURNING}"
    );
    let row = conn
        .query_one(
            &sql,
            &[
                &user.email,
                &hashed,
                &user.first_name,
                &user.last_name,
                &user.profile_picture,
                &user.is_admin,
            ],
        )
        .await?;
    User::from_row(&row)
}

/// All users, optionally filtered by email.
pub async fn find_all(
    conn: &impl GenericClient,
    filter: Option<&FilterCriteria>,
) -> Result<Vec<User>> {
    let select = format!("SELECT {RETURNING} FROM users");
    let (sql, values) = select_statement(&select, filter, USER_FILTER_KEYS, "id")?;
    fetch_all(conn, &sql, &values).await
}

pub async fn get(conn: &impl GenericClient, id: i32) -> Result<User> {
    let sql = format!("SELECT {RETURNING} FROM users WHERE id = $1");
    fetch_opt(conn, &sql, &[SqlValue::from(id)])
        .await?
        .ok_or_else(|| Error::not_found(format!("No user: {id}")))
}

pub(crate) async fn summary(conn: &impl GenericClient, id: i32) -> Result<UserSummary> {
    let sql = r#"SELECT id,
            email,
            first_name AS "firstName",
            last_name AS "lastName",
            profile_picture AS "profilePicture"
        FROM users
        WHERE id = $1"#;
    fetch_opt(conn, sql, &[SqlValue::from(id)])
        .await?
        .ok_or_else(|| Error::not_found(format!("No user: {id}")))
}

/// Partial update from a typed patch.
///
/// This can set a new password or grant admin; the caller must have checked
/// that the requester is allowed to do so.
pub async fn update(
    conn: &impl GenericClient,
    hasher: &impl PasswordHasher,
    id: i32,
    patch: &UserPatch,
) -> Result<User> {
    update_fields(conn, hasher, id, &patch.to_fields()).await
}

/// Partial update from a field map; only [`UPDATABLE`] names are accepted.
pub async fn update_fields(
    conn: &impl GenericClient,
    hasher: &impl PasswordHasher,
    id: i32,
    fields: &FieldMap,
) -> Result<User> {
    let fields = hash_password_field(fields, hasher)?;
    let (sql, values) = update_statement(
        "users",
        &fields,
        &COLUMNS,
        UPDATABLE,
        &[("id", SqlValue::from(id))],
        RETURNING,
    )?;
    fetch_opt(conn, &sql, &values)
        .await?
        .ok_or_else(|| Error::not_found(format!("No user: {id}")))
}

pub async fn remove(conn: &impl GenericClient, id: i32) -> Result<()> {
    let values = [SqlValue::from(id)];
    let row = conn
        .query_opt("DELETE FROM users WHERE id = $1 RETURNING id", &params_ref(&values))
        .await?;
    row.map(|_| ())
        .ok_or_else(|| Error::not_found(format!("No user: {id}")))
}
