//! # buddyread
//!
//! Data layer for a buddy-reading service: users pair up to read a book,
//! post page-by-page commentary and track their progress.
//!
//! ## Features
//!
//! - **Partial updates**: [`sql_for_partial_update`] turns a sparse field map
//!   into a `SET` fragment with positional placeholders
//! - **Filters**: [`sql_for_filter`] turns query criteria into a `WHERE`
//!   fragment over a fixed table of recognized keys
//! - **Values are always bound**: only column names from static tables reach the SQL text
//! - **Transaction-friendly**: every model function takes a [`GenericClient`]
//! - **SQL logging**: wrap any client in [`TracingClient`] to emit `tracing` events
//!
//! ## Example
//!
//! ```ignore
//! use buddyread::models::{buddyread, BuddyReadPatch};
//! use buddyread::{DbConfig, FilterCriteria, TracingClient, create_pool};
//!
//! let pool = create_pool(&DbConfig::from_env()?)?;
//! let client = TracingClient::new(pool.get().await?);
//!
//! let mine = buddyread::find_all(&client, Some(&FilterCriteria::new().with("createdBy", 1))).await?;
//!
//! let patch = BuddyReadPatch { status: Some("accepted".into()) };
//! buddyread::update(&client, mine[0].id, &patch).await?;
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod ident;
pub mod models;
pub mod monitor;
pub mod row;
pub mod sql;
pub mod value;

#[cfg(feature = "pool")]
pub mod pool;

pub use auth::{Caller, PasswordHasher};
pub use client::GenericClient;
pub use config::DbConfig;
pub use error::{Error, Result};
pub use monitor::{QueryType, TracingClient};
pub use row::{FromRow, RowExt};
pub use sql::{
    Clause, ColumnMap, FieldMap, FilterCriteria, FilterKey, FilterKind, sql_for_filter,
    sql_for_filter_with, sql_for_partial_update, sql_for_partial_update_checked,
};
pub use value::SqlValue;

#[cfg(feature = "pool")]
pub use pool::create_pool;
