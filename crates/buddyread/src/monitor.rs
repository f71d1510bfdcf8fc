//! SQL logging via `tracing`.
//!
//! [`TracingClient`] wraps any [`GenericClient`] and emits one event per
//! statement (target `buddyread.sql`) before it runs, carrying the statement
//! kind, parameter count and the SQL text. Parameter values are never logged.

use crate::client::GenericClient;
use crate::error::Result;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Level;

/// Statement kind, detected from the leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl QueryType {
    pub fn from_sql(sql: &str) -> Self {
        let head = sql.trim_start();
        let keyword = head
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or("");
        match keyword.to_ascii_uppercase().as_str() {
            "SELECT" | "WITH" => Self::Select,
            "INSERT" => Self::Insert,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            _ => Self::Other,
        }
    }
}

/// Truncate to at most `max` bytes on a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max: usize) -> &str {
    if sql.len() <= max {
        return sql;
    }
    let mut end = max;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A client wrapper that logs every statement through `tracing`.
#[derive(Debug, Clone)]
pub struct TracingClient<C> {
    inner: C,
    level: Level,
    max_sql_length: Option<usize>,
}

impl<C: GenericClient> TracingClient<C> {
    /// Wrap `inner`, logging at `DEBUG` with SQL truncated to 200 bytes.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn emit(&self, sql: &str, param_count: usize) {
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let shown = match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        };
        emit_at_level!(
            self.level,
            target: "buddyread.sql",
            query_type = ?QueryType::from_sql(sql),
            param_count,
            sql = %shown,
        );
    }
}

impl<C: GenericClient> GenericClient for TracingClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>> {
        self.emit(sql, params.len());
        self.inner.query(sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        self.emit(sql, params.len());
        self.inner.execute(sql, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_statement_kind() {
        assert_eq!(QueryType::from_sql("  SELECT 1"), QueryType::Select);
        assert_eq!(QueryType::from_sql("update users SET a=$1"), QueryType::Update);
        assert_eq!(QueryType::from_sql("INSERT INTO posts"), QueryType::Insert);
        assert_eq!(QueryType::from_sql("DELETE\nFROM posts"), QueryType::Delete);
        assert_eq!(QueryType::from_sql("BEGIN"), QueryType::Other);
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_sql_bytes("abcdef", 3), "abc");
        assert_eq!(truncate_sql_bytes("ab", 3), "ab");
        // 'é' is two bytes; cutting at 2 would split it.
        assert_eq!(truncate_sql_bytes("aé", 2), "a");
    }
}
