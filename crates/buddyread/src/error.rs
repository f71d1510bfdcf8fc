//! Error types for buddyread

use thiserror::Error;

/// Result type alias for buddyread operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for clause building and database operations
#[derive(Debug, Error)]
pub enum Error {
    /// Caller supplied unusable input (empty update, empty filter, restricted field)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Password hashing collaborator failed
    #[error("Hash error: {0}")]
    Hash(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// HTTP status the request boundary should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidArgument(_) | Self::UniqueViolation(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::ForeignKeyViolation(_) | Self::CheckViolation(_) => 400,
            _ => 500,
        }
    }

    /// Parse a tokio_postgres error into a more specific Error
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for Error {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_maps_to_bad_request() {
        let err = Error::invalid_argument("No data");
        assert!(err.is_invalid_argument());
        assert!(!err.is_not_found());
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "Invalid argument: No data");
    }

    #[test]
    fn not_found_and_unauthorized_statuses() {
        assert_eq!(Error::not_found("No user: 0").status_code(), 404);
        assert_eq!(Error::unauthorized("Invalid username/password").status_code(), 401);
        assert_eq!(Error::Config("x".into()).status_code(), 500);
    }
}
