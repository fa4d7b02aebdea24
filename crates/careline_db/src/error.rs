//! Error types for the database client

use careline_common::ClinicError;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// A unique constraint rejected the write
    #[error("Duplicate value: {0}")]
    UniqueViolation(String),

    /// A stored value could not be converted back into its model type
    #[error("Invalid stored value: {0}")]
    DecodeError(String),
}

impl DbError {
    /// Classify a failed write, separating unique-constraint hits from other errors.
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DbError::UniqueViolation(db_err.message().to_string());
            }
        }
        DbError::QueryError(err.to_string())
    }
}

impl From<DbError> for ClinicError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(msg) => ClinicError::AlreadyExists(msg),
            DbError::ConfigError(msg) | DbError::UrlError(msg) => ClinicError::ConfigError(msg),
            other => ClinicError::DatabaseError(other.to_string()),
        }
    }
}
