//! Error types for the database layer

use thiserror::Error;

/// Errors that can occur when working with the database
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with a database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// Error with a database transaction
    #[error("Database transaction error: {0}")]
    TransactionError(String),

    /// Row exists but holds a value outside the domain vocabulary
    #[error("Invalid stored value: {0}")]
    InvalidValue(String),

    /// Requested row does not exist
    #[error("Row not found: {0}")]
    NotFound(String),
}

impl From<DbError> for bora_common::BoraError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => bora_common::BoraError::NotFoundError(msg),
            DbError::InvalidValue(msg) => bora_common::BoraError::InternalError(msg),
            other => bora_common::BoraError::DatabaseError(other.to_string()),
        }
    }
}
