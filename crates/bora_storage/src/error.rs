// --- File: crates/bora_storage/src/error.rs ---
use bora_common::{BoraError, HttpStatusCode};
use thiserror::Error;

/// Storage-specific error types.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error occurred during a storage API request
    #[error("Storage API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the storage API
    #[error("Storage API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error parsing a storage API response
    #[error("Failed to parse storage API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing or incomplete storage configuration
    #[error("Storage configuration missing or incomplete")]
    ConfigError,

    /// Object key is not acceptable (empty, traversal, etc.)
    #[error("Invalid object path: {0}")]
    InvalidPath(String),
}

impl From<StorageError> for BoraError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::RequestError(e) => {
                BoraError::StorageError(format!("storage request error: {e}"))
            }
            StorageError::ApiError {
                status_code,
                message,
            } => BoraError::StorageError(format!("status {status_code}: {message}")),
            StorageError::ParseError(e) => {
                BoraError::ParseError(format!("storage response parse error: {e}"))
            }
            StorageError::ConfigError => {
                BoraError::ConfigError("storage configuration missing or incomplete".to_string())
            }
            StorageError::InvalidPath(msg) => BoraError::ValidationError(msg),
        }
    }
}

impl HttpStatusCode for StorageError {
    fn status_code(&self) -> u16 {
        match self {
            StorageError::RequestError(_) => 502,
            StorageError::ApiError { status_code, .. } => *status_code,
            StorageError::ParseError(_) => 502,
            StorageError::ConfigError => 500,
            StorageError::InvalidPath(_) => 400,
        }
    }
}
