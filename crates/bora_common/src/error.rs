// --- File: crates/bora_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type shared across all BoraExpandir crates.
///
/// Feature crates define their own error enums and convert into this
/// taxonomy via `From<SpecificError> for BoraError`.
#[derive(Error, Debug)]
pub enum BoraError {
    /// Error occurred during an outbound HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Authentication / signature failure
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Request failed validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Object storage operation failed
    #[error("Storage error: {0}")]
    StorageError(String),

    /// External provider call failed
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Conflicting state, e.g. a disallowed status transition
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Anything else
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for BoraError {
    fn status_code(&self) -> u16 {
        match self {
            BoraError::HttpError(_) => 500,
            BoraError::ParseError(_) => 400,
            BoraError::ConfigError(_) => 500,
            BoraError::AuthError(_) => 401,
            BoraError::ValidationError(_) => 400,
            BoraError::DatabaseError(_) => 500,
            BoraError::StorageError(_) => 502,
            BoraError::ExternalServiceError { .. } => 502,
            BoraError::ConflictError(_) => 409,
            BoraError::NotFoundError(_) => 404,
            BoraError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<reqwest::Error> for BoraError {
    fn from(err: reqwest::Error) -> Self {
        BoraError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for BoraError {
    fn from(err: serde_json::Error) -> Self {
        BoraError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for BoraError {
    fn from(err: std::io::Error) -> Self {
        BoraError::InternalError(err.to_string())
    }
}

// Utility constructors used by handlers that do not have a crate error enum.
pub fn validation_error<T: fmt::Display>(message: T) -> BoraError {
    BoraError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> BoraError {
    BoraError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> BoraError {
    BoraError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> BoraError {
    BoraError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> BoraError {
    BoraError::InternalError(message.to_string())
}
