// --- File: crates/bora_juridico/src/error.rs ---
use bora_common::{BoraError, HttpStatusCode};
use bora_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JuridicoError {
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("'{0}' is not a known status")]
    InvalidStatus(String),

    #[error("Transition {from} -> {to} is not allowed (allowed: {allowed})")]
    InvalidTransition {
        from: String,
        to: String,
        allowed: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<JuridicoError> for BoraError {
    fn from(err: JuridicoError) -> Self {
        match err {
            JuridicoError::ValidationError(msg) => BoraError::ValidationError(msg),
            JuridicoError::InvalidStatus(s) => {
                BoraError::ValidationError(format!("'{s}' is not a known status"))
            }
            JuridicoError::InvalidTransition { from, to, allowed } => BoraError::ConflictError(
                format!("transition {from} -> {to} is not allowed (allowed: {allowed})"),
            ),
            JuridicoError::NotFound(msg) => BoraError::NotFoundError(msg),
            JuridicoError::Database(e) => e.into(),
        }
    }
}

impl HttpStatusCode for JuridicoError {
    fn status_code(&self) -> u16 {
        match self {
            JuridicoError::ValidationError(_) | JuridicoError::InvalidStatus(_) => 400,
            JuridicoError::InvalidTransition { .. } => 409,
            JuridicoError::NotFound(_) => 404,
            JuridicoError::Database(e) => match e {
                DbError::NotFound(_) => 404,
                _ => 500,
            },
        }
    }
}
