// --- File: crates/bora_traducoes/src/error.rs ---
use bora_common::{BoraError, HttpStatusCode};
use bora_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraducoesError {
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Markup of {0}% is outside the accepted range (0..=100)")]
    MarkupOutOfBounds(i64),

    #[error("Quote amount too large to apply markup")]
    AmountOverflow,

    #[error("Expected {entity} in status '{expected}', found '{actual}'")]
    WrongState {
        entity: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Payment provider '{0}' is not configured")]
    ProviderUnavailable(String),

    #[error("Checkout creation failed: {0}")]
    CheckoutFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<TraducoesError> for BoraError {
    fn from(err: TraducoesError) -> Self {
        match err {
            TraducoesError::ValidationError(msg) => BoraError::ValidationError(msg),
            TraducoesError::MarkupOutOfBounds(v) => BoraError::ValidationError(format!(
                "markup of {v}% is outside the accepted range (0..=100)"
            )),
            TraducoesError::AmountOverflow => {
                BoraError::ValidationError("quote amount too large to apply markup".to_string())
            }
            TraducoesError::WrongState {
                entity,
                expected,
                actual,
            } => BoraError::ConflictError(format!(
                "expected {entity} in status '{expected}', found '{actual}'"
            )),
            TraducoesError::ProviderUnavailable(p) => {
                BoraError::ConfigError(format!("payment provider '{p}' is not configured"))
            }
            TraducoesError::CheckoutFailed(msg) => BoraError::ExternalServiceError {
                service_name: "checkout".to_string(),
                message: msg,
            },
            TraducoesError::NotFound(msg) => BoraError::NotFoundError(msg),
            TraducoesError::Database(e) => e.into(),
        }
    }
}

impl HttpStatusCode for TraducoesError {
    fn status_code(&self) -> u16 {
        match self {
            TraducoesError::ValidationError(_)
            | TraducoesError::MarkupOutOfBounds(_)
            | TraducoesError::AmountOverflow => 400,
            TraducoesError::WrongState { .. } => 409,
            TraducoesError::ProviderUnavailable(_) => 503,
            TraducoesError::CheckoutFailed(_) => 502,
            TraducoesError::NotFound(_) => 404,
            TraducoesError::Database(e) => match e {
                DbError::NotFound(_) => 404,
                _ => 500,
            },
        }
    }
}
