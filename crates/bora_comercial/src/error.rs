// --- File: crates/bora_comercial/src/error.rs ---
use bora_common::{BoraError, HttpStatusCode};
use bora_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComercialError {
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("The requested slot is already taken")]
    SlotTaken,

    #[error("Agendamento is already '{0}'")]
    AlreadyInState(String),

    #[error("Calendar integration is not configured")]
    CalendarUnavailable,

    #[error("Payment provider '{0}' is not configured")]
    ProviderUnavailable(String),

    #[error("Calendar request failed: {0}")]
    CalendarFailed(String),

    #[error("Checkout creation failed: {0}")]
    CheckoutFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<ComercialError> for BoraError {
    fn from(err: ComercialError) -> Self {
        match err {
            ComercialError::ValidationError(msg) => BoraError::ValidationError(msg),
            ComercialError::SlotTaken => {
                BoraError::ConflictError("the requested slot is already taken".to_string())
            }
            ComercialError::AlreadyInState(s) => {
                BoraError::ConflictError(format!("agendamento is already '{s}'"))
            }
            ComercialError::CalendarUnavailable => {
                BoraError::ConfigError("calendar integration is not configured".to_string())
            }
            ComercialError::ProviderUnavailable(p) => {
                BoraError::ConfigError(format!("payment provider '{p}' is not configured"))
            }
            ComercialError::CalendarFailed(msg) => BoraError::ExternalServiceError {
                service_name: "calendar".to_string(),
                message: msg,
            },
            ComercialError::CheckoutFailed(msg) => BoraError::ExternalServiceError {
                service_name: "checkout".to_string(),
                message: msg,
            },
            ComercialError::NotFound(msg) => BoraError::NotFoundError(msg),
            ComercialError::Database(e) => e.into(),
        }
    }
}

impl HttpStatusCode for ComercialError {
    fn status_code(&self) -> u16 {
        match self {
            ComercialError::ValidationError(_) => 400,
            ComercialError::SlotTaken | ComercialError::AlreadyInState(_) => 409,
            ComercialError::CalendarUnavailable | ComercialError::ProviderUnavailable(_) => 503,
            ComercialError::CalendarFailed(_) | ComercialError::CheckoutFailed(_) => 502,
            ComercialError::NotFound(_) => 404,
            ComercialError::Database(e) => match e {
                DbError::NotFound(_) => 404,
                _ => 500,
            },
        }
    }
}
