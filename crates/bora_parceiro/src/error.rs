// --- File: crates/bora_parceiro/src/error.rs ---
use bora_common::{BoraError, HttpStatusCode};
use bora_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParceiroError {
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("A partner with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("A cliente with email '{0}' already exists")]
    DuplicateLead(String),

    #[error("Partner {0} is inactive")]
    Inactive(uuid::Uuid),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<ParceiroError> for BoraError {
    fn from(err: ParceiroError) -> Self {
        match err {
            ParceiroError::ValidationError(msg) => BoraError::ValidationError(msg),
            ParceiroError::DuplicateEmail(email) => {
                BoraError::ConflictError(format!("partner email '{email}' already registered"))
            }
            ParceiroError::DuplicateLead(email) => {
                BoraError::ConflictError(format!("cliente email '{email}' already registered"))
            }
            ParceiroError::Inactive(id) => {
                BoraError::ConflictError(format!("partner {id} is inactive"))
            }
            ParceiroError::NotFound(msg) => BoraError::NotFoundError(msg),
            ParceiroError::Database(e) => e.into(),
        }
    }
}

impl HttpStatusCode for ParceiroError {
    fn status_code(&self) -> u16 {
        match self {
            ParceiroError::ValidationError(_) => 400,
            ParceiroError::DuplicateEmail(_)
            | ParceiroError::DuplicateLead(_)
            | ParceiroError::Inactive(_) => 409,
            ParceiroError::NotFound(_) => 404,
            ParceiroError::Database(e) => match e {
                DbError::NotFound(_) => 404,
                _ => 500,
            },
        }
    }
}
