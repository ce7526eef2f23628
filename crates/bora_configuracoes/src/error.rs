// --- File: crates/bora_configuracoes/src/error.rs ---
use bora_common::{BoraError, HttpStatusCode};
use bora_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfiguracoesError {
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<ConfiguracoesError> for BoraError {
    fn from(err: ConfiguracoesError) -> Self {
        match err {
            ConfiguracoesError::ValidationError(msg) => BoraError::ValidationError(msg),
            ConfiguracoesError::Database(e) => e.into(),
        }
    }
}

impl HttpStatusCode for ConfiguracoesError {
    fn status_code(&self) -> u16 {
        match self {
            ConfiguracoesError::ValidationError(_) => 400,
            ConfiguracoesError::Database(e) => match e {
                DbError::NotFound(_) => 404,
                _ => 500,
            },
        }
    }
}
