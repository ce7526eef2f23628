// --- File: crates/bora_cliente/src/error.rs ---
use bora_common::{BoraError, HttpStatusCode};
use bora_db::DbError;
use bora_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClienteError {
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Upload of {size} bytes exceeds the {max} byte limit")]
    UploadTooLarge { size: usize, max: usize },

    #[error("Content type '{0}' is not accepted")]
    UnsupportedContentType(String),

    #[error("A cliente with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Documento is '{0}' and can no longer be removed")]
    RemovalBlocked(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage is not configured")]
    StorageUnavailable,

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ClienteError> for BoraError {
    fn from(err: ClienteError) -> Self {
        match err {
            ClienteError::ValidationError(msg) => BoraError::ValidationError(msg),
            ClienteError::UploadTooLarge { size, max } => BoraError::ValidationError(format!(
                "upload of {size} bytes exceeds the {max} byte limit"
            )),
            ClienteError::UnsupportedContentType(ct) => {
                BoraError::ValidationError(format!("content type '{ct}' is not accepted"))
            }
            ClienteError::DuplicateEmail(email) => {
                BoraError::ConflictError(format!("cliente with email '{email}' already exists"))
            }
            ClienteError::RemovalBlocked(status) => {
                BoraError::ConflictError(format!("documento is '{status}' and cannot be removed"))
            }
            ClienteError::NotFound(msg) => BoraError::NotFoundError(msg),
            ClienteError::StorageUnavailable => {
                BoraError::ConfigError("storage is not configured".to_string())
            }
            ClienteError::Database(e) => e.into(),
            ClienteError::Storage(e) => e.into(),
        }
    }
}

impl HttpStatusCode for ClienteError {
    fn status_code(&self) -> u16 {
        match self {
            ClienteError::ValidationError(_)
            | ClienteError::UploadTooLarge { .. }
            | ClienteError::UnsupportedContentType(_) => 400,
            ClienteError::DuplicateEmail(_) | ClienteError::RemovalBlocked(_) => 409,
            ClienteError::NotFound(_) => 404,
            ClienteError::StorageUnavailable => 503,
            ClienteError::Database(e) => match e {
                DbError::NotFound(_) => 404,
                _ => 500,
            },
            ClienteError::Storage(_) => 502,
        }
    }
}
