// --- File: crates/bora_mercadopago/src/error.rs ---
use bora_common::{external_service_error, BoraError, HttpStatusCode};
use thiserror::Error;

/// Mercado Pago-specific error types.
#[derive(Error, Debug)]
pub enum MercadoPagoError {
    /// Error occurred during a Mercado Pago API request
    #[error("Mercado Pago API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Mercado Pago API
    #[error("Mercado Pago API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error parsing Mercado Pago API response
    #[error("Failed to parse Mercado Pago API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing or incomplete Mercado Pago configuration
    #[error("Mercado Pago configuration missing or incomplete")]
    ConfigError,

    /// Webhook signature verification failed
    #[error("Mercado Pago webhook signature verification failed: {0}")]
    WebhookSignatureError(String),

    /// Webhook event processing error
    #[error("Mercado Pago webhook event processing error: {0}")]
    WebhookProcessingError(String),

    /// Fulfillment of an approved payment failed
    #[error("Fulfillment failed: {0}")]
    FulfillmentError(String),

    /// Payment not found on the provider side
    #[error("Payment {0} not found")]
    PaymentNotFound(String),

    /// Internal processing error
    #[error("Internal processing error: {0}")]
    InternalError(String),
}

impl From<MercadoPagoError> for BoraError {
    fn from(err: MercadoPagoError) -> Self {
        match err {
            MercadoPagoError::RequestError(e) => {
                BoraError::HttpError(format!("Mercado Pago request error: {e}"))
            }
            MercadoPagoError::ApiError {
                status_code,
                message,
            } => external_service_error(
                "Mercado Pago API",
                format!("Status: {status_code}, Message: {message}"),
            ),
            MercadoPagoError::ParseError(e) => {
                BoraError::ParseError(format!("Mercado Pago response parse error: {e}"))
            }
            MercadoPagoError::ConfigError => BoraError::ConfigError(
                "Mercado Pago configuration missing or incomplete".to_string(),
            ),
            MercadoPagoError::WebhookSignatureError(msg) => {
                BoraError::AuthError(format!("Mercado Pago webhook signature error: {msg}"))
            }
            MercadoPagoError::WebhookProcessingError(msg) => {
                external_service_error("Mercado Pago webhook", msg)
            }
            MercadoPagoError::FulfillmentError(msg) => external_service_error("Fulfillment", msg),
            MercadoPagoError::PaymentNotFound(id) => {
                BoraError::NotFoundError(format!("payment {id}"))
            }
            MercadoPagoError::InternalError(msg) => {
                BoraError::InternalError(format!("Mercado Pago internal error: {msg}"))
            }
        }
    }
}

impl HttpStatusCode for MercadoPagoError {
    fn status_code(&self) -> u16 {
        match self {
            MercadoPagoError::RequestError(_) => 502,
            MercadoPagoError::ApiError { status_code, .. } => *status_code,
            MercadoPagoError::ParseError(_) => 400,
            MercadoPagoError::ConfigError => 500,
            MercadoPagoError::WebhookSignatureError(_) => 401,
            MercadoPagoError::WebhookProcessingError(_) => 500,
            MercadoPagoError::FulfillmentError(_) => 502,
            MercadoPagoError::PaymentNotFound(_) => 404,
            MercadoPagoError::InternalError(_) => 500,
        }
    }
}
