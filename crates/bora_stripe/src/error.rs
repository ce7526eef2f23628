// --- File: crates/bora_stripe/src/error.rs ---
use bora_common::{external_service_error, BoraError, HttpStatusCode};
use thiserror::Error;

/// Stripe-specific error types.
#[derive(Error, Debug)]
pub enum StripeError {
    /// Error occurred during a Stripe API request
    #[error("Stripe API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Stripe API
    #[error("Stripe API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error parsing Stripe API response
    #[error("Failed to parse Stripe API response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Missing or incomplete Stripe configuration
    #[error("Stripe configuration missing or incomplete")]
    ConfigError,

    /// Webhook signature verification failed
    #[error("Stripe webhook signature verification failed: {0}")]
    WebhookSignatureError(String),

    /// Webhook event processing error
    #[error("Stripe webhook event processing error: {0}")]
    WebhookProcessingError(String),

    /// Fulfillment of a paid session failed
    #[error("Fulfillment failed: {0}")]
    FulfillmentError(String),

    /// Internal processing error
    #[error("Internal processing error: {0}")]
    InternalError(String),
}

impl From<StripeError> for BoraError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::RequestError(e) => {
                BoraError::HttpError(format!("Stripe request error: {e}"))
            }
            StripeError::ApiError {
                status_code,
                message,
            } => external_service_error(
                "Stripe API",
                format!("Status: {status_code}, Message: {message}"),
            ),
            StripeError::ParseError(e) => {
                BoraError::ParseError(format!("Stripe response parse error: {e}"))
            }
            StripeError::ConfigError => {
                BoraError::ConfigError("Stripe configuration missing or incomplete".to_string())
            }
            StripeError::WebhookSignatureError(msg) => {
                BoraError::AuthError(format!("Stripe webhook signature error: {msg}"))
            }
            StripeError::WebhookProcessingError(msg) => {
                external_service_error("Stripe webhook", msg)
            }
            StripeError::FulfillmentError(msg) => external_service_error("Fulfillment", msg),
            StripeError::InternalError(msg) => {
                BoraError::InternalError(format!("Stripe internal error: {msg}"))
            }
        }
    }
}

impl HttpStatusCode for StripeError {
    fn status_code(&self) -> u16 {
        match self {
            StripeError::RequestError(_) => 502,
            StripeError::ApiError { status_code, .. } => *status_code,
            StripeError::ParseError(_) => 400,
            StripeError::ConfigError => 500,
            StripeError::WebhookSignatureError(_) => 401,
            StripeError::WebhookProcessingError(_) => 500,
            StripeError::FulfillmentError(_) => 502,
            StripeError::InternalError(_) => 500,
        }
    }
}
