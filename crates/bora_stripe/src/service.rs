// --- File: crates/bora_stripe/src/service.rs ---
use bora_common::services::{
    BoxFuture, BoxedError, CheckoutRequest, CheckoutService, CheckoutSession,
};
use bora_config::AppConfig;
use std::sync::Arc;

use crate::error::StripeError;
use crate::logic::{create_checkout_session, CreateCheckoutSessionRequest};

/// Stripe-backed [`CheckoutService`], handed to the feature crates through
/// the provider registry.
pub struct StripeCheckoutService {
    config: Arc<AppConfig>,
}

impl StripeCheckoutService {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }
}

impl CheckoutService for StripeCheckoutService {
    fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> BoxFuture<'_, CheckoutSession, BoxedError> {
        Box::pin(async move {
            let stripe_config = self
                .config
                .stripe
                .as_ref()
                .ok_or_else(|| BoxedError(Box::new(StripeError::ConfigError)))?;

            let response = create_checkout_session(
                stripe_config,
                CreateCheckoutSessionRequest {
                    kind: request.kind,
                    reference_id: request.reference_id,
                    title: request.title,
                    amount_cents: request.amount_cents,
                    currency: Some(request.currency),
                },
            )
            .await
            .map_err(|e| BoxedError(Box::new(e)))?;

            Ok(CheckoutSession {
                provider: "stripe".to_string(),
                checkout_url: response.url,
                payment_ref: response.session_id,
            })
        })
    }
}
