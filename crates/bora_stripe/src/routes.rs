// --- File: crates/bora_stripe/src/routes.rs ---

use crate::handlers::{
    create_checkout_session_handler, stripe_checkout_cancel_handler,
    stripe_checkout_success_handler, stripe_webhook_handler, StripeState,
};
use axum::{
    routing::{get, post},
    Router,
};
use bora_common::services::PaymentFulfillment;
use bora_config::AppConfig;
use std::sync::Arc;

/// Creates a router containing all Stripe routes.
pub fn routes(config: Arc<AppConfig>, fulfillment: Arc<dyn PaymentFulfillment>) -> Router {
    let state = Arc::new(StripeState {
        config,
        fulfillment,
    });

    Router::new()
        .route(
            "/api/stripe/create-checkout-session",
            post(create_checkout_session_handler),
        )
        .route("/api/stripe/webhook", post(stripe_webhook_handler))
        .route(
            "/api/stripe/checkout-success",
            get(stripe_checkout_success_handler),
        )
        .route(
            "/api/stripe/checkout-cancel",
            get(stripe_checkout_cancel_handler),
        )
        .with_state(state)
}
