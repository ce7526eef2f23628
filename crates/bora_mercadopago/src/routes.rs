// --- File: crates/bora_mercadopago/src/routes.rs ---

use crate::handlers::{
    create_preference_handler, get_payment_handler, mercadopago_webhook_handler, MercadoPagoState,
};
use axum::{
    routing::{get, post},
    Router,
};
use bora_common::services::PaymentFulfillment;
use bora_config::AppConfig;
use std::sync::Arc;

/// Creates a router containing all Mercado Pago routes.
pub fn routes(config: Arc<AppConfig>, fulfillment: Arc<dyn PaymentFulfillment>) -> Router {
    let state = Arc::new(MercadoPagoState {
        config,
        fulfillment,
    });

    Router::new()
        .route(
            "/api/mercadopago/create-preference",
            post(create_preference_handler),
        )
        .route("/api/mercadopago/webhook", post(mercadopago_webhook_handler))
        .route(
            "/api/mercadopago/payments/{payment_id}",
            get(get_payment_handler),
        )
        .with_state(state)
}
