// --- File: crates/bora_stripe/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use crate::logic::{CreateCheckoutSessionRequest, CreateCheckoutSessionResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::create_checkout_session_handler,
        crate::handlers::stripe_webhook_handler,
        crate::handlers::stripe_checkout_success_handler,
        crate::handlers::stripe_checkout_cancel_handler,
    ),
    components(schemas(CreateCheckoutSessionRequest, CreateCheckoutSessionResponse)),
    tags(
        (name = "Stripe", description = "Stripe Checkout sessions"),
        (name = "Stripe Webhooks", description = "Signed server-to-server notifications"),
        (name = "Stripe Redirects", description = "User-facing redirect pages")
    )
)]
pub struct StripeApiDoc;
