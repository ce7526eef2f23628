// --- File: crates/bora_mercadopago/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use crate::logic::{CreatePreferenceRequest, CreatePreferenceResponse, MercadoPagoPayment};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::create_preference_handler,
        crate::handlers::get_payment_handler,
        crate::handlers::mercadopago_webhook_handler,
    ),
    components(schemas(
        CreatePreferenceRequest,
        CreatePreferenceResponse,
        MercadoPagoPayment
    )),
    tags(
        (name = "Mercado Pago", description = "Checkout preferences and payment lookup"),
        (name = "Mercado Pago Webhooks", description = "Signed server-to-server notifications")
    )
)]
pub struct MercadoPagoApiDoc;
