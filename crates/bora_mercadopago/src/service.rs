// --- File: crates/bora_mercadopago/src/service.rs ---
use bora_common::services::{
    BoxFuture, BoxedError, CheckoutRequest, CheckoutService, CheckoutSession,
};
use bora_config::AppConfig;
use std::sync::Arc;

use crate::error::MercadoPagoError;
use crate::logic::{create_preference, CreatePreferenceRequest};

/// Mercado Pago-backed [`CheckoutService`], handed to the feature crates
/// through the provider registry.
pub struct MercadoPagoCheckoutService {
    config: Arc<AppConfig>,
}

impl MercadoPagoCheckoutService {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }
}

impl CheckoutService for MercadoPagoCheckoutService {
    fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> BoxFuture<'_, CheckoutSession, BoxedError> {
        Box::pin(async move {
            let mp_config = self
                .config
                .mercado_pago
                .as_ref()
                .ok_or_else(|| BoxedError(Box::new(MercadoPagoError::ConfigError)))?;

            let response = create_preference(
                mp_config,
                CreatePreferenceRequest {
                    kind: request.kind,
                    reference_id: request.reference_id,
                    title: request.title,
                    amount_cents: request.amount_cents,
                    currency: Some(request.currency.to_uppercase()),
                    payer_email: request.payer_email,
                },
            )
            .await
            .map_err(|e| BoxedError(Box::new(e)))?;

            Ok(CheckoutSession {
                provider: "mercadopago".to_string(),
                checkout_url: response.init_point,
                payment_ref: response.preference_id,
            })
        })
    }
}
