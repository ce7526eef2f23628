// --- File: crates/bora_stripe/src/handlers.rs ---
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use bora_common::services::PaymentFulfillment;
use bora_common::HttpStatusCode;
use bora_config::AppConfig;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::StripeError;
use crate::logic::{
    create_checkout_session, extract_fulfillment, verify_stripe_signature,
    CreateCheckoutSessionRequest, CreateCheckoutSessionResponse, StripeEvent,
};

#[derive(Clone)]
pub struct StripeState {
    pub config: Arc<AppConfig>,
    pub fulfillment: Arc<dyn PaymentFulfillment>,
}

fn into_http(err: StripeError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}

/// Creates a Stripe Checkout Session for an orcamento or agendamento.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/stripe/create-checkout-session",
    request_body = CreateCheckoutSessionRequest,
    responses(
        (status = 200, description = "Stripe Checkout Session created", body = CreateCheckoutSessionResponse),
        (status = 400, description = "Bad request"),
        (status = 502, description = "Stripe API error"),
        (status = 503, description = "Stripe disabled")
    ),
    tag = "Stripe"
))]
pub async fn create_checkout_session_handler(
    State(state): State<Arc<StripeState>>,
    Json(payload): Json<CreateCheckoutSessionRequest>,
) -> Result<Json<CreateCheckoutSessionResponse>, (StatusCode, String)> {
    if !state.config.use_stripe {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Stripe service is disabled".to_string(),
        ));
    }
    let stripe_config = state
        .config
        .stripe
        .as_ref()
        .ok_or_else(|| into_http(StripeError::ConfigError))?;

    create_checkout_session(stripe_config, payload)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Stripe checkout session creation failed: {}", e);
            into_http(e)
        })
}

/// Server-to-server notifications from Stripe. Always verifies the
/// `Stripe-Signature` header before touching the payload.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/stripe/webhook",
    responses(
        (status = 200, description = "Webhook received and acknowledged"),
        (status = 400, description = "Bad payload"),
        (status = 401, description = "Invalid signature"),
        (status = 500, description = "Processing failure")
    ),
    tag = "Stripe Webhooks"
))]
pub async fn stripe_webhook_handler(
    State(state): State<Arc<StripeState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !state.config.use_stripe {
        return (StatusCode::SERVICE_UNAVAILABLE, "Stripe service disabled").into_response();
    }

    let webhook_secret = match std::env::var("STRIPE_WEBHOOK_SECRET") {
        Ok(s) => s,
        Err(_) => {
            error!("STRIPE_WEBHOOK_SECRET environment variable not set");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let sig_header = headers
        .get("Stripe-Signature")
        .and_then(|h| h.to_str().ok());

    if let Err(e) = verify_stripe_signature(
        body.as_bytes(),
        sig_header,
        &webhook_secret,
        Utc::now().timestamp(),
    ) {
        warn!("Stripe webhook signature verification failed: {}", e);
        return into_http(e).into_response();
    }

    let event: StripeEvent = match serde_json::from_str(&body) {
        Ok(ev) => ev,
        Err(e) => {
            warn!("Failed to deserialize Stripe webhook event: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid payload format").into_response();
        }
    };

    let request = match extract_fulfillment(&event) {
        Ok(Some(request)) => request,
        Ok(None) => return StatusCode::OK.into_response(),
        Err(e) => {
            warn!("Stripe webhook event {} rejected: {}", event.id, e);
            return into_http(e).into_response();
        }
    };

    info!(
        "Stripe event {} paid, fulfilling {} {}",
        event.id, request.kind, request.reference_id
    );
    match state.fulfillment.fulfill(request).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            error!("Fulfillment for Stripe event {} failed: {}", event.id, e);
            into_http(StripeError::FulfillmentError(e.to_string())).into_response()
        }
    }
}

// --- Redirect Handlers (Client-Side) ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct StripeRedirectQuery {
    #[cfg_attr(feature = "openapi", param(example = "cs_test_a1..."))]
    pub session_id: Option<String>,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/stripe/checkout-success",
    params(StripeRedirectQuery),
    responses((status = 200, description = "Checkout success page", content_type = "text/html")),
    tag = "Stripe Redirects"
))]
pub async fn stripe_checkout_success_handler(
    Query(params): Query<StripeRedirectQuery>,
) -> Html<&'static str> {
    info!(
        "User redirected to Stripe success URL. Session ID: {:?}",
        params.session_id
    );
    Html("<h1>Pagamento confirmado!</h1><p>Obrigado. Seu pedido está sendo processado.</p>")
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/stripe/checkout-cancel",
    params(StripeRedirectQuery),
    responses((status = 200, description = "Checkout cancellation page", content_type = "text/html")),
    tag = "Stripe Redirects"
))]
pub async fn stripe_checkout_cancel_handler(
    Query(params): Query<StripeRedirectQuery>,
) -> Html<&'static str> {
    info!(
        "User redirected to Stripe cancel URL. Session ID: {:?}",
        params.session_id
    );
    Html("<h1>Pagamento cancelado</h1><p>O pagamento foi cancelado e nada foi cobrado.</p>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bora_common::services::{BoxFuture, BoxedError, FulfillmentRequest};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    use std::sync::Mutex;

    const TEST_SECRET: &str = "whsec_test_secret";

    #[derive(Default)]
    struct RecordingFulfillment {
        calls: Mutex<Vec<FulfillmentRequest>>,
    }

    impl PaymentFulfillment for RecordingFulfillment {
        fn fulfill(&self, request: FulfillmentRequest) -> BoxFuture<'_, (), BoxedError> {
            self.calls.lock().unwrap().push(request);
            Box::pin(async { Ok(()) })
        }
    }

    fn make_state(use_stripe: bool) -> (Arc<StripeState>, Arc<RecordingFulfillment>) {
        let mut config: AppConfig =
            serde_json::from_str(r#"{"server": {"host": "127.0.0.1", "port": 0}}"#).unwrap();
        config.use_stripe = use_stripe;
        let fulfillment = Arc::new(RecordingFulfillment::default());
        let state = Arc::new(StripeState {
            config: Arc::new(config),
            fulfillment: fulfillment.clone(),
        });
        (state, fulfillment)
    }

    fn sign(body: &str, ts: i64) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(TEST_SECRET.as_bytes()).unwrap();
        mac.update(format!("{ts}.{body}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn paid_event_body() -> String {
        serde_json::json!({
            "id": "evt_test_1",
            "created": Utc::now().timestamp(),
            "livemode": false,
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_test_1",
                "amount_total": 12_000,
                "currency": "brl",
                "metadata": {
                    "ff_kind": "traducao",
                    "ff_reference_id": "5f8b1c2e-0000-0000-0000-000000000001"
                },
                "payment_status": "paid",
                "status": "complete"
            }}
        })
        .to_string()
    }

    fn header_map(signature: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Stripe-Signature", signature.parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn webhook_with_bad_signature_is_unauthorized() {
        std::env::set_var("STRIPE_WEBHOOK_SECRET", TEST_SECRET);
        let (state, fulfillment) = make_state(true);
        let headers = header_map(&format!("t={},v1=deadbeef", Utc::now().timestamp()));

        let response = stripe_webhook_handler(State(state), headers, paid_event_body()).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        // Nothing was paid as far as this system is concerned.
        assert!(fulfillment.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn webhook_without_signature_header_is_unauthorized() {
        std::env::set_var("STRIPE_WEBHOOK_SECRET", TEST_SECRET);
        let (state, fulfillment) = make_state(true);

        let response =
            stripe_webhook_handler(State(state), HeaderMap::new(), paid_event_body()).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(fulfillment.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn webhook_is_unavailable_when_stripe_is_disabled() {
        std::env::set_var("STRIPE_WEBHOOK_SECRET", TEST_SECRET);
        let (state, fulfillment) = make_state(false);
        let ts = Utc::now().timestamp();
        let body = paid_event_body();
        let headers = header_map(&format!("t={ts},v1={}", sign(&body, ts)));

        let response = stripe_webhook_handler(State(state), headers, body).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(fulfillment.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn signed_paid_event_is_fulfilled() {
        std::env::set_var("STRIPE_WEBHOOK_SECRET", TEST_SECRET);
        let (state, fulfillment) = make_state(true);
        let ts = Utc::now().timestamp();
        let body = paid_event_body();
        let headers = header_map(&format!("t={ts},v1={}", sign(&body, ts)));

        let response = stripe_webhook_handler(State(state), headers, body).await;

        assert_eq!(response.status(), StatusCode::OK);
        let calls = fulfillment.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].payment_ref, "cs_test_1");
        assert_eq!(
            calls[0].reference_id,
            "5f8b1c2e-0000-0000-0000-000000000001"
        );
    }
}
