// --- File: crates/bora_mercadopago/src/handlers.rs ---
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use bora_common::services::PaymentFulfillment;
use bora_common::HttpStatusCode;
use bora_config::AppConfig;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::MercadoPagoError;
use crate::logic::{
    create_preference, fulfillment_from_payment, get_payment, verify_mercadopago_signature,
    CreatePreferenceRequest, CreatePreferenceResponse, MercadoPagoPayment, WebhookNotification,
};

#[derive(Clone)]
pub struct MercadoPagoState {
    pub config: Arc<AppConfig>,
    pub fulfillment: Arc<dyn PaymentFulfillment>,
}

fn into_http(err: MercadoPagoError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}

/// Creates a Mercado Pago checkout preference for an orcamento or
/// agendamento.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/mercadopago/create-preference",
    request_body = CreatePreferenceRequest,
    responses(
        (status = 200, description = "Preference created", body = CreatePreferenceResponse),
        (status = 400, description = "Bad request"),
        (status = 502, description = "Mercado Pago API error"),
        (status = 503, description = "Mercado Pago disabled")
    ),
    tag = "Mercado Pago"
))]
pub async fn create_preference_handler(
    State(state): State<Arc<MercadoPagoState>>,
    Json(payload): Json<CreatePreferenceRequest>,
) -> Result<Json<CreatePreferenceResponse>, (StatusCode, String)> {
    if !state.config.use_mercado_pago {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Mercado Pago service is disabled".to_string(),
        ));
    }
    let mp_config = state
        .config
        .mercado_pago
        .as_ref()
        .ok_or_else(|| into_http(MercadoPagoError::ConfigError))?;

    create_preference(mp_config, payload)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Mercado Pago preference creation failed: {}", e);
            into_http(e)
        })
}

/// Payment lookup, mostly for the back-office dashboards.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/mercadopago/payments/{payment_id}",
    params(("payment_id" = String, Path, description = "Mercado Pago payment id")),
    responses(
        (status = 200, description = "Payment details", body = MercadoPagoPayment),
        (status = 404, description = "Unknown payment"),
        (status = 503, description = "Mercado Pago disabled")
    ),
    tag = "Mercado Pago"
))]
pub async fn get_payment_handler(
    State(state): State<Arc<MercadoPagoState>>,
    Path(payment_id): Path<String>,
) -> Result<Json<MercadoPagoPayment>, (StatusCode, String)> {
    if !state.config.use_mercado_pago {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Mercado Pago service is disabled".to_string(),
        ));
    }

    get_payment(&payment_id).await.map(Json).map_err(into_http)
}

/// Server-to-server notifications from Mercado Pago. The `x-signature`
/// header is verified against the `data.id` query parameter before the
/// payment is fetched back from the API.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/mercadopago/webhook",
    responses(
        (status = 200, description = "Webhook received and acknowledged"),
        (status = 400, description = "Bad payload"),
        (status = 401, description = "Invalid signature"),
        (status = 500, description = "Processing failure")
    ),
    tag = "Mercado Pago Webhooks"
))]
pub async fn mercadopago_webhook_handler(
    State(state): State<Arc<MercadoPagoState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if !state.config.use_mercado_pago {
        return (StatusCode::SERVICE_UNAVAILABLE, "Mercado Pago service disabled").into_response();
    }

    let webhook_secret = match std::env::var("MERCADOPAGO_WEBHOOK_SECRET") {
        Ok(s) => s,
        Err(_) => {
            error!("MERCADOPAGO_WEBHOOK_SECRET environment variable not set");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let notification: WebhookNotification = match serde_json::from_str(&body) {
        Ok(n) => n,
        Err(e) => {
            warn!("Failed to deserialize Mercado Pago notification: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid payload format").into_response();
        }
    };

    // Mercado Pago signs the query-string id; the body repeats it.
    let data_id = query
        .get("data.id")
        .cloned()
        .or_else(|| notification.data_id());

    let x_signature = headers.get("x-signature").and_then(|h| h.to_str().ok());
    let x_request_id = headers.get("x-request-id").and_then(|h| h.to_str().ok());

    if let Err(e) = verify_mercadopago_signature(
        x_signature,
        x_request_id,
        data_id.as_deref(),
        &webhook_secret,
        Utc::now().timestamp(),
    ) {
        warn!("Mercado Pago webhook signature verification failed: {}", e);
        return into_http(e).into_response();
    }

    if notification.notification_type.as_deref() != Some("payment") {
        info!(
            "Ignoring Mercado Pago notification type: {:?}",
            notification.notification_type
        );
        return StatusCode::OK.into_response();
    }

    let payment_id = match data_id {
        Some(id) => id,
        None => {
            warn!("Mercado Pago payment notification without data.id");
            return (StatusCode::BAD_REQUEST, "Missing data.id").into_response();
        }
    };

    // The notification only carries the id; the status comes from the API.
    let payment = match get_payment(&payment_id).await {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to fetch Mercado Pago payment {}: {}", payment_id, e);
            return into_http(e).into_response();
        }
    };

    let request = match fulfillment_from_payment(&payment) {
        Ok(Some(request)) => request,
        Ok(None) => return StatusCode::OK.into_response(),
        Err(e) => {
            warn!("Mercado Pago payment {} rejected: {}", payment_id, e);
            return into_http(e).into_response();
        }
    };

    info!(
        "Mercado Pago payment {} approved, fulfilling {} {}",
        payment_id, request.kind, request.reference_id
    );
    match state.fulfillment.fulfill(request).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            error!(
                "Fulfillment for Mercado Pago payment {} failed: {}",
                payment_id, e
            );
            into_http(MercadoPagoError::FulfillmentError(e.to_string())).into_response()
        }
    }
}
