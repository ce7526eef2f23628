// --- File: crates/bora_stripe/src/logic.rs ---
use bora_common::services::{FulfillmentKind, FulfillmentRequest};
use bora_config::StripeConfig;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::{collections::HashMap, env};
use tracing::{debug, info, warn};

use crate::error::StripeError;

use bora_common::HTTP_CLIENT;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// How far a webhook timestamp may drift from the server clock.
pub const TIMESTAMP_TOLERANCE_SECONDS: i64 = 600;

// --- Data Structures ---

/// Request from the dashboard to create a Stripe Checkout Session.
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateCheckoutSessionRequest {
    /// What the payment unlocks once completed.
    pub kind: FulfillmentKind,
    /// The orcamento or agendamento id being paid for.
    #[cfg_attr(feature = "openapi", schema(example = "3f1a..."))]
    pub reference_id: String,
    #[cfg_attr(feature = "openapi", schema(example = "Tradução juramentada - RG"))]
    pub title: String,
    #[cfg_attr(feature = "openapi", schema(example = 25000))]
    pub amount_cents: i64,
    #[cfg_attr(feature = "openapi", schema(example = "brl"))]
    pub currency: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreateCheckoutSessionResponse {
    #[cfg_attr(
        feature = "openapi",
        schema(example = "https://checkout.stripe.com/pay/cs_test_a1...")
    )]
    pub url: String,
    #[cfg_attr(feature = "openapi", schema(example = "cs_test_a1..."))]
    pub session_id: String,
}

#[derive(Deserialize, Debug)]
struct StripeCheckoutSessionApiResponse {
    pub id: String,
    pub url: Option<String>,
}

/// The `data` field within a Stripe Event. The object shape varies by event
/// type, so it stays a raw value until the type is known.
#[derive(Deserialize, Debug, Clone)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

/// The outer Stripe Event object.
#[derive(Deserialize, Debug, Clone)]
pub struct StripeEvent {
    pub id: String,
    pub created: i64,
    pub livemode: bool,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

/// The `data.object` for `checkout.session.completed` events.
#[derive(Deserialize, Debug, Clone)]
pub struct StripeCheckoutSessionObject {
    pub id: String,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
    pub payment_intent: Option<String>,
    pub payment_status: Option<String>,
    pub status: Option<String>,
}

// --- Webhook Processing Logic ---

/// Verifies the signature of an incoming Stripe webhook request.
///
/// The `Stripe-Signature` header carries `t=<unix>,v1=<hex>[,v1=...]`; the
/// signed payload is `"{t}.{body}"` under HMAC-SHA256 with the webhook
/// secret. Any matching `v1` entry within the timestamp tolerance passes.
pub fn verify_stripe_signature(
    payload_bytes: &[u8],
    sig_header: Option<&str>,
    secret: &str,
    now_unix: i64,
) -> Result<(), StripeError> {
    let sig_header_value = sig_header.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing Stripe-Signature header".to_string())
    })?;

    let mut timestamp_str: Option<&str> = None;
    let mut v1_signatures_hex: Vec<&str> = Vec::new();

    for item in sig_header_value.split(',') {
        let parts: Vec<&str> = item.trim().splitn(2, '=').collect();
        if parts.len() == 2 {
            match parts[0] {
                "t" => timestamp_str = Some(parts[1]),
                "v1" => v1_signatures_hex.push(parts[1]),
                _ => {}
            }
        }
    }

    let timestamp_str = timestamp_str.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing timestamp 't' in Stripe-Signature".to_string())
    })?;
    let parsed_timestamp = timestamp_str.parse::<i64>().map_err(|_| {
        StripeError::WebhookSignatureError("Invalid timestamp format in Stripe-Signature".to_string())
    })?;

    if v1_signatures_hex.is_empty() {
        return Err(StripeError::WebhookSignatureError(
            "Missing v1 signature in Stripe-Signature".to_string(),
        ));
    }

    if (now_unix - parsed_timestamp).abs() > TIMESTAMP_TOLERANCE_SECONDS {
        warn!(
            "Stripe webhook timestamp outside tolerance. Now: {}, event: {}",
            now_unix, parsed_timestamp
        );
        return Err(StripeError::WebhookSignatureError(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    // Sign the original header timestamp string, not the parsed value.
    let signed_payload_string = format!(
        "{}.{}",
        timestamp_str,
        String::from_utf8_lossy(payload_bytes)
    );

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
        StripeError::WebhookSignatureError("Invalid webhook secret format for HMAC".to_string())
    })?;
    mac.update(signed_payload_string.as_bytes());
    let calculated_signature_hex = hex::encode(mac.finalize().into_bytes());

    for provided_sig_hex in v1_signatures_hex {
        if constant_time_eq::constant_time_eq(
            calculated_signature_hex.as_bytes(),
            provided_sig_hex.as_bytes(),
        ) {
            return Ok(());
        }
    }

    warn!("Stripe signature mismatch for webhook payload");
    Err(StripeError::WebhookSignatureError(
        "Signature mismatch".to_string(),
    ))
}

/// Extracts the fulfillment request from a verified event, when the event is
/// a paid `checkout.session.completed`. Other event types yield `None`.
pub fn extract_fulfillment(event: &StripeEvent) -> Result<Option<FulfillmentRequest>, StripeError> {
    if event.event_type != "checkout.session.completed" {
        debug!("Ignoring Stripe event type: {}", event.event_type);
        return Ok(None);
    }

    let session: StripeCheckoutSessionObject =
        serde_json::from_value(event.data.object.clone()).map_err(|e| {
            StripeError::WebhookProcessingError(format!(
                "Failed to parse checkout session object: {e}"
            ))
        })?;

    if session.payment_status.as_deref() != Some("paid") {
        info!(
            "Checkout session {} completed with payment_status {:?}, skipping fulfillment",
            session.id, session.payment_status
        );
        return Ok(None);
    }

    let metadata = session.metadata.as_ref().ok_or_else(|| {
        StripeError::WebhookProcessingError(format!(
            "Session {} carries no metadata, cannot fulfill",
            session.id
        ))
    })?;

    let kind: FulfillmentKind = metadata
        .get("ff_kind")
        .ok_or_else(|| {
            StripeError::WebhookProcessingError("Missing ff_kind in session metadata".to_string())
        })?
        .parse()
        .map_err(StripeError::WebhookProcessingError)?;

    let reference_id = metadata
        .get("ff_reference_id")
        .ok_or_else(|| {
            StripeError::WebhookProcessingError(
                "Missing ff_reference_id in session metadata".to_string(),
            )
        })?
        .clone();

    Ok(Some(FulfillmentRequest {
        kind,
        reference_id,
        provider: "stripe".to_string(),
        payment_ref: session.id,
        amount_cents: session.amount_total,
    }))
}

// --- Checkout Session Creation ---

/// Creates a Stripe Checkout Session via the form-encoded v1 API.
pub async fn create_checkout_session(
    stripe_config: &StripeConfig,
    request: CreateCheckoutSessionRequest,
) -> Result<CreateCheckoutSessionResponse, StripeError> {
    info!(
        "Creating Stripe Checkout Session for {} {}",
        request.kind, request.reference_id
    );

    if request.amount_cents <= 0 {
        return Err(StripeError::InternalError(
            "amount_cents must be positive".to_string(),
        ));
    }

    let stripe_secret_key = env::var("STRIPE_SECRET_KEY").map_err(|_| StripeError::ConfigError)?;

    let currency = request
        .currency
        .or_else(|| stripe_config.default_currency.clone())
        .unwrap_or_else(|| "brl".to_string())
        .to_lowercase();

    let form_body: Vec<(String, String)> = vec![
        ("payment_method_types[]".to_string(), "card".to_string()),
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), stripe_config.success_url.clone()),
        ("cancel_url".to_string(), stripe_config.cancel_url.clone()),
        ("line_items[0][price_data][currency]".to_string(), currency),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            request.title.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            request.amount_cents.to_string(),
        ),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        (
            "client_reference_id".to_string(),
            request.reference_id.clone(),
        ),
        ("metadata[ff_kind]".to_string(), request.kind.to_string()),
        (
            "metadata[ff_reference_id]".to_string(),
            request.reference_id.clone(),
        ),
    ];

    let api_url = format!("{STRIPE_API_BASE}/checkout/sessions");
    let response = HTTP_CLIENT
        .post(&api_url)
        .basic_auth(stripe_secret_key, None::<&str>)
        .form(&form_body)
        .send()
        .await?;

    let status = response.status();
    let body_text = response.text().await?;

    if status.is_success() {
        let stripe_response: StripeCheckoutSessionApiResponse = serde_json::from_str(&body_text)?;
        let url = stripe_response.url.ok_or_else(|| {
            StripeError::InternalError("Stripe response missing checkout URL".to_string())
        })?;
        info!(
            "Stripe Checkout Session {} created for {}",
            stripe_response.id, request.reference_id
        );
        Ok(CreateCheckoutSessionResponse {
            url,
            session_id: stripe_response.id,
        })
    } else {
        Err(StripeError::ApiError {
            status_code: status.as_u16(),
            message: extract_api_error(&body_text),
        })
    }
}

/// Pulls `error.message` out of a Stripe error body, falling back to the raw
/// text.
fn extract_api_error(body_text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body_text) {
        Ok(json_body) => json_body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or(body_text)
            .to_string(),
        Err(_) => body_text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    const SECRET: &str = "whsec_test_secret";

    fn sign(payload: &str, timestamp: i64) -> String {
        type HmacSha256 = Hmac<Sha256>;
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{payload}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_is_accepted() {
        let payload = r#"{"id":"evt_1"}"#;
        let ts = 1_700_000_000;
        let header = format!("t={ts},v1={}", sign(payload, ts));
        assert!(
            verify_stripe_signature(payload.as_bytes(), Some(&header), SECRET, ts + 5).is_ok()
        );
    }

    #[test]
    fn any_matching_v1_entry_passes() {
        let payload = r#"{"id":"evt_1"}"#;
        let ts = 1_700_000_000;
        let header = format!("t={ts},v1=deadbeef,v1={}", sign(payload, ts));
        assert!(
            verify_stripe_signature(payload.as_bytes(), Some(&header), SECRET, ts).is_ok()
        );
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let ts = 1_700_000_000;
        let header = format!("t={ts},v1={}", sign(r#"{"id":"evt_1"}"#, ts));
        let result =
            verify_stripe_signature(br#"{"id":"evt_2"}"#, Some(&header), SECRET, ts);
        assert!(matches!(result, Err(StripeError::WebhookSignatureError(_))));
    }

    #[test]
    fn missing_header_is_rejected() {
        let result = verify_stripe_signature(b"{}", None, SECRET, 1_700_000_000);
        assert!(matches!(result, Err(StripeError::WebhookSignatureError(_))));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let payload = r#"{"id":"evt_1"}"#;
        let ts = 1_700_000_000;
        let header = format!("t={ts},v1={}", sign(payload, ts));
        let now = ts + TIMESTAMP_TOLERANCE_SECONDS + 1;
        let result = verify_stripe_signature(payload.as_bytes(), Some(&header), SECRET, now);
        assert!(matches!(result, Err(StripeError::WebhookSignatureError(_))));
    }

    fn paid_session_event(metadata: serde_json::Value) -> StripeEvent {
        StripeEvent {
            id: "evt_1".to_string(),
            created: 1_700_000_000,
            livemode: false,
            event_type: "checkout.session.completed".to_string(),
            data: StripeEventData {
                object: serde_json::json!({
                    "id": "cs_test_123",
                    "amount_total": 25000,
                    "currency": "brl",
                    "metadata": metadata,
                    "payment_status": "paid",
                    "status": "complete"
                }),
            },
        }
    }

    #[test]
    fn paid_session_yields_fulfillment_request() {
        let event = paid_session_event(serde_json::json!({
            "ff_kind": "traducao",
            "ff_reference_id": "abc-123"
        }));
        let request = extract_fulfillment(&event).unwrap().unwrap();
        assert_eq!(request.kind, FulfillmentKind::Traducao);
        assert_eq!(request.reference_id, "abc-123");
        assert_eq!(request.payment_ref, "cs_test_123");
        assert_eq!(request.amount_cents, Some(25000));
    }

    #[test]
    fn unpaid_session_is_skipped() {
        let mut event = paid_session_event(serde_json::json!({
            "ff_kind": "traducao",
            "ff_reference_id": "abc-123"
        }));
        event.data.object["payment_status"] = serde_json::json!("unpaid");
        assert!(extract_fulfillment(&event).unwrap().is_none());
    }

    #[test]
    fn other_event_types_are_ignored() {
        let mut event = paid_session_event(serde_json::json!({}));
        event.event_type = "payment_intent.succeeded".to_string();
        assert!(extract_fulfillment(&event).unwrap().is_none());
    }

    #[test]
    fn missing_metadata_is_an_error() {
        let event = paid_session_event(serde_json::json!({ "unrelated": "x" }));
        assert!(extract_fulfillment(&event).is_err());
    }
}
