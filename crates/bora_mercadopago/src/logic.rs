// --- File: crates/bora_mercadopago/src/logic.rs ---
use bora_common::services::{FulfillmentKind, FulfillmentRequest};
use bora_common::HTTP_CLIENT;
use bora_config::MercadoPagoConfig;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::env;
use tracing::{info, warn};

use crate::error::MercadoPagoError;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

const MP_API_BASE: &str = "https://api.mercadopago.com";

/// How far a webhook timestamp may drift from the server clock.
pub const TIMESTAMP_TOLERANCE_SECONDS: i64 = 600;

// --- Data Structures ---

/// Request from the dashboard to create a checkout preference.
#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreatePreferenceRequest {
    /// What the payment unlocks once approved.
    pub kind: FulfillmentKind,
    /// The orcamento or agendamento id being paid for.
    pub reference_id: String,
    #[cfg_attr(feature = "openapi", schema(example = "Tradução juramentada - RG"))]
    pub title: String,
    #[cfg_attr(feature = "openapi", schema(example = 25000))]
    pub amount_cents: i64,
    #[cfg_attr(feature = "openapi", schema(example = "BRL"))]
    pub currency: Option<String>,
    pub payer_email: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CreatePreferenceResponse {
    pub preference_id: String,
    /// The hosted checkout URL the payer is redirected to.
    pub init_point: String,
}

#[derive(Deserialize, Debug)]
struct PreferenceApiResponse {
    pub id: String,
    pub init_point: Option<String>,
    pub sandbox_init_point: Option<String>,
}

/// A payment as reported by `GET /v1/payments/{id}`.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MercadoPagoPayment {
    pub id: i64,
    pub status: String,
    pub status_detail: Option<String>,
    pub external_reference: Option<String>,
    pub transaction_amount: Option<f64>,
    pub currency_id: Option<String>,
}

/// The JSON body Mercado Pago posts to the webhook endpoint.
#[derive(Deserialize, Debug, Clone)]
pub struct WebhookNotification {
    pub action: Option<String>,
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    pub data: Option<WebhookData>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WebhookData {
    pub id: serde_json::Value,
}

impl WebhookNotification {
    /// The payment id carried in the notification body, as a string.
    pub fn data_id(&self) -> Option<String> {
        self.data.as_ref().map(|d| match &d.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

// --- Webhook signature verification ---

/// Verifies the `x-signature` header of a Mercado Pago webhook.
///
/// The header carries `ts=<unix>,v1=<hex>`. The signed manifest is
/// `id:{data.id};request-id:{x-request-id};ts:{ts};` where segments whose
/// source value is absent are dropped, and an alphanumeric `data.id` is
/// lowercased.
pub fn verify_mercadopago_signature(
    x_signature: Option<&str>,
    x_request_id: Option<&str>,
    data_id: Option<&str>,
    secret: &str,
    now_unix: i64,
) -> Result<(), MercadoPagoError> {
    let header = x_signature.ok_or_else(|| {
        MercadoPagoError::WebhookSignatureError("Missing x-signature header".to_string())
    })?;

    let mut ts_str: Option<&str> = None;
    let mut v1_hex: Option<&str> = None;
    for item in header.split(',') {
        let parts: Vec<&str> = item.trim().splitn(2, '=').collect();
        if parts.len() == 2 {
            match parts[0] {
                "ts" => ts_str = Some(parts[1]),
                "v1" => v1_hex = Some(parts[1]),
                _ => {}
            }
        }
    }

    let ts_str = ts_str.ok_or_else(|| {
        MercadoPagoError::WebhookSignatureError("Missing ts in x-signature".to_string())
    })?;
    let v1_hex = v1_hex.ok_or_else(|| {
        MercadoPagoError::WebhookSignatureError("Missing v1 in x-signature".to_string())
    })?;

    let mut ts: i64 = ts_str.parse().map_err(|_| {
        MercadoPagoError::WebhookSignatureError("Invalid ts format in x-signature".to_string())
    })?;
    // Mercado Pago sends the timestamp in milliseconds.
    if ts > 10_000_000_000 {
        ts /= 1000;
    }
    if (now_unix - ts).abs() > TIMESTAMP_TOLERANCE_SECONDS {
        warn!(
            "Mercado Pago webhook timestamp outside tolerance. Now: {}, event: {}",
            now_unix, ts
        );
        return Err(MercadoPagoError::WebhookSignatureError(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    let manifest = build_manifest(data_id, x_request_id, ts_str);

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
        MercadoPagoError::WebhookSignatureError("Invalid webhook secret format for HMAC".to_string())
    })?;
    mac.update(manifest.as_bytes());
    let calculated_hex = hex::encode(mac.finalize().into_bytes());

    if constant_time_eq::constant_time_eq(calculated_hex.as_bytes(), v1_hex.as_bytes()) {
        Ok(())
    } else {
        warn!("Mercado Pago signature mismatch for webhook payload");
        Err(MercadoPagoError::WebhookSignatureError(
            "Signature mismatch".to_string(),
        ))
    }
}

/// Builds the signed manifest string. Exposed for tests.
pub fn build_manifest(data_id: Option<&str>, x_request_id: Option<&str>, ts: &str) -> String {
    let mut manifest = String::new();
    if let Some(id) = data_id {
        let id = if id.chars().all(|c| c.is_ascii_alphanumeric()) {
            id.to_lowercase()
        } else {
            id.to_string()
        };
        manifest.push_str(&format!("id:{id};"));
    }
    if let Some(request_id) = x_request_id {
        manifest.push_str(&format!("request-id:{request_id};"));
    }
    manifest.push_str(&format!("ts:{ts};"));
    manifest
}

// --- External reference ---

/// Encodes what the payment is for into the preference's external reference.
pub fn encode_external_reference(kind: FulfillmentKind, reference_id: &str) -> String {
    format!("{kind}:{reference_id}")
}

/// Parses `"{kind}:{reference_id}"` back out of a payment.
pub fn parse_external_reference(
    external_reference: &str,
) -> Result<(FulfillmentKind, String), MercadoPagoError> {
    let (kind_str, reference_id) = external_reference.split_once(':').ok_or_else(|| {
        MercadoPagoError::WebhookProcessingError(format!(
            "Malformed external_reference: {external_reference}"
        ))
    })?;
    let kind = kind_str
        .parse()
        .map_err(MercadoPagoError::WebhookProcessingError)?;
    Ok((kind, reference_id.to_string()))
}

/// Turns an approved payment into a fulfillment request. Payments in any
/// other status yield `None`.
pub fn fulfillment_from_payment(
    payment: &MercadoPagoPayment,
) -> Result<Option<FulfillmentRequest>, MercadoPagoError> {
    if payment.status != "approved" {
        info!(
            "Mercado Pago payment {} is '{}', skipping fulfillment",
            payment.id, payment.status
        );
        return Ok(None);
    }

    let external_reference = payment.external_reference.as_deref().ok_or_else(|| {
        MercadoPagoError::WebhookProcessingError(format!(
            "Payment {} carries no external_reference, cannot fulfill",
            payment.id
        ))
    })?;
    let (kind, reference_id) = parse_external_reference(external_reference)?;

    Ok(Some(FulfillmentRequest {
        kind,
        reference_id,
        provider: "mercadopago".to_string(),
        payment_ref: payment.id.to_string(),
        amount_cents: payment
            .transaction_amount
            .map(|amount| (amount * 100.0).round() as i64),
    }))
}

// --- API calls ---

fn access_token() -> Result<String, MercadoPagoError> {
    env::var("MERCADOPAGO_ACCESS_TOKEN").map_err(|_| MercadoPagoError::ConfigError)
}

/// Creates a checkout preference via `POST /checkout/preferences`.
pub async fn create_preference(
    mp_config: &MercadoPagoConfig,
    request: CreatePreferenceRequest,
) -> Result<CreatePreferenceResponse, MercadoPagoError> {
    info!(
        "Creating Mercado Pago preference for {} {}",
        request.kind, request.reference_id
    );

    if request.amount_cents <= 0 {
        return Err(MercadoPagoError::InternalError(
            "amount_cents must be positive".to_string(),
        ));
    }

    let token = access_token()?;
    let currency_id = request
        .currency
        .or_else(|| mp_config.default_currency.clone())
        .unwrap_or_else(|| "BRL".to_string())
        .to_uppercase();

    // Mercado Pago prices are in currency units, not cents.
    let unit_price = request.amount_cents as f64 / 100.0;

    let mut body = serde_json::json!({
        "items": [{
            "title": request.title,
            "quantity": 1,
            "unit_price": unit_price,
            "currency_id": currency_id,
        }],
        "external_reference": encode_external_reference(request.kind, &request.reference_id),
        "back_urls": {
            "success": mp_config.success_url,
            "failure": mp_config.failure_url,
            "pending": mp_config.pending_url,
        },
        "auto_return": "approved",
        "notification_url": mp_config.notification_url,
    });
    if let Some(email) = request.payer_email {
        body["payer"] = serde_json::json!({ "email": email });
    }

    let response = HTTP_CLIENT
        .post(format!("{MP_API_BASE}/checkout/preferences"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    let body_text = response.text().await?;

    if status.is_success() {
        let preference: PreferenceApiResponse = serde_json::from_str(&body_text)?;
        let init_point = preference
            .init_point
            .or(preference.sandbox_init_point)
            .ok_or_else(|| {
                MercadoPagoError::InternalError(
                    "Mercado Pago response missing init_point".to_string(),
                )
            })?;
        info!(
            "Mercado Pago preference {} created for {}",
            preference.id, request.reference_id
        );
        Ok(CreatePreferenceResponse {
            preference_id: preference.id,
            init_point,
        })
    } else {
        Err(MercadoPagoError::ApiError {
            status_code: status.as_u16(),
            message: extract_api_error(&body_text),
        })
    }
}

/// Retrieves a payment via `GET /v1/payments/{id}`.
pub async fn get_payment(payment_id: &str) -> Result<MercadoPagoPayment, MercadoPagoError> {
    let token = access_token()?;

    let response = HTTP_CLIENT
        .get(format!("{MP_API_BASE}/v1/payments/{payment_id}"))
        .bearer_auth(token)
        .send()
        .await?;

    let status = response.status();
    if status.as_u16() == 404 {
        return Err(MercadoPagoError::PaymentNotFound(payment_id.to_string()));
    }
    let body_text = response.text().await?;

    if status.is_success() {
        Ok(serde_json::from_str(&body_text)?)
    } else {
        Err(MercadoPagoError::ApiError {
            status_code: status.as_u16(),
            message: extract_api_error(&body_text),
        })
    }
}

/// Pulls `message` out of a Mercado Pago error body, falling back to the raw
/// text.
fn extract_api_error(body_text: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body_text) {
        Ok(json_body) => json_body
            .get("message")
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

    const SECRET: &str = "mp_test_secret";

    fn sign(manifest: &str) -> String {
        type HmacSha256 = Hmac<Sha256>;
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(manifest.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn manifest_includes_present_segments_only() {
        assert_eq!(
            build_manifest(Some("123"), Some("req-1"), "1700000000"),
            "id:123;request-id:req-1;ts:1700000000;"
        );
        assert_eq!(build_manifest(None, None, "1700000000"), "ts:1700000000;");
        assert_eq!(
            build_manifest(Some("ABC123"), None, "1"),
            "id:abc123;ts:1;"
        );
    }

    #[test]
    fn valid_signature_is_accepted() {
        let ts = 1_700_000_000i64;
        let manifest = build_manifest(Some("123"), Some("req-1"), &ts.to_string());
        let header = format!("ts={ts},v1={}", sign(&manifest));
        assert!(verify_mercadopago_signature(
            Some(&header),
            Some("req-1"),
            Some("123"),
            SECRET,
            ts + 5,
        )
        .is_ok());
    }

    #[test]
    fn millisecond_timestamps_are_accepted() {
        let ts_ms = 1_700_000_000_000i64;
        let manifest = build_manifest(Some("123"), None, &ts_ms.to_string());
        let header = format!("ts={ts_ms},v1={}", sign(&manifest));
        assert!(verify_mercadopago_signature(
            Some(&header),
            None,
            Some("123"),
            SECRET,
            1_700_000_000,
        )
        .is_ok());
    }

    #[test]
    fn wrong_data_id_is_rejected() {
        let ts = 1_700_000_000i64;
        let manifest = build_manifest(Some("123"), None, &ts.to_string());
        let header = format!("ts={ts},v1={}", sign(&manifest));
        let result =
            verify_mercadopago_signature(Some(&header), None, Some("456"), SECRET, ts);
        assert!(matches!(
            result,
            Err(MercadoPagoError::WebhookSignatureError(_))
        ));
    }

    #[test]
    fn missing_header_is_rejected() {
        let result = verify_mercadopago_signature(None, None, Some("123"), SECRET, 0);
        assert!(matches!(
            result,
            Err(MercadoPagoError::WebhookSignatureError(_))
        ));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let ts = 1_700_000_000i64;
        let manifest = build_manifest(Some("123"), None, &ts.to_string());
        let header = format!("ts={ts},v1={}", sign(&manifest));
        let now = ts + TIMESTAMP_TOLERANCE_SECONDS + 1;
        let result = verify_mercadopago_signature(Some(&header), None, Some("123"), SECRET, now);
        assert!(matches!(
            result,
            Err(MercadoPagoError::WebhookSignatureError(_))
        ));
    }

    #[test]
    fn external_reference_roundtrip() {
        let encoded = encode_external_reference(FulfillmentKind::Agendamento, "abc-123");
        assert_eq!(encoded, "agendamento:abc-123");
        let (kind, id) = parse_external_reference(&encoded).unwrap();
        assert_eq!(kind, FulfillmentKind::Agendamento);
        assert_eq!(id, "abc-123");

        assert!(parse_external_reference("no-separator").is_err());
        assert!(parse_external_reference("boleto:abc").is_err());
    }

    #[test]
    fn approved_payment_yields_fulfillment_request() {
        let payment = MercadoPagoPayment {
            id: 987,
            status: "approved".to_string(),
            status_detail: Some("accredited".to_string()),
            external_reference: Some("traducao:abc-123".to_string()),
            transaction_amount: Some(250.0),
            currency_id: Some("BRL".to_string()),
        };
        let request = fulfillment_from_payment(&payment).unwrap().unwrap();
        assert_eq!(request.kind, FulfillmentKind::Traducao);
        assert_eq!(request.reference_id, "abc-123");
        assert_eq!(request.payment_ref, "987");
        assert_eq!(request.amount_cents, Some(25000));
    }

    #[test]
    fn pending_payment_is_skipped() {
        let payment = MercadoPagoPayment {
            id: 987,
            status: "pending".to_string(),
            status_detail: None,
            external_reference: Some("traducao:abc-123".to_string()),
            transaction_amount: None,
            currency_id: None,
        };
        assert!(fulfillment_from_payment(&payment).unwrap().is_none());
    }
}
