// --- File: crates/bora_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // Loaded via APP__DATABASE__URL or DATABASE_URL
    #[serde(default)]
    pub max_connections: Option<u32>,
}

// --- Storage Config ---
// Holds non-secret storage config. The service key is loaded directly from
// the SUPABASE_SERVICE_KEY env var.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    pub base_url: String, // e.g. https://xyz.supabase.co
    pub bucket: String,   // e.g. "documentos"
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_secs: u64,
}

fn default_signed_url_ttl() -> u64 {
    3600
}

// --- Stripe Config ---
// Secret key loaded directly from env var: STRIPE_SECRET_KEY
// Webhook secret loaded directly from env var: STRIPE_WEBHOOK_SECRET
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StripeConfig {
    pub success_url: String, // Mandatory
    pub cancel_url: String,  // Mandatory
    pub default_currency: Option<String>,
}

// --- Mercado Pago Config ---
// Access token loaded directly from env var: MERCADOPAGO_ACCESS_TOKEN
// Webhook secret loaded directly from env var: MERCADOPAGO_WEBHOOK_SECRET
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MercadoPagoConfig {
    pub success_url: String,
    pub failure_url: String,
    pub pending_url: String,
    pub notification_url: String, // where MP posts webhooks
    pub default_currency: Option<String>,
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GcalConfig {
    pub key_path: Option<String>,    // service account JSON key file
    pub calendar_id: Option<String>, // commercial team calendar
}

// --- Commercial Scheduling Config ---
// Working hours themselves live in the configuracoes table; these are the
// scheduling mechanics that do not change at runtime.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ComercialConfig {
    #[serde(default = "default_duration")]
    pub duracao_padrao_minutos: i64,
    #[serde(default)]
    pub buffer_minutos: i64,
    #[serde(default = "default_step")]
    pub step_minutos: i64,
    #[serde(default = "default_valor_consulta")]
    pub valor_consulta_cents: i64, // 0 means free consultations
}

impl Default for ComercialConfig {
    fn default() -> Self {
        Self {
            duracao_padrao_minutos: default_duration(),
            buffer_minutos: 0,
            step_minutos: default_step(),
            valor_consulta_cents: default_valor_consulta(),
        }
    }
}

fn default_duration() -> i64 {
    30
}
fn default_step() -> i64 {
    15
}
fn default_valor_consulta() -> i64 {
    0
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_stripe: bool,
    #[serde(default)]
    pub use_mercado_pago: bool,
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_storage: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub storage: Option<StorageConfig>,
    #[serde(default)]
    pub stripe: Option<StripeConfig>,
    #[serde(default)]
    pub mercado_pago: Option<MercadoPagoConfig>,
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub comercial: Option<ComercialConfig>,
}
