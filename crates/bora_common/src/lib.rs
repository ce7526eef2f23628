// --- File: crates/bora_common/src/lib.rs ---

pub mod error; // Error taxonomy
pub mod features; // Runtime feature flags
pub mod http; // HTTP utilities + shared client
pub mod logging; // Tracing setup
pub mod models; // Status state machines
pub mod services; // Service abstractions (calendar, fulfillment)

pub use error::{
    conflict, external_service_error, internal_error, not_found, validation_error, BoraError,
    HttpStatusCode,
};

pub use http::{
    client::{create_client, HTTP_CLIENT},
    handle_json_result, map_json_error, IntoHttpResponse,
};

pub use models::{AgendamentoStatus, DocumentoStatus, OrcamentoStatus};

pub use features::{
    is_feature_enabled, is_gcal_enabled, is_mercado_pago_enabled, is_storage_enabled,
    is_stripe_enabled,
};
