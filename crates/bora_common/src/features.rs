//! Runtime feature flag handling.
//!
//! Integrations are toggled in two ways: compile-time cargo features on the
//! backend binary, and runtime `use_*` flags in the configuration. A feature
//! is considered enabled only when its flag is set AND its config section is
//! present.

use bora_config::AppConfig;
use std::sync::Arc;

/// Check if a feature is enabled at runtime based on configuration.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

pub fn is_stripe_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config.use_stripe, config.stripe.as_ref())
}

pub fn is_mercado_pago_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config.use_mercado_pago, config.mercado_pago.as_ref())
}

pub fn is_gcal_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config.use_gcal, config.gcal.as_ref())
}

pub fn is_storage_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config.use_storage, config.storage.as_ref())
}
