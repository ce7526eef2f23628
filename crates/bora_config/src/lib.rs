// --- File: crates/bora_config/src/lib.rs ---

pub mod models;

pub use models::*;

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;

static DOTENV_LOADED: OnceCell<()> = OnceCell::new();

/// Loads `.env` exactly once per process. Missing files are fine; env vars
/// set by the host always win.
pub fn ensure_dotenv_loaded() {
    DOTENV_LOADED.get_or_init(|| {
        let _ = dotenv::dotenv();
    });
}

/// Loads the application configuration.
///
/// Sources, later ones overriding earlier ones:
/// 1. `config/default` (yml/toml/json, optional)
/// 2. `config/{RUN_ENV}` (optional, e.g. `config/production`)
/// 3. Environment variables with the `APP` prefix and `__` separator
///    (e.g. `APP__SERVER__PORT=8086`, `APP__DATABASE__URL=postgres://...`).
///
/// Secrets (payment keys, storage service key) are never part of the file
/// config; feature crates read them from their own env vars.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

    let config = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_env}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_config() {
        let cfg: AppConfig = serde_json::from_str(
            r#"{"server": {"host": "127.0.0.1", "port": 8086}}"#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8086);
        assert!(!cfg.use_stripe);
        assert!(cfg.database.is_none());
    }

    #[test]
    fn comercial_defaults_apply() {
        let cfg: ComercialConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.duracao_padrao_minutos, 30);
        assert_eq!(cfg.step_minutos, 15);
        assert_eq!(cfg.buffer_minutos, 0);
        assert_eq!(cfg.valor_consulta_cents, 0);
    }
}
