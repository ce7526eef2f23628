// --- File: crates/bora_configuracoes/src/routes.rs ---

use crate::handlers::{
    get_configuracoes_handler, update_configuracoes_handler, ConfiguracoesState,
};
use axum::{routing::get, Router};
use bora_config::AppConfig;
use bora_db::repositories::SqlConfiguracoesRepository;
use bora_db::DbClient;
use std::sync::Arc;

/// Creates a router containing the settings routes.
pub fn routes(config: Arc<AppConfig>, db_client: DbClient) -> Router {
    let state = Arc::new(ConfiguracoesState {
        config,
        configuracoes: SqlConfiguracoesRepository::new(db_client),
    });

    Router::new()
        .route(
            "/configuracoes",
            get(get_configuracoes_handler).put(update_configuracoes_handler),
        )
        .with_state(state)
}
