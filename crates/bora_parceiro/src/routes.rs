// --- File: crates/bora_parceiro/src/routes.rs ---

use crate::handlers::{
    create_lead_handler, get_parceiro_handler, list_indicacoes_handler, register_parceiro_handler,
    ParceiroState,
};
use axum::{
    routing::{get, post},
    Router,
};
use bora_config::AppConfig;
use bora_db::repositories::{SqlClientesRepository, SqlParceirosRepository};
use bora_db::DbClient;
use std::sync::Arc;

/// Creates a router containing all partner routes.
pub fn routes(config: Arc<AppConfig>, db_client: DbClient) -> Router {
    let state = Arc::new(ParceiroState {
        config,
        parceiros: SqlParceirosRepository::new(db_client.clone()),
        clientes: SqlClientesRepository::new(db_client),
    });

    Router::new()
        .route("/parceiro", post(register_parceiro_handler))
        .route("/parceiro/{id}", get(get_parceiro_handler))
        .route("/parceiro/{id}/leads", post(create_lead_handler))
        .route("/parceiro/{id}/indicacoes", get(list_indicacoes_handler))
        .with_state(state)
}
