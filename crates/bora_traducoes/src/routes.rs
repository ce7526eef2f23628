// --- File: crates/bora_traducoes/src/routes.rs ---

use crate::handlers::{
    aprovar_orcamento_handler, create_orcamento_handler, get_orcamento_handler,
    list_orcamentos_handler, rejeitar_orcamento_handler, TraducoesState,
};
use axum::{
    routing::{get, post},
    Router,
};
use bora_common::services::CheckoutProviders;
use bora_config::AppConfig;
use bora_db::repositories::{
    SqlClientesRepository, SqlConfiguracoesRepository, SqlDocumentosRepository,
    SqlOrcamentosRepository,
};
use bora_db::DbClient;
use std::sync::Arc;

/// Creates a router containing all translation-quote routes.
pub fn routes(config: Arc<AppConfig>, db_client: DbClient, checkout: CheckoutProviders) -> Router {
    let state = Arc::new(TraducoesState {
        config,
        documentos: SqlDocumentosRepository::new(db_client.clone()),
        orcamentos: SqlOrcamentosRepository::new(db_client.clone()),
        configuracoes: SqlConfiguracoesRepository::new(db_client.clone()),
        clientes: SqlClientesRepository::new(db_client),
        checkout,
    });

    Router::new()
        .route("/traducoes/orcamentos", post(create_orcamento_handler))
        .route("/traducoes/orcamentos/{id}", get(get_orcamento_handler))
        .route(
            "/traducoes/documentos/{id}/orcamentos",
            get(list_orcamentos_handler),
        )
        .route(
            "/traducoes/orcamentos/{id}/aprovar",
            post(aprovar_orcamento_handler),
        )
        .route(
            "/traducoes/orcamentos/{id}/rejeitar",
            post(rejeitar_orcamento_handler),
        )
        .with_state(state)
}
