// --- File: crates/bora_juridico/src/routes.rs ---

use crate::handlers::{
    add_nota_handler, add_requerimento_handler, atender_requerimento_handler,
    change_documento_status_handler, create_formulario_handler, create_processo_handler,
    get_processo_handler, list_formularios_handler, list_notas_handler, list_processos_handler,
    list_requerimentos_handler, preencher_formulario_handler, review_queue_handler,
    update_processo_handler, JuridicoState,
};
use axum::{
    routing::{get, post},
    Router,
};
use bora_config::AppConfig;
use bora_db::repositories::{
    SqlDocumentosRepository, SqlJuridicoRepository, SqlProcessosRepository,
};
use bora_db::DbClient;
use std::sync::Arc;

/// Creates a router containing all legal-team routes.
pub fn routes(config: Arc<AppConfig>, db_client: DbClient) -> Router {
    let state = Arc::new(JuridicoState {
        config,
        processos: SqlProcessosRepository::new(db_client.clone()),
        documentos: SqlDocumentosRepository::new(db_client.clone()),
        juridico: SqlJuridicoRepository::new(db_client),
    });

    Router::new()
        .route(
            "/juridico/processos",
            post(create_processo_handler).get(list_processos_handler),
        )
        .route(
            "/juridico/processos/{id}",
            get(get_processo_handler).patch(update_processo_handler),
        )
        .route("/juridico/documentos", get(review_queue_handler))
        .route(
            "/juridico/documentos/{id}/status",
            post(change_documento_status_handler),
        )
        .route(
            "/juridico/processos/{id}/notas",
            post(add_nota_handler).get(list_notas_handler),
        )
        .route(
            "/juridico/processos/{id}/formularios",
            post(create_formulario_handler).get(list_formularios_handler),
        )
        .route(
            "/juridico/formularios/{id}/preencher",
            post(preencher_formulario_handler),
        )
        .route(
            "/juridico/processos/{id}/requerimentos",
            post(add_requerimento_handler).get(list_requerimentos_handler),
        )
        .route(
            "/juridico/requerimentos/{id}/atender",
            post(atender_requerimento_handler),
        )
        .with_state(state)
}
