// --- File: crates/bora_cliente/src/routes.rs ---

use crate::handlers::{
    add_dependente_handler, cadastro_handler, delete_documento_handler,
    download_documento_handler, get_cliente_handler, list_dependentes_handler,
    list_documentos_handler, list_processos_handler, upload_documento_handler, ClienteState,
};
use axum::{
    routing::{delete, get, post},
    Router,
};
use bora_config::AppConfig;
use bora_db::repositories::{
    SqlClientesRepository, SqlDocumentosRepository, SqlProcessosRepository,
};
use bora_db::DbClient;
use bora_storage::StorageClient;
use std::sync::Arc;

/// Creates a router containing all cliente-facing routes.
pub fn routes(
    config: Arc<AppConfig>,
    db_client: DbClient,
    storage: Option<StorageClient>,
) -> Router {
    let state = Arc::new(ClienteState {
        config,
        clientes: SqlClientesRepository::new(db_client.clone()),
        processos: SqlProcessosRepository::new(db_client.clone()),
        documentos: SqlDocumentosRepository::new(db_client),
        storage,
    });

    Router::new()
        .route("/cliente/cadastro", post(cadastro_handler))
        .route("/cliente/{id}", get(get_cliente_handler))
        .route(
            "/cliente/{id}/dependentes",
            post(add_dependente_handler).get(list_dependentes_handler),
        )
        .route("/cliente/{id}/processos", get(list_processos_handler))
        .route(
            "/cliente/{id}/documentos",
            post(upload_documento_handler).get(list_documentos_handler),
        )
        .route(
            "/cliente/documentos/{id}",
            delete(delete_documento_handler),
        )
        .route(
            "/cliente/documentos/{id}/download",
            get(download_documento_handler),
        )
        .with_state(state)
}
