// --- File: crates/bora_cliente/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use crate::handlers::{CadastroRequest, UploadResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::cadastro_handler,
        crate::handlers::get_cliente_handler,
        crate::handlers::add_dependente_handler,
        crate::handlers::list_dependentes_handler,
        crate::handlers::list_processos_handler,
        crate::handlers::list_documentos_handler,
        crate::handlers::upload_documento_handler,
        crate::handlers::download_documento_handler,
        crate::handlers::delete_documento_handler,
    ),
    components(schemas(CadastroRequest, UploadResponse)),
    tags(
        (name = "Cliente", description = "Client intake, dependents and document upload")
    )
)]
pub struct ClienteApiDoc;
