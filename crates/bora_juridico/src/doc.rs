// --- File: crates/bora_juridico/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use crate::handlers::{AtenderResponse, PreencherRequest, StatusChangeRequest};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::create_processo_handler,
        crate::handlers::list_processos_handler,
        crate::handlers::get_processo_handler,
        crate::handlers::update_processo_handler,
        crate::handlers::review_queue_handler,
        crate::handlers::change_documento_status_handler,
        crate::handlers::add_nota_handler,
        crate::handlers::list_notas_handler,
        crate::handlers::create_formulario_handler,
        crate::handlers::list_formularios_handler,
        crate::handlers::preencher_formulario_handler,
        crate::handlers::add_requerimento_handler,
        crate::handlers::list_requerimentos_handler,
        crate::handlers::atender_requerimento_handler,
    ),
    components(schemas(StatusChangeRequest, PreencherRequest, AtenderResponse)),
    tags(
        (name = "Juridico", description = "Legal case management and document review")
    )
)]
pub struct JuridicoApiDoc;
