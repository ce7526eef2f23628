// --- File: crates/bora_traducoes/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use crate::handlers::{AprovarRequest, AprovarResponse, CreateOrcamentoRequest};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::create_orcamento_handler,
        crate::handlers::get_orcamento_handler,
        crate::handlers::list_orcamentos_handler,
        crate::handlers::aprovar_orcamento_handler,
        crate::handlers::rejeitar_orcamento_handler,
    ),
    components(schemas(CreateOrcamentoRequest, AprovarRequest, AprovarResponse)),
    tags(
        (name = "Traducoes", description = "Translation quotes with markup and approval flow")
    )
)]
pub struct TraducoesApiDoc;
