// --- File: crates/bora_configuracoes/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use crate::handlers::UpdateConfiguracoesRequest;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_configuracoes_handler,
        crate::handlers::update_configuracoes_handler,
    ),
    components(schemas(UpdateConfiguracoesRequest)),
    tags(
        (name = "Configuracoes", description = "Platform settings")
    )
)]
pub struct ConfiguracoesApiDoc;
