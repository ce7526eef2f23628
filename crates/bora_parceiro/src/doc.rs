// --- File: crates/bora_parceiro/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use crate::handlers::{IndicacoesResponse, LeadRequest, RegisterParceiroRequest};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::register_parceiro_handler,
        crate::handlers::get_parceiro_handler,
        crate::handlers::create_lead_handler,
        crate::handlers::list_indicacoes_handler,
    ),
    components(schemas(RegisterParceiroRequest, LeadRequest, IndicacoesResponse)),
    tags(
        (name = "Parceiro", description = "Referral partners, leads and stats")
    )
)]
pub struct ParceiroApiDoc;
