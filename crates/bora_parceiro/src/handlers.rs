// --- File: crates/bora_parceiro/src/handlers.rs ---
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use bora_common::HttpStatusCode;
use bora_config::AppConfig;
use bora_db::repositories::{
    clientes::{Cliente, NewCliente},
    parceiros::{NewParceiro, Parceiro},
    ClientesRepository, ParceirosRepository, SqlClientesRepository, SqlParceirosRepository,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::ParceiroError;
use crate::logic::{validate_lead, validate_parceiro};

#[derive(Clone)]
pub struct ParceiroState {
    pub config: Arc<AppConfig>,
    pub parceiros: SqlParceirosRepository,
    pub clientes: SqlClientesRepository,
}

fn into_http(err: ParceiroError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterParceiroRequest {
    pub nome: String,
    pub email: String,
    #[serde(default)]
    pub percentual_comissao: i64,
}

/// Registers a referral partner.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/parceiro",
    request_body = RegisterParceiroRequest,
    responses(
        (status = 201, description = "Partner registered", body = Parceiro),
        (status = 400, description = "Bad request"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Parceiro"
))]
pub async fn register_parceiro_handler(
    State(state): State<Arc<ParceiroState>>,
    Json(payload): Json<RegisterParceiroRequest>,
) -> Result<(StatusCode, Json<Parceiro>), (StatusCode, String)> {
    validate_parceiro(&payload.nome, &payload.email, payload.percentual_comissao)
        .map_err(into_http)?;

    if state
        .parceiros
        .find_by_email(&payload.email)
        .await
        .map_err(|e| into_http(e.into()))?
        .is_some()
    {
        return Err(into_http(ParceiroError::DuplicateEmail(payload.email)));
    }

    let parceiro = state
        .parceiros
        .create(NewParceiro {
            nome: payload.nome,
            email: payload.email,
            percentual_comissao: payload.percentual_comissao,
        })
        .await
        .map_err(|e| into_http(e.into()))?;

    info!("Parceiro {} registered", parceiro.id);
    Ok((StatusCode::CREATED, Json(parceiro)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/parceiro/{id}",
    params(("id" = Uuid, Path, description = "Parceiro id")),
    responses(
        (status = 200, description = "Partner details", body = Parceiro),
        (status = 404, description = "Unknown partner")
    ),
    tag = "Parceiro"
))]
pub async fn get_parceiro_handler(
    State(state): State<Arc<ParceiroState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Parceiro>, (StatusCode, String)> {
    find_parceiro(&state, id).await.map(Json)
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LeadRequest {
    pub nome: String,
    pub email: String,
    pub telefone: Option<String>,
}

/// Turns a lead referred by a partner into a cliente with
/// `origem = "parceiro"` and the partner id attached.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/parceiro/{id}/leads",
    params(("id" = Uuid, Path, description = "Parceiro id")),
    request_body = LeadRequest,
    responses(
        (status = 201, description = "Lead registered as cliente", body = Cliente),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Unknown partner"),
        (status = 409, description = "Email already registered or partner inactive")
    ),
    tag = "Parceiro"
))]
pub async fn create_lead_handler(
    State(state): State<Arc<ParceiroState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LeadRequest>,
) -> Result<(StatusCode, Json<Cliente>), (StatusCode, String)> {
    validate_lead(&payload.nome, &payload.email).map_err(into_http)?;

    let parceiro = find_parceiro(&state, id).await?;
    if !parceiro.ativo {
        return Err(into_http(ParceiroError::Inactive(id)));
    }

    if state
        .clientes
        .find_by_email(&payload.email)
        .await
        .map_err(|e| into_http(e.into()))?
        .is_some()
    {
        return Err(into_http(ParceiroError::DuplicateLead(payload.email)));
    }

    let cliente = state
        .clientes
        .create(NewCliente {
            nome: payload.nome,
            email: payload.email,
            telefone: payload.telefone,
            origem: "parceiro".to_string(),
            parceiro_id: Some(id),
        })
        .await
        .map_err(|e| into_http(e.into()))?;

    info!("Lead {} registered for parceiro {}", cliente.id, id);
    Ok((StatusCode::CREATED, Json(cliente)))
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct IndicacoesResponse {
    pub total: usize,
    pub indicacoes: Vec<Cliente>,
}

/// Referral list and count for a partner's dashboard.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/parceiro/{id}/indicacoes",
    params(("id" = Uuid, Path, description = "Parceiro id")),
    responses(
        (status = 200, description = "Referred clientes", body = IndicacoesResponse),
        (status = 404, description = "Unknown partner")
    ),
    tag = "Parceiro"
))]
pub async fn list_indicacoes_handler(
    State(state): State<Arc<ParceiroState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<IndicacoesResponse>, (StatusCode, String)> {
    find_parceiro(&state, id).await?;

    let indicacoes = state
        .clientes
        .list_by_parceiro(id)
        .await
        .map_err(|e| into_http(e.into()))?;

    Ok(Json(IndicacoesResponse {
        total: indicacoes.len(),
        indicacoes,
    }))
}

async fn find_parceiro(
    state: &ParceiroState,
    id: Uuid,
) -> Result<Parceiro, (StatusCode, String)> {
    state
        .parceiros
        .find_by_id(id)
        .await
        .map_err(|e| into_http(e.into()))?
        .ok_or_else(|| into_http(ParceiroError::NotFound(format!("parceiro {id}"))))
}
