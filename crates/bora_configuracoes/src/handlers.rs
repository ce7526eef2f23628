// --- File: crates/bora_configuracoes/src/handlers.rs ---
use axum::{extract::State, http::StatusCode, response::Json};
use bora_common::HttpStatusCode;
use bora_config::AppConfig;
use bora_db::repositories::{
    configuracoes::{Configuracoes, UpdateConfiguracoes},
    ConfiguracoesRepository, SqlConfiguracoesRepository,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::error::ConfiguracoesError;
use crate::logic::validate_update;

#[derive(Clone)]
pub struct ConfiguracoesState {
    pub config: Arc<AppConfig>,
    pub configuracoes: SqlConfiguracoesRepository,
}

fn into_http(err: ConfiguracoesError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/configuracoes",
    responses((status = 200, description = "Current platform settings", body = Configuracoes)),
    tag = "Configuracoes"
))]
pub async fn get_configuracoes_handler(
    State(state): State<Arc<ConfiguracoesState>>,
) -> Result<Json<Configuracoes>, (StatusCode, String)> {
    state
        .configuracoes
        .get()
        .await
        .map(Json)
        .map_err(|e| into_http(e.into()))
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateConfiguracoesRequest {
    pub markup_percent: Option<i64>,
    pub moeda: Option<String>,
    pub horario_inicio: Option<String>,
    pub horario_fim: Option<String>,
    pub dias_uteis: Option<String>,
}

/// Partial settings update. Every rule is checked against the row as it
/// would look after the patch.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/configuracoes",
    request_body = UpdateConfiguracoesRequest,
    responses(
        (status = 200, description = "Updated settings", body = Configuracoes),
        (status = 400, description = "Invalid settings")
    ),
    tag = "Configuracoes"
))]
pub async fn update_configuracoes_handler(
    State(state): State<Arc<ConfiguracoesState>>,
    Json(payload): Json<UpdateConfiguracoesRequest>,
) -> Result<Json<Configuracoes>, (StatusCode, String)> {
    let update = UpdateConfiguracoes {
        markup_percent: payload.markup_percent,
        moeda: payload.moeda,
        horario_inicio: payload.horario_inicio,
        horario_fim: payload.horario_fim,
        dias_uteis: payload.dias_uteis,
    };

    let current = state
        .configuracoes
        .get()
        .await
        .map_err(|e| into_http(e.into()))?;
    validate_update(&current, &update).map_err(into_http)?;

    let updated = state
        .configuracoes
        .update(update)
        .await
        .map_err(|e| into_http(e.into()))?;

    info!("Platform settings updated");
    Ok(Json(updated))
}
