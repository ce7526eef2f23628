// --- File: crates/bora_juridico/src/handlers.rs ---
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use bora_common::{DocumentoStatus, HttpStatusCode};
use bora_config::AppConfig;
use bora_db::repositories::{
    documentos::Documento,
    juridico::{FormularioJuridico, NewFormularioJuridico, NewNotaJuridico, NotaJuridico},
    processos::{NewProcesso, NewRequerimento, Processo, Requerimento, UpdateProcesso},
    DocumentosRepository, JuridicoRepository, ProcessosRepository, SqlDocumentosRepository,
    SqlJuridicoRepository, SqlProcessosRepository,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::JuridicoError;
use crate::logic::{check_transition, validate_processo_status};

#[derive(Clone)]
pub struct JuridicoState {
    pub config: Arc<AppConfig>,
    pub processos: SqlProcessosRepository,
    pub documentos: SqlDocumentosRepository,
    pub juridico: SqlJuridicoRepository,
}

fn into_http(err: JuridicoError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}

// --- Processos ---

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/juridico/processos",
    responses(
        (status = 201, description = "Processo opened"),
        (status = 400, description = "Missing tipo_servico")
    ),
    tag = "Juridico"
))]
pub async fn create_processo_handler(
    State(state): State<Arc<JuridicoState>>,
    Json(payload): Json<NewProcesso>,
) -> Result<(StatusCode, Json<Processo>), (StatusCode, String)> {
    if payload.tipo_servico.trim().is_empty() {
        return Err(into_http(JuridicoError::ValidationError(
            "tipo_servico is required".to_string(),
        )));
    }

    let processo = state
        .processos
        .create(payload)
        .await
        .map_err(|e| into_http(e.into()))?;

    info!("Processo {} opened for cliente {}", processo.id, processo.cliente_id);
    Ok((StatusCode::CREATED, Json(processo)))
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct ListProcessosQuery {
    pub status: Option<String>,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/juridico/processos",
    params(ListProcessosQuery),
    responses((status = 200, description = "Processos, optionally filtered by status")),
    tag = "Juridico"
))]
pub async fn list_processos_handler(
    State(state): State<Arc<JuridicoState>>,
    Query(query): Query<ListProcessosQuery>,
) -> Result<Json<Vec<Processo>>, (StatusCode, String)> {
    if let Some(ref status) = query.status {
        validate_processo_status(status).map_err(into_http)?;
    }

    state
        .processos
        .list_all(query.status.as_deref())
        .await
        .map(Json)
        .map_err(|e| into_http(e.into()))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/juridico/processos/{id}",
    params(("id" = Uuid, Path, description = "Processo id")),
    responses(
        (status = 200, description = "Processo"),
        (status = 404, description = "Unknown processo")
    ),
    tag = "Juridico"
))]
pub async fn get_processo_handler(
    State(state): State<Arc<JuridicoState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Processo>, (StatusCode, String)> {
    state
        .processos
        .find_by_id(id)
        .await
        .map_err(|e| into_http(e.into()))?
        .map(Json)
        .ok_or_else(|| into_http(JuridicoError::NotFound(format!("processo {id}"))))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/juridico/processos/{id}",
    params(("id" = Uuid, Path, description = "Processo id")),
    responses(
        (status = 200, description = "Processo updated"),
        (status = 400, description = "Unknown processo status"),
        (status = 404, description = "Unknown processo")
    ),
    tag = "Juridico"
))]
pub async fn update_processo_handler(
    State(state): State<Arc<JuridicoState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProcesso>,
) -> Result<Json<Processo>, (StatusCode, String)> {
    if let Some(ref status) = payload.status {
        validate_processo_status(status).map_err(into_http)?;
    }

    state
        .processos
        .update(id, payload)
        .await
        .map_err(|e| into_http(e.into()))?
        .map(Json)
        .ok_or_else(|| into_http(JuridicoError::NotFound(format!("processo {id}"))))
}

// --- Document review ---

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct ReviewQueueQuery {
    /// Workflow status to list, e.g. `PENDING` or `ANALYZING_TRANSLATION`.
    pub status: String,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/juridico/documentos",
    params(ReviewQueueQuery),
    responses(
        (status = 200, description = "Documentos in the requested workflow state"),
        (status = 400, description = "Unknown documento status")
    ),
    tag = "Juridico"
))]
pub async fn review_queue_handler(
    State(state): State<Arc<JuridicoState>>,
    Query(query): Query<ReviewQueueQuery>,
) -> Result<Json<Vec<Documento>>, (StatusCode, String)> {
    let status: DocumentoStatus = query
        .status
        .parse()
        .map_err(|_| into_http(JuridicoError::InvalidStatus(query.status.clone())))?;

    state
        .documentos
        .list_by_status(status)
        .await
        .map(Json)
        .map_err(|e| into_http(e.into()))
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatusChangeRequest {
    pub status: DocumentoStatus,
    pub observacao: Option<String>,
}

/// Moves a documento through the review workflow. The transition is checked
/// against the state machine before anything is written; a disallowed move
/// returns 409 with the allowed targets in the message.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/juridico/documentos/{id}/status",
    params(("id" = Uuid, Path, description = "Documento id")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 404, description = "Unknown documento"),
        (status = 409, description = "Transition not allowed from the current status")
    ),
    tag = "Juridico"
))]
pub async fn change_documento_status_handler(
    State(state): State<Arc<JuridicoState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusChangeRequest>,
) -> Result<Json<Documento>, (StatusCode, String)> {
    let documento = state
        .documentos
        .find_by_id(id)
        .await
        .map_err(|e| into_http(e.into()))?
        .ok_or_else(|| into_http(JuridicoError::NotFound(format!("documento {id}"))))?;

    if let Err(e) = check_transition(&documento.status, payload.status) {
        warn!(
            "Rejected transition {} -> {} for documento {}",
            documento.status, payload.status, id
        );
        return Err(into_http(e));
    }

    let updated = state
        .documentos
        .update_status(id, payload.status, payload.observacao.as_deref())
        .await
        .map_err(|e| into_http(e.into()))?
        .ok_or_else(|| into_http(JuridicoError::NotFound(format!("documento {id}"))))?;

    info!(
        "Documento {} moved {} -> {}",
        id, documento.status, updated.status
    );
    Ok(Json(updated))
}

// --- Notas ---

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/juridico/processos/{id}/notas",
    params(("id" = Uuid, Path, description = "Processo id")),
    responses(
        (status = 201, description = "Nota recorded"),
        (status = 404, description = "Unknown processo")
    ),
    tag = "Juridico"
))]
pub async fn add_nota_handler(
    State(state): State<Arc<JuridicoState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewNotaJuridico>,
) -> Result<(StatusCode, Json<NotaJuridico>), (StatusCode, String)> {
    ensure_processo_exists(&state, id).await?;

    if payload.conteudo.trim().is_empty() {
        return Err(into_http(JuridicoError::ValidationError(
            "conteudo is required".to_string(),
        )));
    }

    let nota = state
        .juridico
        .add_nota(id, payload)
        .await
        .map_err(|e| into_http(e.into()))?;

    Ok((StatusCode::CREATED, Json(nota)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/juridico/processos/{id}/notas",
    params(("id" = Uuid, Path, description = "Processo id")),
    responses((status = 200, description = "Notas for the processo, newest first")),
    tag = "Juridico"
))]
pub async fn list_notas_handler(
    State(state): State<Arc<JuridicoState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<NotaJuridico>>, (StatusCode, String)> {
    ensure_processo_exists(&state, id).await?;
    state
        .juridico
        .list_notas(id)
        .await
        .map(Json)
        .map_err(|e| into_http(e.into()))
}

// --- Formularios ---

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/juridico/processos/{id}/formularios",
    params(("id" = Uuid, Path, description = "Processo id")),
    responses(
        (status = 201, description = "Formulario created"),
        (status = 404, description = "Unknown processo")
    ),
    tag = "Juridico"
))]
pub async fn create_formulario_handler(
    State(state): State<Arc<JuridicoState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewFormularioJuridico>,
) -> Result<(StatusCode, Json<FormularioJuridico>), (StatusCode, String)> {
    ensure_processo_exists(&state, id).await?;

    if payload.titulo.trim().is_empty() {
        return Err(into_http(JuridicoError::ValidationError(
            "titulo is required".to_string(),
        )));
    }

    let formulario = state
        .juridico
        .create_formulario(id, payload)
        .await
        .map_err(|e| into_http(e.into()))?;

    Ok((StatusCode::CREATED, Json(formulario)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/juridico/processos/{id}/formularios",
    params(("id" = Uuid, Path, description = "Processo id")),
    responses((status = 200, description = "Formularios for the processo")),
    tag = "Juridico"
))]
pub async fn list_formularios_handler(
    State(state): State<Arc<JuridicoState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<FormularioJuridico>>, (StatusCode, String)> {
    ensure_processo_exists(&state, id).await?;
    state
        .juridico
        .list_formularios(id)
        .await
        .map(Json)
        .map_err(|e| into_http(e.into()))
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PreencherRequest {
    pub campos: serde_json::Value,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/juridico/formularios/{id}/preencher",
    params(("id" = Uuid, Path, description = "Formulario id")),
    request_body = PreencherRequest,
    responses(
        (status = 200, description = "Formulario filled in"),
        (status = 404, description = "Unknown formulario")
    ),
    tag = "Juridico"
))]
pub async fn preencher_formulario_handler(
    State(state): State<Arc<JuridicoState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PreencherRequest>,
) -> Result<Json<FormularioJuridico>, (StatusCode, String)> {
    state
        .juridico
        .preencher_formulario(id, payload.campos)
        .await
        .map_err(|e| into_http(e.into()))?
        .map(Json)
        .ok_or_else(|| into_http(JuridicoError::NotFound(format!("formulario {id}"))))
}

// --- Requerimentos ---

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/juridico/processos/{id}/requerimentos",
    params(("id" = Uuid, Path, description = "Processo id")),
    responses(
        (status = 201, description = "Requerimento recorded"),
        (status = 404, description = "Unknown processo")
    ),
    tag = "Juridico"
))]
pub async fn add_requerimento_handler(
    State(state): State<Arc<JuridicoState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewRequerimento>,
) -> Result<(StatusCode, Json<Requerimento>), (StatusCode, String)> {
    ensure_processo_exists(&state, id).await?;

    if payload.titulo.trim().is_empty() {
        return Err(into_http(JuridicoError::ValidationError(
            "titulo is required".to_string(),
        )));
    }

    let requerimento = state
        .processos
        .add_requerimento(id, payload)
        .await
        .map_err(|e| into_http(e.into()))?;

    Ok((StatusCode::CREATED, Json(requerimento)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/juridico/processos/{id}/requerimentos",
    params(("id" = Uuid, Path, description = "Processo id")),
    responses((status = 200, description = "Requerimentos for the processo")),
    tag = "Juridico"
))]
pub async fn list_requerimentos_handler(
    State(state): State<Arc<JuridicoState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Requerimento>>, (StatusCode, String)> {
    ensure_processo_exists(&state, id).await?;
    state
        .processos
        .list_requerimentos(id)
        .await
        .map(Json)
        .map_err(|e| into_http(e.into()))
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AtenderResponse {
    pub atendido: bool,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/juridico/requerimentos/{id}/atender",
    params(("id" = Uuid, Path, description = "Requerimento id")),
    responses(
        (status = 200, description = "Requerimento marked as atendido", body = AtenderResponse),
        (status = 404, description = "Unknown requerimento")
    ),
    tag = "Juridico"
))]
pub async fn atender_requerimento_handler(
    State(state): State<Arc<JuridicoState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AtenderResponse>, (StatusCode, String)> {
    let atendido = state
        .processos
        .atender_requerimento(id)
        .await
        .map_err(|e| into_http(e.into()))?;

    if atendido {
        Ok(Json(AtenderResponse { atendido }))
    } else {
        Err(into_http(JuridicoError::NotFound(format!(
            "requerimento {id}"
        ))))
    }
}

async fn ensure_processo_exists(
    state: &JuridicoState,
    id: Uuid,
) -> Result<(), (StatusCode, String)> {
    state
        .processos
        .find_by_id(id)
        .await
        .map_err(|e| into_http(e.into()))?
        .map(|_| ())
        .ok_or_else(|| into_http(JuridicoError::NotFound(format!("processo {id}"))))
}
