// --- File: crates/bora_cliente/src/handlers.rs ---
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Json, Redirect},
};
use bora_common::HttpStatusCode;
use bora_config::AppConfig;
use bora_db::repositories::{
    clientes::{Cliente, Dependente, NewCliente, NewDependente},
    documentos::{Documento, NewDocumento},
    processos::Processo,
    ClientesRepository, DocumentosRepository, ProcessosRepository, SqlClientesRepository,
    SqlDocumentosRepository, SqlProcessosRepository,
};
use bora_storage::StorageClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ClienteError;
use crate::logic::{ensure_removable, validate_cadastro, validate_upload};

#[derive(Clone)]
pub struct ClienteState {
    pub config: Arc<AppConfig>,
    pub clientes: SqlClientesRepository,
    pub processos: SqlProcessosRepository,
    pub documentos: SqlDocumentosRepository,
    pub storage: Option<StorageClient>,
}

fn into_http(err: ClienteError) -> (StatusCode, String) {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CadastroRequest {
    pub nome: String,
    pub email: String,
    pub telefone: Option<String>,
    pub parceiro_id: Option<Uuid>,
}

/// Registers a new cliente. Came through a partner when `parceiro_id` is set.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/cliente/cadastro",
    request_body = CadastroRequest,
    responses(
        (status = 201, description = "Cliente registered"),
        (status = 400, description = "Invalid nome or email"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Cliente"
))]
pub async fn cadastro_handler(
    State(state): State<Arc<ClienteState>>,
    Json(payload): Json<CadastroRequest>,
) -> Result<(StatusCode, Json<Cliente>), (StatusCode, String)> {
    validate_cadastro(&payload.nome, &payload.email).map_err(into_http)?;

    if let Some(existing) = state
        .clientes
        .find_by_email(payload.email.trim())
        .await
        .map_err(|e| into_http(e.into()))?
    {
        warn!("Cadastro rejected, email already in use: {}", existing.email);
        return Err(into_http(ClienteError::DuplicateEmail(payload.email)));
    }

    let origem = if payload.parceiro_id.is_some() {
        "parceiro"
    } else {
        "direto"
    };

    let cliente = state
        .clientes
        .create(NewCliente {
            nome: payload.nome.trim().to_string(),
            email: payload.email.trim().to_string(),
            telefone: payload.telefone,
            origem: origem.to_string(),
            parceiro_id: payload.parceiro_id,
        })
        .await
        .map_err(|e| into_http(e.into()))?;

    info!("Cliente registered: {} ({})", cliente.id, cliente.origem);
    Ok((StatusCode::CREATED, Json(cliente)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/cliente/{id}",
    params(("id" = Uuid, Path, description = "Cliente id")),
    responses(
        (status = 200, description = "Cliente profile"),
        (status = 404, description = "Unknown cliente")
    ),
    tag = "Cliente"
))]
pub async fn get_cliente_handler(
    State(state): State<Arc<ClienteState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Cliente>, (StatusCode, String)> {
    state
        .clientes
        .find_by_id(id)
        .await
        .map_err(|e| into_http(e.into()))?
        .map(Json)
        .ok_or_else(|| into_http(ClienteError::NotFound(format!("cliente {id}"))))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/cliente/{id}/dependentes",
    params(("id" = Uuid, Path, description = "Cliente id")),
    responses(
        (status = 201, description = "Dependente added"),
        (status = 404, description = "Unknown cliente")
    ),
    tag = "Cliente"
))]
pub async fn add_dependente_handler(
    State(state): State<Arc<ClienteState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewDependente>,
) -> Result<(StatusCode, Json<Dependente>), (StatusCode, String)> {
    ensure_cliente_exists(&state, id).await?;

    if payload.nome.trim().is_empty() || payload.parentesco.trim().is_empty() {
        return Err(into_http(ClienteError::ValidationError(
            "nome and parentesco are required".to_string(),
        )));
    }

    let dependente = state
        .clientes
        .add_dependente(id, payload)
        .await
        .map_err(|e| into_http(e.into()))?;

    Ok((StatusCode::CREATED, Json(dependente)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/cliente/{id}/dependentes",
    params(("id" = Uuid, Path, description = "Cliente id")),
    responses((status = 200, description = "Dependentes of the cliente")),
    tag = "Cliente"
))]
pub async fn list_dependentes_handler(
    State(state): State<Arc<ClienteState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Dependente>>, (StatusCode, String)> {
    ensure_cliente_exists(&state, id).await?;
    state
        .clientes
        .list_dependentes(id)
        .await
        .map(Json)
        .map_err(|e| into_http(e.into()))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/cliente/{id}/processos",
    params(("id" = Uuid, Path, description = "Cliente id")),
    responses((status = 200, description = "Processos of the cliente")),
    tag = "Cliente"
))]
pub async fn list_processos_handler(
    State(state): State<Arc<ClienteState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Processo>>, (StatusCode, String)> {
    ensure_cliente_exists(&state, id).await?;
    state
        .processos
        .list_by_cliente(id)
        .await
        .map(Json)
        .map_err(|e| into_http(e.into()))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/cliente/{id}/documentos",
    params(("id" = Uuid, Path, description = "Cliente id")),
    responses((status = 200, description = "Documentos of the cliente")),
    tag = "Cliente"
))]
pub async fn list_documentos_handler(
    State(state): State<Arc<ClienteState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Documento>>, (StatusCode, String)> {
    ensure_cliente_exists(&state, id).await?;
    state
        .documentos
        .list_by_cliente(id)
        .await
        .map(Json)
        .map_err(|e| into_http(e.into()))
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UploadResponse {
    pub documento: Documento,
}

/// Multipart upload. Expects a `file` part; an optional `processo_id` part
/// links the documento to an open processo.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/cliente/{id}/documentos",
    params(("id" = Uuid, Path, description = "Cliente id")),
    responses(
        (status = 201, description = "Documento stored, awaiting review", body = UploadResponse),
        (status = 400, description = "Missing file, oversize upload or unsupported content type"),
        (status = 503, description = "Storage not configured")
    ),
    tag = "Cliente"
))]
pub async fn upload_documento_handler(
    State(state): State<Arc<ClienteState>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), (StatusCode, String)> {
    ensure_cliente_exists(&state, id).await?;

    let storage = state
        .storage
        .as_ref()
        .ok_or_else(|| into_http(ClienteError::StorageUnavailable))?;

    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut processo_id: Option<Uuid> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        into_http(ClienteError::ValidationError(format!(
            "malformed multipart body: {e}"
        )))
    })? {
        match field.name() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .unwrap_or("documento")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    into_http(ClienteError::ValidationError(format!(
                        "failed to read file part: {e}"
                    )))
                })?;
                file = Some((filename, content_type, bytes.to_vec()));
            }
            Some("processo_id") => {
                let text = field.text().await.map_err(|e| {
                    into_http(ClienteError::ValidationError(format!(
                        "failed to read processo_id part: {e}"
                    )))
                })?;
                processo_id = Some(text.parse().map_err(|_| {
                    into_http(ClienteError::ValidationError(format!(
                        "'{text}' is not a valid processo id"
                    )))
                })?);
            }
            _ => {}
        }
    }

    let (filename, content_type, bytes) = file.ok_or_else(|| {
        into_http(ClienteError::ValidationError(
            "multipart body must contain a 'file' part".to_string(),
        ))
    })?;

    validate_upload(&content_type, bytes.len()).map_err(into_http)?;

    let key = StorageClient::object_key(id, &filename);
    let size = bytes.len() as i64;
    debug!("Uploading documento '{}' for cliente {}", filename, id);

    storage
        .upload(&key, &content_type, bytes)
        .await
        .map_err(|e| into_http(e.into()))?;

    let documento = state
        .documentos
        .create(NewDocumento {
            cliente_id: id,
            processo_id,
            nome: filename,
            caminho: key,
            content_type,
            tamanho_bytes: size,
        })
        .await
        .map_err(|e| into_http(e.into()))?;

    info!(
        "Documento {} stored for cliente {} ({} bytes)",
        documento.id, id, size
    );
    Ok((StatusCode::CREATED, Json(UploadResponse { documento })))
}

/// Redirects to a short-lived signed download URL.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/cliente/documentos/{id}/download",
    params(("id" = Uuid, Path, description = "Documento id")),
    responses(
        (status = 307, description = "Redirect to a signed download URL"),
        (status = 404, description = "Unknown documento"),
        (status = 503, description = "Storage not configured")
    ),
    tag = "Cliente"
))]
pub async fn download_documento_handler(
    State(state): State<Arc<ClienteState>>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, (StatusCode, String)> {
    let storage = state
        .storage
        .as_ref()
        .ok_or_else(|| into_http(ClienteError::StorageUnavailable))?;

    let documento = state
        .documentos
        .find_by_id(id)
        .await
        .map_err(|e| into_http(e.into()))?
        .ok_or_else(|| into_http(ClienteError::NotFound(format!("documento {id}"))))?;

    let url = storage
        .signed_url(&documento.caminho)
        .await
        .map_err(|e| into_http(e.into()))?;

    Ok(Redirect::temporary(&url))
}

/// Removes an uploaded documento before review starts: the stored object
/// goes first, then the row.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/cliente/documentos/{id}",
    params(("id" = Uuid, Path, description = "Documento id")),
    responses(
        (status = 204, description = "Documento removed"),
        (status = 404, description = "Unknown documento"),
        (status = 409, description = "Documento already entered review"),
        (status = 503, description = "Storage not configured")
    ),
    tag = "Cliente"
))]
pub async fn delete_documento_handler(
    State(state): State<Arc<ClienteState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let storage = state
        .storage
        .as_ref()
        .ok_or_else(|| into_http(ClienteError::StorageUnavailable))?;

    let documento = state
        .documentos
        .find_by_id(id)
        .await
        .map_err(|e| into_http(e.into()))?
        .ok_or_else(|| into_http(ClienteError::NotFound(format!("documento {id}"))))?;

    let status = documento.parsed_status().map_err(|e| into_http(e.into()))?;
    ensure_removable(status).map_err(into_http)?;

    storage
        .delete(&documento.caminho)
        .await
        .map_err(|e| into_http(e.into()))?;

    let removed = state
        .documentos
        .delete(id)
        .await
        .map_err(|e| into_http(e.into()))?;
    if !removed {
        return Err(into_http(ClienteError::NotFound(format!("documento {id}"))));
    }

    info!("Documento {} removed by the cliente", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_cliente_exists(
    state: &ClienteState,
    id: Uuid,
) -> Result<(), (StatusCode, String)> {
    state
        .clientes
        .find_by_id(id)
        .await
        .map_err(|e| into_http(e.into()))?
        .map(|_| ())
        .ok_or_else(|| into_http(ClienteError::NotFound(format!("cliente {id}"))))
}
