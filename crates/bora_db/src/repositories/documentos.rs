//! Repository for documentos.
//!
//! The `status` column holds the [`DocumentoStatus`] vocabulary as text; rows
//! only change status through [`DocumentosRepository::update_status`], and
//! callers are expected to have validated the transition first (see
//! `bora_juridico::logic`).

use crate::error::DbError;
use crate::DbClient;
use bora_common::DocumentoStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::{debug, error};
use uuid::Uuid;

/// An uploaded file plus its review/apostille/translation state.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Documento {
    pub id: Uuid,
    pub cliente_id: Uuid,
    pub processo_id: Option<Uuid>,
    pub nome: String,
    /// Object path inside the storage bucket.
    pub caminho: String,
    pub content_type: String,
    pub tamanho_bytes: i64,
    pub status: String,
    pub observacao: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Documento {
    /// Parses the stored status into the typed vocabulary.
    pub fn parsed_status(&self) -> Result<DocumentoStatus, DbError> {
        self.status
            .parse()
            .map_err(|e: String| DbError::InvalidValue(e))
    }
}

#[derive(Debug, Clone)]
pub struct NewDocumento {
    pub cliente_id: Uuid,
    pub processo_id: Option<Uuid>,
    pub nome: String,
    pub caminho: String,
    pub content_type: String,
    pub tamanho_bytes: i64,
}

pub trait DocumentosRepository {
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    fn create(
        &self,
        documento: NewDocumento,
    ) -> impl std::future::Future<Output = Result<Documento, DbError>> + Send;

    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Documento>, DbError>> + Send;

    fn list_by_cliente(
        &self,
        cliente_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Documento>, DbError>> + Send;

    fn list_by_status(
        &self,
        status: DocumentoStatus,
    ) -> impl std::future::Future<Output = Result<Vec<Documento>, DbError>> + Send;

    /// Writes a new status (and optional reviewer note). The transition must
    /// already be validated against the state machine.
    fn update_status(
        &self,
        id: Uuid,
        status: DocumentoStatus,
        observacao: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Option<Documento>, DbError>> + Send;

    /// Removes the row. Returns whether anything was deleted. Callers must
    /// have removed the stored object and checked that no quote references
    /// the documento.
    fn delete(&self, id: Uuid) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SqlDocumentosRepository {
    db_client: DbClient,
}

impl SqlDocumentosRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl DocumentosRepository for SqlDocumentosRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing documentos schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS documentos (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                cliente_id UUID NOT NULL REFERENCES clientes(id),
                processo_id UUID REFERENCES processos(id),
                nome TEXT NOT NULL,
                caminho TEXT NOT NULL,
                content_type TEXT NOT NULL,
                tamanho_bytes BIGINT NOT NULL,
                status TEXT NOT NULL DEFAULT 'PENDING',
                observacao TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
        "#,
            )
            .await?;

        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_documentos_status ON documentos(status)",
            )
            .await?;

        Ok(())
    }

    async fn create(&self, documento: NewDocumento) -> Result<Documento, DbError> {
        debug!(
            "Creating documento '{}' for cliente {}",
            documento.nome, documento.cliente_id
        );

        sqlx::query_as::<_, Documento>(
            r#"
            INSERT INTO documentos (cliente_id, processo_id, nome, caminho, content_type, tamanho_bytes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, cliente_id, processo_id, nome, caminho, content_type, tamanho_bytes,
                      status, observacao, created_at, updated_at
        "#,
        )
        .bind(documento.cliente_id)
        .bind(documento.processo_id)
        .bind(&documento.nome)
        .bind(&documento.caminho)
        .bind(&documento.content_type)
        .bind(documento.tamanho_bytes)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to insert documento: {}", e);
            DbError::QueryError(e.to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Documento>, DbError> {
        sqlx::query_as::<_, Documento>(
            r#"
            SELECT id, cliente_id, processo_id, nome, caminho, content_type, tamanho_bytes,
                   status, observacao, created_at, updated_at
            FROM documentos WHERE id = $1
        "#,
        )
        .bind(id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn list_by_cliente(&self, cliente_id: Uuid) -> Result<Vec<Documento>, DbError> {
        sqlx::query_as::<_, Documento>(
            r#"
            SELECT id, cliente_id, processo_id, nome, caminho, content_type, tamanho_bytes,
                   status, observacao, created_at, updated_at
            FROM documentos WHERE cliente_id = $1 ORDER BY created_at DESC
        "#,
        )
        .bind(cliente_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn list_by_status(&self, status: DocumentoStatus) -> Result<Vec<Documento>, DbError> {
        sqlx::query_as::<_, Documento>(
            r#"
            SELECT id, cliente_id, processo_id, nome, caminho, content_type, tamanho_bytes,
                   status, observacao, created_at, updated_at
            FROM documentos WHERE status = $1 ORDER BY created_at
        "#,
        )
        .bind(status.as_str())
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: DocumentoStatus,
        observacao: Option<&str>,
    ) -> Result<Option<Documento>, DbError> {
        debug!("Updating documento {} status to {}", id, status);

        sqlx::query_as::<_, Documento>(
            r#"
            UPDATE documentos
            SET status = $2,
                observacao = COALESCE($3, observacao),
                updated_at = now()
            WHERE id = $1
            RETURNING id, cliente_id, processo_id, nome, caminho, content_type, tamanho_bytes,
                      status, observacao, created_at, updated_at
        "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(observacao)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to update documento status: {}", e);
            DbError::QueryError(e.to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        debug!("Deleting documento {}", id);

        let result = sqlx::query("DELETE FROM documentos WHERE id = $1")
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to delete documento: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }
}
