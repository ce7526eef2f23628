//! Repository for the legal team's working records: notas and formularios.

use crate::error::DbError;
use crate::DbClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::{debug, error};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NotaJuridico {
    pub id: Uuid,
    pub processo_id: Uuid,
    pub autor: String,
    pub conteudo: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNotaJuridico {
    pub autor: String,
    pub conteudo: String,
}

/// A structured form the legal team fills in for a processo. `campos` is the
/// form payload as JSON; the shape varies by service type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FormularioJuridico {
    pub id: Uuid,
    pub processo_id: Uuid,
    pub titulo: String,
    pub campos: serde_json::Value,
    pub preenchido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFormularioJuridico {
    pub titulo: String,
    #[serde(default)]
    pub campos: serde_json::Value,
}

pub trait JuridicoRepository {
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    fn add_nota(
        &self,
        processo_id: Uuid,
        nota: NewNotaJuridico,
    ) -> impl std::future::Future<Output = Result<NotaJuridico, DbError>> + Send;

    fn list_notas(
        &self,
        processo_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<NotaJuridico>, DbError>> + Send;

    fn create_formulario(
        &self,
        processo_id: Uuid,
        formulario: NewFormularioJuridico,
    ) -> impl std::future::Future<Output = Result<FormularioJuridico, DbError>> + Send;

    fn list_formularios(
        &self,
        processo_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<FormularioJuridico>, DbError>> + Send;

    /// Stores the filled-in fields and flips `preenchido`.
    fn preencher_formulario(
        &self,
        id: Uuid,
        campos: serde_json::Value,
    ) -> impl std::future::Future<Output = Result<Option<FormularioJuridico>, DbError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SqlJuridicoRepository {
    db_client: DbClient,
}

impl SqlJuridicoRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl JuridicoRepository for SqlJuridicoRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing juridico schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS notas_juridico (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                processo_id UUID NOT NULL REFERENCES processos(id) ON DELETE CASCADE,
                autor TEXT NOT NULL,
                conteudo TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
        "#,
            )
            .await?;

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS formularios_juridico (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                processo_id UUID NOT NULL REFERENCES processos(id) ON DELETE CASCADE,
                titulo TEXT NOT NULL,
                campos JSONB NOT NULL DEFAULT '{}'::jsonb,
                preenchido BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
        "#,
            )
            .await?;

        Ok(())
    }

    async fn add_nota(
        &self,
        processo_id: Uuid,
        nota: NewNotaJuridico,
    ) -> Result<NotaJuridico, DbError> {
        debug!("Adding nota to processo {}", processo_id);

        sqlx::query_as::<_, NotaJuridico>(
            r#"
            INSERT INTO notas_juridico (processo_id, autor, conteudo)
            VALUES ($1, $2, $3)
            RETURNING id, processo_id, autor, conteudo, created_at
        "#,
        )
        .bind(processo_id)
        .bind(&nota.autor)
        .bind(&nota.conteudo)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to insert nota: {}", e);
            DbError::QueryError(e.to_string())
        })
    }

    async fn list_notas(&self, processo_id: Uuid) -> Result<Vec<NotaJuridico>, DbError> {
        sqlx::query_as::<_, NotaJuridico>(
            r#"
            SELECT id, processo_id, autor, conteudo, created_at
            FROM notas_juridico WHERE processo_id = $1 ORDER BY created_at DESC
        "#,
        )
        .bind(processo_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn create_formulario(
        &self,
        processo_id: Uuid,
        formulario: NewFormularioJuridico,
    ) -> Result<FormularioJuridico, DbError> {
        sqlx::query_as::<_, FormularioJuridico>(
            r#"
            INSERT INTO formularios_juridico (processo_id, titulo, campos)
            VALUES ($1, $2, $3)
            RETURNING id, processo_id, titulo, campos, preenchido, created_at, updated_at
        "#,
        )
        .bind(processo_id)
        .bind(&formulario.titulo)
        .bind(&formulario.campos)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn list_formularios(
        &self,
        processo_id: Uuid,
    ) -> Result<Vec<FormularioJuridico>, DbError> {
        sqlx::query_as::<_, FormularioJuridico>(
            r#"
            SELECT id, processo_id, titulo, campos, preenchido, created_at, updated_at
            FROM formularios_juridico WHERE processo_id = $1 ORDER BY created_at
        "#,
        )
        .bind(processo_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn preencher_formulario(
        &self,
        id: Uuid,
        campos: serde_json::Value,
    ) -> Result<Option<FormularioJuridico>, DbError> {
        debug!("Filling formulario {}", id);

        sqlx::query_as::<_, FormularioJuridico>(
            r#"
            UPDATE formularios_juridico
            SET campos = $2, preenchido = TRUE, updated_at = now()
            WHERE id = $1
            RETURNING id, processo_id, titulo, campos, preenchido, created_at, updated_at
        "#,
        )
        .bind(id)
        .bind(&campos)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }
}
