//! Repository for processos (legal cases) and their requerimentos.

use crate::error::DbError;
use crate::DbClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::{debug, error};
use uuid::Uuid;

/// A client's immigration/legal case record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Processo {
    pub id: Uuid,
    pub cliente_id: Uuid,
    pub tipo_servico: String,
    pub status: String,
    pub responsavel: Option<String>,
    pub descricao: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProcesso {
    pub cliente_id: Uuid,
    pub tipo_servico: String,
    pub responsavel: Option<String>,
    pub descricao: Option<String>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProcesso {
    pub status: Option<String>,
    pub responsavel: Option<String>,
    pub descricao: Option<String>,
}

/// A formal requirement attached to a processo (e.g. "apostilled birth
/// certificate needed").
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Requerimento {
    pub id: Uuid,
    pub processo_id: Uuid,
    pub titulo: String,
    pub descricao: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRequerimento {
    pub titulo: String,
    pub descricao: Option<String>,
}

pub trait ProcessosRepository {
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    fn create(
        &self,
        processo: NewProcesso,
    ) -> impl std::future::Future<Output = Result<Processo, DbError>> + Send;

    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Processo>, DbError>> + Send;

    fn list_by_cliente(
        &self,
        cliente_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Processo>, DbError>> + Send;

    fn list_all(
        &self,
        status: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Vec<Processo>, DbError>> + Send;

    fn update(
        &self,
        id: Uuid,
        update: UpdateProcesso,
    ) -> impl std::future::Future<Output = Result<Option<Processo>, DbError>> + Send;

    fn add_requerimento(
        &self,
        processo_id: Uuid,
        requerimento: NewRequerimento,
    ) -> impl std::future::Future<Output = Result<Requerimento, DbError>> + Send;

    fn list_requerimentos(
        &self,
        processo_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Requerimento>, DbError>> + Send;

    /// Marks a requerimento as `atendido`. Returns false when it is unknown.
    fn atender_requerimento(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SqlProcessosRepository {
    db_client: DbClient,
}

impl SqlProcessosRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl ProcessosRepository for SqlProcessosRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing processos schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS processos (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                cliente_id UUID NOT NULL REFERENCES clientes(id),
                tipo_servico TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'aberto',
                responsavel TEXT,
                descricao TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
        "#,
            )
            .await?;

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS requerimentos (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                processo_id UUID NOT NULL REFERENCES processos(id) ON DELETE CASCADE,
                titulo TEXT NOT NULL,
                descricao TEXT,
                status TEXT NOT NULL DEFAULT 'pendente',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
        "#,
            )
            .await?;

        Ok(())
    }

    async fn create(&self, processo: NewProcesso) -> Result<Processo, DbError> {
        debug!("Creating processo for cliente: {}", processo.cliente_id);

        sqlx::query_as::<_, Processo>(
            r#"
            INSERT INTO processos (cliente_id, tipo_servico, responsavel, descricao)
            VALUES ($1, $2, $3, $4)
            RETURNING id, cliente_id, tipo_servico, status, responsavel, descricao,
                      created_at, updated_at
        "#,
        )
        .bind(processo.cliente_id)
        .bind(&processo.tipo_servico)
        .bind(&processo.responsavel)
        .bind(&processo.descricao)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to insert processo: {}", e);
            DbError::QueryError(e.to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Processo>, DbError> {
        sqlx::query_as::<_, Processo>(
            r#"
            SELECT id, cliente_id, tipo_servico, status, responsavel, descricao,
                   created_at, updated_at
            FROM processos WHERE id = $1
        "#,
        )
        .bind(id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn list_by_cliente(&self, cliente_id: Uuid) -> Result<Vec<Processo>, DbError> {
        sqlx::query_as::<_, Processo>(
            r#"
            SELECT id, cliente_id, tipo_servico, status, responsavel, descricao,
                   created_at, updated_at
            FROM processos WHERE cliente_id = $1 ORDER BY created_at DESC
        "#,
        )
        .bind(cliente_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn list_all(&self, status: Option<&str>) -> Result<Vec<Processo>, DbError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, Processo>(
                    r#"
                    SELECT id, cliente_id, tipo_servico, status, responsavel, descricao,
                           created_at, updated_at
                    FROM processos WHERE status = $1 ORDER BY created_at DESC
                "#,
                )
                .bind(status)
                .fetch_all(self.db_client.pool())
                .await
            }
            None => {
                sqlx::query_as::<_, Processo>(
                    r#"
                    SELECT id, cliente_id, tipo_servico, status, responsavel, descricao,
                           created_at, updated_at
                    FROM processos ORDER BY created_at DESC
                "#,
                )
                .fetch_all(self.db_client.pool())
                .await
            }
        };

        rows.map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn update(&self, id: Uuid, update: UpdateProcesso) -> Result<Option<Processo>, DbError> {
        debug!("Updating processo: {}", id);

        sqlx::query_as::<_, Processo>(
            r#"
            UPDATE processos
            SET status = COALESCE($2, status),
                responsavel = COALESCE($3, responsavel),
                descricao = COALESCE($4, descricao),
                updated_at = now()
            WHERE id = $1
            RETURNING id, cliente_id, tipo_servico, status, responsavel, descricao,
                      created_at, updated_at
        "#,
        )
        .bind(id)
        .bind(&update.status)
        .bind(&update.responsavel)
        .bind(&update.descricao)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to update processo: {}", e);
            DbError::QueryError(e.to_string())
        })
    }

    async fn add_requerimento(
        &self,
        processo_id: Uuid,
        requerimento: NewRequerimento,
    ) -> Result<Requerimento, DbError> {
        sqlx::query_as::<_, Requerimento>(
            r#"
            INSERT INTO requerimentos (processo_id, titulo, descricao)
            VALUES ($1, $2, $3)
            RETURNING id, processo_id, titulo, descricao, status, created_at
        "#,
        )
        .bind(processo_id)
        .bind(&requerimento.titulo)
        .bind(&requerimento.descricao)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn list_requerimentos(&self, processo_id: Uuid) -> Result<Vec<Requerimento>, DbError> {
        sqlx::query_as::<_, Requerimento>(
            r#"
            SELECT id, processo_id, titulo, descricao, status, created_at
            FROM requerimentos WHERE processo_id = $1 ORDER BY created_at
        "#,
        )
        .bind(processo_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn atender_requerimento(&self, id: Uuid) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE requerimentos SET status = 'atendido' WHERE id = $1
        "#,
        )
        .bind(id)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
