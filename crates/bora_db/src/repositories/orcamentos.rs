//! Repository for orçamentos (translation quotes).

use crate::error::DbError;
use crate::DbClient;
use bora_common::OrcamentoStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::{debug, error};
use uuid::Uuid;

/// A translation price quote tied to a documento, with the platform markup
/// already applied to `valor_total_cents`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Orcamento {
    pub id: Uuid,
    pub documento_id: Uuid,
    pub valor_base_cents: i64,
    pub markup_percent: i64,
    pub valor_total_cents: i64,
    pub moeda: String,
    pub status: String,
    pub provider: Option<String>,
    pub payment_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Orcamento {
    pub fn parsed_status(&self) -> Result<OrcamentoStatus, DbError> {
        self.status
            .parse()
            .map_err(|e: String| DbError::InvalidValue(e))
    }
}

#[derive(Debug, Clone)]
pub struct NewOrcamento {
    pub documento_id: Uuid,
    pub valor_base_cents: i64,
    pub markup_percent: i64,
    pub valor_total_cents: i64,
    pub moeda: String,
}

pub trait OrcamentosRepository {
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Inserts the quote already in `aguardando_aprovacao`.
    fn create(
        &self,
        orcamento: NewOrcamento,
    ) -> impl std::future::Future<Output = Result<Orcamento, DbError>> + Send;

    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Orcamento>, DbError>> + Send;

    fn list_by_documento(
        &self,
        documento_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Orcamento>, DbError>> + Send;

    fn update_status(
        &self,
        id: Uuid,
        status: OrcamentoStatus,
    ) -> impl std::future::Future<Output = Result<Option<Orcamento>, DbError>> + Send;

    /// Records the provider checkout reference alongside a status change.
    fn set_payment(
        &self,
        id: Uuid,
        provider: &str,
        payment_ref: &str,
        status: OrcamentoStatus,
    ) -> impl std::future::Future<Output = Result<Option<Orcamento>, DbError>> + Send;

    fn find_by_payment_ref(
        &self,
        payment_ref: &str,
    ) -> impl std::future::Future<Output = Result<Option<Orcamento>, DbError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SqlOrcamentosRepository {
    db_client: DbClient,
}

impl SqlOrcamentosRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

const ORCAMENTO_COLUMNS: &str = "id, documento_id, valor_base_cents, markup_percent, \
                                 valor_total_cents, moeda, status, provider, payment_ref, \
                                 created_at, updated_at";

impl OrcamentosRepository for SqlOrcamentosRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing orcamentos schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS orcamentos (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                documento_id UUID NOT NULL REFERENCES documentos(id),
                valor_base_cents BIGINT NOT NULL,
                markup_percent BIGINT NOT NULL,
                valor_total_cents BIGINT NOT NULL,
                moeda TEXT NOT NULL DEFAULT 'BRL',
                status TEXT NOT NULL DEFAULT 'aguardando_aprovacao',
                provider TEXT,
                payment_ref TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
        "#,
            )
            .await?;

        Ok(())
    }

    async fn create(&self, orcamento: NewOrcamento) -> Result<Orcamento, DbError> {
        debug!(
            "Creating orcamento for documento {} ({} + {}% markup)",
            orcamento.documento_id, orcamento.valor_base_cents, orcamento.markup_percent
        );

        sqlx::query_as::<_, Orcamento>(&format!(
            r#"
            INSERT INTO orcamentos (documento_id, valor_base_cents, markup_percent,
                                    valor_total_cents, moeda)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ORCAMENTO_COLUMNS}
        "#
        ))
        .bind(orcamento.documento_id)
        .bind(orcamento.valor_base_cents)
        .bind(orcamento.markup_percent)
        .bind(orcamento.valor_total_cents)
        .bind(&orcamento.moeda)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to insert orcamento: {}", e);
            DbError::QueryError(e.to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Orcamento>, DbError> {
        sqlx::query_as::<_, Orcamento>(&format!(
            "SELECT {ORCAMENTO_COLUMNS} FROM orcamentos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn list_by_documento(&self, documento_id: Uuid) -> Result<Vec<Orcamento>, DbError> {
        sqlx::query_as::<_, Orcamento>(&format!(
            "SELECT {ORCAMENTO_COLUMNS} FROM orcamentos WHERE documento_id = $1 ORDER BY created_at DESC"
        ))
        .bind(documento_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrcamentoStatus,
    ) -> Result<Option<Orcamento>, DbError> {
        debug!("Updating orcamento {} status to {}", id, status);

        sqlx::query_as::<_, Orcamento>(&format!(
            r#"
            UPDATE orcamentos SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {ORCAMENTO_COLUMNS}
        "#
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn set_payment(
        &self,
        id: Uuid,
        provider: &str,
        payment_ref: &str,
        status: OrcamentoStatus,
    ) -> Result<Option<Orcamento>, DbError> {
        debug!(
            "Recording {} payment ref for orcamento {} ({})",
            provider, id, status
        );

        sqlx::query_as::<_, Orcamento>(&format!(
            r#"
            UPDATE orcamentos
            SET provider = $2, payment_ref = $3, status = $4, updated_at = now()
            WHERE id = $1
            RETURNING {ORCAMENTO_COLUMNS}
        "#
        ))
        .bind(id)
        .bind(provider)
        .bind(payment_ref)
        .bind(status.as_str())
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn find_by_payment_ref(&self, payment_ref: &str) -> Result<Option<Orcamento>, DbError> {
        sqlx::query_as::<_, Orcamento>(&format!(
            "SELECT {ORCAMENTO_COLUMNS} FROM orcamentos WHERE payment_ref = $1"
        ))
        .bind(payment_ref)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }
}
