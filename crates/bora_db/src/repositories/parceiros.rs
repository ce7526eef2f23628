//! Repository for parceiros (referral partners).

use crate::error::DbError;
use crate::DbClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::{debug, error};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Parceiro {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    pub percentual_comissao: i64,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewParceiro {
    pub nome: String,
    pub email: String,
    pub percentual_comissao: i64,
}

pub trait ParceirosRepository {
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    fn create(
        &self,
        parceiro: NewParceiro,
    ) -> impl std::future::Future<Output = Result<Parceiro, DbError>> + Send;

    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Parceiro>, DbError>> + Send;

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<Parceiro>, DbError>> + Send;

    fn set_ativo(
        &self,
        id: Uuid,
        ativo: bool,
    ) -> impl std::future::Future<Output = Result<bool, DbError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SqlParceirosRepository {
    db_client: DbClient,
}

impl SqlParceirosRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl ParceirosRepository for SqlParceirosRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing parceiros schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS parceiros (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                nome TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                percentual_comissao BIGINT NOT NULL DEFAULT 0,
                ativo BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
        "#,
            )
            .await?;

        Ok(())
    }

    async fn create(&self, parceiro: NewParceiro) -> Result<Parceiro, DbError> {
        debug!("Creating parceiro: {}", parceiro.email);

        sqlx::query_as::<_, Parceiro>(
            r#"
            INSERT INTO parceiros (nome, email, percentual_comissao)
            VALUES ($1, $2, $3)
            RETURNING id, nome, email, percentual_comissao, ativo, created_at
        "#,
        )
        .bind(&parceiro.nome)
        .bind(&parceiro.email)
        .bind(parceiro.percentual_comissao)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to insert parceiro: {}", e);
            DbError::QueryError(e.to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Parceiro>, DbError> {
        sqlx::query_as::<_, Parceiro>(
            r#"
            SELECT id, nome, email, percentual_comissao, ativo, created_at
            FROM parceiros WHERE id = $1
        "#,
        )
        .bind(id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Parceiro>, DbError> {
        sqlx::query_as::<_, Parceiro>(
            r#"
            SELECT id, nome, email, percentual_comissao, ativo, created_at
            FROM parceiros WHERE email = $1
        "#,
        )
        .bind(email)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn set_ativo(&self, id: Uuid, ativo: bool) -> Result<bool, DbError> {
        let result = sqlx::query("UPDATE parceiros SET ativo = $2 WHERE id = $1")
            .bind(id)
            .bind(ativo)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
