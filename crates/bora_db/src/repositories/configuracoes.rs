//! Repository for platform-wide settings (single row).

use crate::error::DbError;
use crate::DbClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::debug;

/// Platform settings: default translation markup, currency and the
/// commercial team's working hours. `dias_uteis` holds ISO weekday numbers
/// (1 = Monday .. 7 = Sunday) as a comma-separated list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Configuracoes {
    pub id: i32,
    pub markup_percent: i64,
    pub moeda: String,
    pub horario_inicio: String,
    pub horario_fim: String,
    pub dias_uteis: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateConfiguracoes {
    pub markup_percent: Option<i64>,
    pub moeda: Option<String>,
    pub horario_inicio: Option<String>,
    pub horario_fim: Option<String>,
    pub dias_uteis: Option<String>,
}

pub trait ConfiguracoesRepository {
    /// Creates the table and seeds the single settings row when missing.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    fn get(&self) -> impl std::future::Future<Output = Result<Configuracoes, DbError>> + Send;

    fn update(
        &self,
        update: UpdateConfiguracoes,
    ) -> impl std::future::Future<Output = Result<Configuracoes, DbError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SqlConfiguracoesRepository {
    db_client: DbClient,
}

impl SqlConfiguracoesRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl ConfiguracoesRepository for SqlConfiguracoesRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing configuracoes schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS configuracoes (
                id INT PRIMARY KEY,
                markup_percent BIGINT NOT NULL DEFAULT 20,
                moeda TEXT NOT NULL DEFAULT 'BRL',
                horario_inicio TEXT NOT NULL DEFAULT '09:00',
                horario_fim TEXT NOT NULL DEFAULT '18:00',
                dias_uteis TEXT NOT NULL DEFAULT '1,2,3,4,5',
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
        "#,
            )
            .await?;

        self.db_client
            .execute("INSERT INTO configuracoes (id) VALUES (1) ON CONFLICT (id) DO NOTHING")
            .await?;

        Ok(())
    }

    async fn get(&self) -> Result<Configuracoes, DbError> {
        sqlx::query_as::<_, Configuracoes>(
            r#"
            SELECT id, markup_percent, moeda, horario_inicio, horario_fim, dias_uteis, updated_at
            FROM configuracoes WHERE id = 1
        "#,
        )
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?
        .ok_or_else(|| DbError::NotFound("configuracoes row missing".to_string()))
    }

    async fn update(&self, update: UpdateConfiguracoes) -> Result<Configuracoes, DbError> {
        debug!("Updating configuracoes");

        sqlx::query_as::<_, Configuracoes>(
            r#"
            UPDATE configuracoes
            SET markup_percent = COALESCE($1, markup_percent),
                moeda = COALESCE($2, moeda),
                horario_inicio = COALESCE($3, horario_inicio),
                horario_fim = COALESCE($4, horario_fim),
                dias_uteis = COALESCE($5, dias_uteis),
                updated_at = now()
            WHERE id = 1
            RETURNING id, markup_percent, moeda, horario_inicio, horario_fim, dias_uteis, updated_at
        "#,
        )
        .bind(update.markup_percent)
        .bind(&update.moeda)
        .bind(&update.horario_inicio)
        .bind(&update.horario_fim)
        .bind(&update.dias_uteis)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?
        .ok_or_else(|| DbError::NotFound("configuracoes row missing".to_string()))
    }
}
