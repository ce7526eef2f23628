//! Repository for agendamentos (commercial appointments).

use crate::error::DbError;
use crate::DbClient;
use bora_common::AgendamentoStatus;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::{debug, error};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Agendamento {
    pub id: Uuid,
    pub cliente_id: Option<Uuid>,
    pub nome: String,
    pub email: String,
    pub inicio: DateTime<Utc>,
    pub fim: DateTime<Utc>,
    pub status: String,
    pub gcal_event_id: Option<String>,
    pub payment_ref: Option<String>,
    pub valor_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agendamento {
    pub fn parsed_status(&self) -> Result<AgendamentoStatus, DbError> {
        self.status
            .parse()
            .map_err(|e: String| DbError::InvalidValue(e))
    }
}

#[derive(Debug, Clone)]
pub struct NewAgendamento {
    pub cliente_id: Option<Uuid>,
    pub nome: String,
    pub email: String,
    pub inicio: DateTime<Utc>,
    pub fim: DateTime<Utc>,
    pub status: AgendamentoStatus,
    pub valor_cents: i64,
}

pub trait AgendamentosRepository {
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    fn create(
        &self,
        agendamento: NewAgendamento,
    ) -> impl std::future::Future<Output = Result<Agendamento, DbError>> + Send;

    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Agendamento>, DbError>> + Send;

    fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Vec<Agendamento>, DbError>> + Send;

    /// Counts appointments that still hold a slot overlapping [inicio, fim):
    /// confirmed ones, plus unpaid ones younger than
    /// [`PENDING_HOLD_MINUTES`]. An abandoned checkout frees its slot once
    /// the hold lapses.
    fn count_overlapping(
        &self,
        inicio: DateTime<Utc>,
        fim: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<i64, DbError>> + Send;

    /// Confirms an appointment, attaching the created calendar event.
    fn confirm(
        &self,
        id: Uuid,
        gcal_event_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Agendamento>, DbError>> + Send;

    fn cancel(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Agendamento>, DbError>> + Send;

    fn set_payment_ref(
        &self,
        id: Uuid,
        payment_ref: &str,
    ) -> impl std::future::Future<Output = Result<Option<Agendamento>, DbError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SqlAgendamentosRepository {
    db_client: DbClient,
}

impl SqlAgendamentosRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

const AGENDAMENTO_COLUMNS: &str = "id, cliente_id, nome, email, inicio, fim, status, \
                                   gcal_event_id, payment_ref, valor_cents, created_at, updated_at";

/// How long a `pendente_pagamento` row blocks its slot while the client sits
/// on the provider's checkout page.
pub const PENDING_HOLD_MINUTES: i64 = 30;

impl AgendamentosRepository for SqlAgendamentosRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing agendamentos schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS agendamentos (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                cliente_id UUID REFERENCES clientes(id),
                nome TEXT NOT NULL,
                email TEXT NOT NULL,
                inicio TIMESTAMPTZ NOT NULL,
                fim TIMESTAMPTZ NOT NULL,
                status TEXT NOT NULL DEFAULT 'pendente_pagamento',
                gcal_event_id TEXT,
                payment_ref TEXT,
                valor_cents BIGINT NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
        "#,
            )
            .await?;

        Ok(())
    }

    async fn create(&self, agendamento: NewAgendamento) -> Result<Agendamento, DbError> {
        debug!(
            "Creating agendamento for {} at {}",
            agendamento.email, agendamento.inicio
        );

        sqlx::query_as::<_, Agendamento>(&format!(
            r#"
            INSERT INTO agendamentos (cliente_id, nome, email, inicio, fim, status, valor_cents)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {AGENDAMENTO_COLUMNS}
        "#
        ))
        .bind(agendamento.cliente_id)
        .bind(&agendamento.nome)
        .bind(&agendamento.email)
        .bind(agendamento.inicio)
        .bind(agendamento.fim)
        .bind(agendamento.status.as_str())
        .bind(agendamento.valor_cents)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to insert agendamento: {}", e);
            DbError::QueryError(e.to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Agendamento>, DbError> {
        sqlx::query_as::<_, Agendamento>(&format!(
            "SELECT {AGENDAMENTO_COLUMNS} FROM agendamentos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Agendamento>, DbError> {
        sqlx::query_as::<_, Agendamento>(&format!(
            r#"
            SELECT {AGENDAMENTO_COLUMNS} FROM agendamentos
            WHERE inicio >= $1 AND inicio < $2
            ORDER BY inicio
        "#
        ))
        .bind(start)
        .bind(end)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn count_overlapping(
        &self,
        inicio: DateTime<Utc>,
        fim: DateTime<Utc>,
    ) -> Result<i64, DbError> {
        let hold_cutoff = Utc::now() - Duration::minutes(PENDING_HOLD_MINUTES);
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM agendamentos
            WHERE inicio < $2 AND fim > $1
              AND (status = 'confirmado'
                   OR (status = 'pendente_pagamento' AND created_at > $3))
        "#,
        )
        .bind(inicio)
        .bind(fim)
        .bind(hold_cutoff)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(count.0)
    }

    async fn confirm(&self, id: Uuid, gcal_event_id: &str) -> Result<Option<Agendamento>, DbError> {
        debug!("Confirming agendamento {}", id);

        sqlx::query_as::<_, Agendamento>(&format!(
            r#"
            UPDATE agendamentos
            SET status = 'confirmado', gcal_event_id = $2, updated_at = now()
            WHERE id = $1
            RETURNING {AGENDAMENTO_COLUMNS}
        "#
        ))
        .bind(id)
        .bind(gcal_event_id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn cancel(&self, id: Uuid) -> Result<Option<Agendamento>, DbError> {
        debug!("Cancelling agendamento {}", id);

        sqlx::query_as::<_, Agendamento>(&format!(
            r#"
            UPDATE agendamentos
            SET status = 'cancelado', updated_at = now()
            WHERE id = $1
            RETURNING {AGENDAMENTO_COLUMNS}
        "#
        ))
        .bind(id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn set_payment_ref(
        &self,
        id: Uuid,
        payment_ref: &str,
    ) -> Result<Option<Agendamento>, DbError> {
        sqlx::query_as::<_, Agendamento>(&format!(
            r#"
            UPDATE agendamentos SET payment_ref = $2, updated_at = now()
            WHERE id = $1
            RETURNING {AGENDAMENTO_COLUMNS}
        "#
        ))
        .bind(id)
        .bind(payment_ref)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }
}
