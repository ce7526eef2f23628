//! Repository for clientes and their dependentes.

use crate::error::DbError;
use crate::DbClient;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::{debug, error};
use uuid::Uuid;

/// A client of the agency. `origem` is either `direto` or `parceiro`; in the
/// latter case `parceiro_id` points at the referring partner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Cliente {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    pub telefone: Option<String>,
    pub origem: String,
    pub parceiro_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCliente {
    pub nome: String,
    pub email: String,
    pub telefone: Option<String>,
    pub origem: String,
    pub parceiro_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Dependente {
    pub id: Uuid,
    pub cliente_id: Uuid,
    pub nome: String,
    pub parentesco: String,
    pub data_nascimento: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDependente {
    pub nome: String,
    pub parentesco: String,
    pub data_nascimento: Option<NaiveDate>,
}

/// Repository for clientes.
pub trait ClientesRepository {
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    fn create(
        &self,
        cliente: NewCliente,
    ) -> impl std::future::Future<Output = Result<Cliente, DbError>> + Send;

    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Cliente>, DbError>> + Send;

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<Cliente>, DbError>> + Send;

    /// All clientes referred by a given partner, newest first.
    fn list_by_parceiro(
        &self,
        parceiro_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Cliente>, DbError>> + Send;

    fn add_dependente(
        &self,
        cliente_id: Uuid,
        dependente: NewDependente,
    ) -> impl std::future::Future<Output = Result<Dependente, DbError>> + Send;

    fn list_dependentes(
        &self,
        cliente_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Dependente>, DbError>> + Send;
}

/// SQL implementation of the clientes repository.
#[derive(Debug, Clone)]
pub struct SqlClientesRepository {
    db_client: DbClient,
}

impl SqlClientesRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl ClientesRepository for SqlClientesRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing clientes schema");

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS clientes (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                nome TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                telefone TEXT,
                origem TEXT NOT NULL DEFAULT 'direto',
                parceiro_id UUID,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
        "#,
            )
            .await?;

        self.db_client
            .execute(
                r#"
            CREATE TABLE IF NOT EXISTS dependentes (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                cliente_id UUID NOT NULL REFERENCES clientes(id) ON DELETE CASCADE,
                nome TEXT NOT NULL,
                parentesco TEXT NOT NULL,
                data_nascimento DATE
            )
        "#,
            )
            .await?;

        Ok(())
    }

    async fn create(&self, cliente: NewCliente) -> Result<Cliente, DbError> {
        debug!("Creating cliente: {}", cliente.email);

        sqlx::query_as::<_, Cliente>(
            r#"
            INSERT INTO clientes (nome, email, telefone, origem, parceiro_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, nome, email, telefone, origem, parceiro_id, created_at, updated_at
        "#,
        )
        .bind(&cliente.nome)
        .bind(&cliente.email)
        .bind(&cliente.telefone)
        .bind(&cliente.origem)
        .bind(cliente.parceiro_id)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to insert cliente: {}", e);
            DbError::QueryError(e.to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cliente>, DbError> {
        sqlx::query_as::<_, Cliente>(
            r#"
            SELECT id, nome, email, telefone, origem, parceiro_id, created_at, updated_at
            FROM clientes WHERE id = $1
        "#,
        )
        .bind(id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Cliente>, DbError> {
        sqlx::query_as::<_, Cliente>(
            r#"
            SELECT id, nome, email, telefone, origem, parceiro_id, created_at, updated_at
            FROM clientes WHERE email = $1
        "#,
        )
        .bind(email)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn list_by_parceiro(&self, parceiro_id: Uuid) -> Result<Vec<Cliente>, DbError> {
        sqlx::query_as::<_, Cliente>(
            r#"
            SELECT id, nome, email, telefone, origem, parceiro_id, created_at, updated_at
            FROM clientes
            WHERE parceiro_id = $1
            ORDER BY created_at DESC
        "#,
        )
        .bind(parceiro_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }

    async fn add_dependente(
        &self,
        cliente_id: Uuid,
        dependente: NewDependente,
    ) -> Result<Dependente, DbError> {
        debug!("Adding dependente for cliente: {}", cliente_id);

        sqlx::query_as::<_, Dependente>(
            r#"
            INSERT INTO dependentes (cliente_id, nome, parentesco, data_nascimento)
            VALUES ($1, $2, $3, $4)
            RETURNING id, cliente_id, nome, parentesco, data_nascimento
        "#,
        )
        .bind(cliente_id)
        .bind(&dependente.nome)
        .bind(&dependente.parentesco)
        .bind(dependente.data_nascimento)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to insert dependente: {}", e);
            DbError::QueryError(e.to_string())
        })
    }

    async fn list_dependentes(&self, cliente_id: Uuid) -> Result<Vec<Dependente>, DbError> {
        sqlx::query_as::<_, Dependente>(
            r#"
            SELECT id, cliente_id, nome, parentesco, data_nascimento
            FROM dependentes WHERE cliente_id = $1 ORDER BY nome
        "#,
        )
        .bind(cliente_id)
        .fetch_all(self.db_client.pool())
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))
    }
}
