// --- File: crates/bora_traducoes/src/handlers.rs ---
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use bora_common::{
    services::{CheckoutProviders, CheckoutRequest, FulfillmentKind},
    DocumentoStatus, HttpStatusCode, OrcamentoStatus,
};
use bora_config::AppConfig;
use bora_db::repositories::{
    clientes::Cliente,
    documentos::Documento,
    orcamentos::{NewOrcamento, Orcamento},
    ClientesRepository, ConfiguracoesRepository, DocumentosRepository, OrcamentosRepository,
    SqlClientesRepository, SqlConfiguracoesRepository, SqlDocumentosRepository,
    SqlOrcamentosRepository,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::TraducoesError;
use crate::logic::total_with_markup;

#[derive(Clone)]
pub struct TraducoesState {
    pub config: Arc<AppConfig>,
    pub documentos: SqlDocumentosRepository,
    pub orcamentos: SqlOrcamentosRepository,
    pub configuracoes: SqlConfiguracoesRepository,
    pub clientes: SqlClientesRepository,
    pub checkout: CheckoutProviders,
}

fn into_http(err: TraducoesError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateOrcamentoRequest {
    pub documento_id: Uuid,
    /// Translator's base price, in cents.
    pub valor_base_cents: i64,
    /// Markup override; falls back to the configured default.
    pub markup_percent: Option<i64>,
    pub moeda: Option<String>,
}

/// Creates a quote for a documento waiting on one and sends it to the client
/// for approval.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/traducoes/orcamentos",
    request_body = CreateOrcamentoRequest,
    responses(
        (status = 201, description = "Orcamento created, awaiting client approval"),
        (status = 400, description = "Bad amount or markup out of bounds"),
        (status = 404, description = "Unknown documento"),
        (status = 409, description = "Documento is not waiting for a quote")
    ),
    tag = "Traducoes"
))]
pub async fn create_orcamento_handler(
    State(state): State<Arc<TraducoesState>>,
    Json(payload): Json<CreateOrcamentoRequest>,
) -> Result<(StatusCode, Json<Orcamento>), (StatusCode, String)> {
    let documento = get_documento(&state.documentos, payload.documento_id)
        .await
        .map_err(into_http)?;
    require_documento_status(&documento, DocumentoStatus::WaitingTranslationQuote)
        .map_err(into_http)?;

    let settings = state
        .configuracoes
        .get()
        .await
        .map_err(|e| into_http(e.into()))?;

    let markup = payload.markup_percent.unwrap_or(settings.markup_percent);
    let total = total_with_markup(payload.valor_base_cents, markup).map_err(into_http)?;
    let moeda = payload.moeda.unwrap_or(settings.moeda);

    let orcamento = state
        .orcamentos
        .create(NewOrcamento {
            documento_id: documento.id,
            valor_base_cents: payload.valor_base_cents,
            markup_percent: markup,
            valor_total_cents: total,
            moeda,
        })
        .await
        .map_err(|e| into_http(e.into()))?;

    state
        .documentos
        .update_status(documento.id, DocumentoStatus::WaitingQuoteApproval, None)
        .await
        .map_err(|e| into_http(e.into()))?;

    info!(
        "Orcamento {} created for documento {} ({} {} total)",
        orcamento.id, documento.id, orcamento.valor_total_cents, orcamento.moeda
    );
    Ok((StatusCode::CREATED, Json(orcamento)))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/traducoes/orcamentos/{id}",
    params(("id" = Uuid, Path, description = "Orcamento id")),
    responses(
        (status = 200, description = "Orcamento"),
        (status = 404, description = "Unknown orcamento")
    ),
    tag = "Traducoes"
))]
pub async fn get_orcamento_handler(
    State(state): State<Arc<TraducoesState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Orcamento>, (StatusCode, String)> {
    get_orcamento(&state.orcamentos, id)
        .await
        .map(Json)
        .map_err(into_http)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/traducoes/documentos/{id}/orcamentos",
    params(("id" = Uuid, Path, description = "Documento id")),
    responses((status = 200, description = "Quotes issued for the documento, newest first")),
    tag = "Traducoes"
))]
pub async fn list_orcamentos_handler(
    State(state): State<Arc<TraducoesState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Orcamento>>, (StatusCode, String)> {
    get_documento(&state.documentos, id)
        .await
        .map_err(into_http)?;
    state
        .orcamentos
        .list_by_documento(id)
        .await
        .map(Json)
        .map_err(|e| into_http(e.into()))
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AprovarRequest {
    /// "stripe" or "mercadopago".
    pub provider: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AprovarResponse {
    pub orcamento: Orcamento,
    pub checkout_url: String,
}

/// Client approves the quote: a checkout is created with the chosen provider
/// and the quote moves to `aprovado`. Payment confirmation arrives later via
/// the provider webhook.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/traducoes/orcamentos/{id}/aprovar",
    params(("id" = Uuid, Path, description = "Orcamento id")),
    request_body = AprovarRequest,
    responses(
        (status = 200, description = "Checkout created", body = AprovarResponse),
        (status = 404, description = "Unknown orcamento"),
        (status = 409, description = "Orcamento or documento is not awaiting approval"),
        (status = 502, description = "Provider refused the checkout"),
        (status = 503, description = "Provider not configured")
    ),
    tag = "Traducoes"
))]
pub async fn aprovar_orcamento_handler(
    State(state): State<Arc<TraducoesState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AprovarRequest>,
) -> Result<Json<AprovarResponse>, (StatusCode, String)> {
    aprovar_orcamento(
        &state.orcamentos,
        &state.documentos,
        &state.clientes,
        &state.checkout,
        id,
        payload,
    )
    .await
    .map(Json)
    .map_err(into_http)
}

pub(crate) async fn aprovar_orcamento<O, D, C>(
    orcamentos: &O,
    documentos: &D,
    clientes: &C,
    checkout: &CheckoutProviders,
    id: Uuid,
    payload: AprovarRequest,
) -> Result<AprovarResponse, TraducoesError>
where
    O: OrcamentosRepository + Sync,
    D: DocumentosRepository + Sync,
    C: ClientesRepository + Sync,
{
    let orcamento = get_orcamento(orcamentos, id).await?;
    require_orcamento_status(&orcamento, OrcamentoStatus::AguardandoAprovacao)?;

    // The legal team can move the documento (reject it, say) while the client
    // deliberates. No checkout for a documento that left the quote flow.
    let documento = get_documento(documentos, orcamento.documento_id).await?;
    require_documento_status(&documento, DocumentoStatus::WaitingQuoteApproval)?;

    let service = checkout
        .get(&payload.provider)
        .ok_or_else(|| TraducoesError::ProviderUnavailable(payload.provider.clone()))?;

    let payer_email = clientes
        .find_by_id(documento.cliente_id)
        .await?
        .map(|c: Cliente| c.email);

    let session = service
        .create_checkout(CheckoutRequest {
            kind: FulfillmentKind::Traducao,
            reference_id: orcamento.id.to_string(),
            title: format!("Tradução juramentada - {}", documento.nome),
            amount_cents: orcamento.valor_total_cents,
            currency: orcamento.moeda.to_lowercase(),
            payer_email,
        })
        .await
        .map_err(|e| {
            error!("Checkout creation failed for orcamento {}: {}", id, e);
            TraducoesError::CheckoutFailed(e.to_string())
        })?;

    let updated = orcamentos
        .set_payment(
            id,
            &session.provider,
            &session.payment_ref,
            OrcamentoStatus::Aprovado,
        )
        .await?
        .ok_or_else(|| TraducoesError::NotFound(format!("orcamento {id}")))?;

    info!(
        "Orcamento {} approved, {} checkout {} created",
        id, session.provider, session.payment_ref
    );
    Ok(AprovarResponse {
        orcamento: updated,
        checkout_url: session.checkout_url,
    })
}

/// Client rejects the quote: orcamento -> rejeitado, and the documento follows
/// to REJECTED when that move is still legal for it.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/traducoes/orcamentos/{id}/rejeitar",
    params(("id" = Uuid, Path, description = "Orcamento id")),
    responses(
        (status = 200, description = "Orcamento rejected"),
        (status = 404, description = "Unknown orcamento"),
        (status = 409, description = "Orcamento is not awaiting approval")
    ),
    tag = "Traducoes"
))]
pub async fn rejeitar_orcamento_handler(
    State(state): State<Arc<TraducoesState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Orcamento>, (StatusCode, String)> {
    rejeitar_orcamento(&state.orcamentos, &state.documentos, id)
        .await
        .map(Json)
        .map_err(into_http)
}

pub(crate) async fn rejeitar_orcamento<O, D>(
    orcamentos: &O,
    documentos: &D,
    id: Uuid,
) -> Result<Orcamento, TraducoesError>
where
    O: OrcamentosRepository + Sync,
    D: DocumentosRepository + Sync,
{
    let orcamento = get_orcamento(orcamentos, id).await?;
    require_orcamento_status(&orcamento, OrcamentoStatus::AguardandoAprovacao)?;

    let updated = orcamentos
        .update_status(id, OrcamentoStatus::Rejeitado)
        .await?
        .ok_or_else(|| TraducoesError::NotFound(format!("orcamento {id}")))?;

    // The documento only follows while REJECTED is a legal move for it; the
    // legal team may already have taken it elsewhere.
    match documentos.find_by_id(orcamento.documento_id).await? {
        Some(documento) => {
            let current = documento.parsed_status()?;
            if current.can_transition_to(DocumentoStatus::Rejected) {
                documentos
                    .update_status(documento.id, DocumentoStatus::Rejected, None)
                    .await?;
            } else {
                warn!(
                    "Documento {} is '{}', left untouched by quote rejection",
                    documento.id, documento.status
                );
            }
        }
        None => warn!(
            "Documento {} behind orcamento {} no longer exists",
            orcamento.documento_id, id
        ),
    }

    info!("Orcamento {} rejected by the client", id);
    Ok(updated)
}

// --- helpers ---

async fn get_documento<D>(documentos: &D, id: Uuid) -> Result<Documento, TraducoesError>
where
    D: DocumentosRepository + Sync,
{
    documentos
        .find_by_id(id)
        .await?
        .ok_or_else(|| TraducoesError::NotFound(format!("documento {id}")))
}

async fn get_orcamento<O>(orcamentos: &O, id: Uuid) -> Result<Orcamento, TraducoesError>
where
    O: OrcamentosRepository + Sync,
{
    orcamentos
        .find_by_id(id)
        .await?
        .ok_or_else(|| TraducoesError::NotFound(format!("orcamento {id}")))
}

fn require_documento_status(
    documento: &Documento,
    expected: DocumentoStatus,
) -> Result<(), TraducoesError> {
    if documento.status == expected.as_str() {
        Ok(())
    } else {
        Err(TraducoesError::WrongState {
            entity: "documento",
            expected: expected.as_str().to_string(),
            actual: documento.status.clone(),
        })
    }
}

fn require_orcamento_status(
    orcamento: &Orcamento,
    expected: OrcamentoStatus,
) -> Result<(), TraducoesError> {
    if orcamento.status == expected.as_str() {
        Ok(())
    } else {
        Err(TraducoesError::WrongState {
            entity: "orcamento",
            expected: expected.as_str().to_string(),
            actual: orcamento.status.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bora_common::services::{BoxFuture, BoxedError, CheckoutService, CheckoutSession};
    use bora_db::repositories::clientes::{Dependente, NewCliente, NewDependente};
    use bora_db::repositories::documentos::NewDocumento;
    use bora_db::DbError;
    use chrono::Utc;
    use std::sync::Mutex;

    struct FakeOrcamentos {
        rows: Mutex<Vec<Orcamento>>,
    }

    impl FakeOrcamentos {
        fn with(orcamento: Orcamento) -> Self {
            Self {
                rows: Mutex::new(vec![orcamento]),
            }
        }

        fn row(&self, id: Uuid) -> Orcamento {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|o| o.id == id)
                .cloned()
                .expect("orcamento fixture missing")
        }
    }

    impl OrcamentosRepository for FakeOrcamentos {
        async fn init_schema(&self) -> Result<(), DbError> {
            Ok(())
        }

        async fn create(&self, _orcamento: NewOrcamento) -> Result<Orcamento, DbError> {
            unimplemented!("not used by these tests")
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Orcamento>, DbError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|o| o.id == id)
                .cloned())
        }

        async fn list_by_documento(&self, _documento_id: Uuid) -> Result<Vec<Orcamento>, DbError> {
            unimplemented!("not used by these tests")
        }

        async fn update_status(
            &self,
            id: Uuid,
            status: OrcamentoStatus,
        ) -> Result<Option<Orcamento>, DbError> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows.iter_mut().find(|o| o.id == id).map(|o| {
                o.status = status.as_str().to_string();
                o.clone()
            }))
        }

        async fn set_payment(
            &self,
            id: Uuid,
            provider: &str,
            payment_ref: &str,
            status: OrcamentoStatus,
        ) -> Result<Option<Orcamento>, DbError> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows.iter_mut().find(|o| o.id == id).map(|o| {
                o.provider = Some(provider.to_string());
                o.payment_ref = Some(payment_ref.to_string());
                o.status = status.as_str().to_string();
                o.clone()
            }))
        }

        async fn find_by_payment_ref(
            &self,
            _payment_ref: &str,
        ) -> Result<Option<Orcamento>, DbError> {
            Ok(None)
        }
    }

    struct FakeDocumentos {
        rows: Mutex<Vec<Documento>>,
    }

    impl FakeDocumentos {
        fn with(documento: Documento) -> Self {
            Self {
                rows: Mutex::new(vec![documento]),
            }
        }

        fn row(&self, id: Uuid) -> Documento {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.id == id)
                .cloned()
                .expect("documento fixture missing")
        }
    }

    impl DocumentosRepository for FakeDocumentos {
        async fn init_schema(&self) -> Result<(), DbError> {
            Ok(())
        }

        async fn create(&self, _documento: NewDocumento) -> Result<Documento, DbError> {
            unimplemented!("not used by these tests")
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Documento>, DbError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.id == id)
                .cloned())
        }

        async fn list_by_cliente(&self, _cliente_id: Uuid) -> Result<Vec<Documento>, DbError> {
            unimplemented!("not used by these tests")
        }

        async fn list_by_status(
            &self,
            _status: DocumentoStatus,
        ) -> Result<Vec<Documento>, DbError> {
            unimplemented!("not used by these tests")
        }

        async fn update_status(
            &self,
            id: Uuid,
            status: DocumentoStatus,
            observacao: Option<&str>,
        ) -> Result<Option<Documento>, DbError> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows.iter_mut().find(|d| d.id == id).map(|d| {
                d.status = status.as_str().to_string();
                if let Some(obs) = observacao {
                    d.observacao = Some(obs.to_string());
                }
                d.clone()
            }))
        }

        async fn delete(&self, _id: Uuid) -> Result<bool, DbError> {
            unimplemented!("not used by these tests")
        }
    }

    struct FakeClientes;

    impl ClientesRepository for FakeClientes {
        async fn init_schema(&self) -> Result<(), DbError> {
            Ok(())
        }

        async fn create(&self, _cliente: NewCliente) -> Result<Cliente, DbError> {
            unimplemented!("not used by these tests")
        }

        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Cliente>, DbError> {
            Ok(None)
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<Cliente>, DbError> {
            unimplemented!("not used by these tests")
        }

        async fn list_by_parceiro(&self, _parceiro_id: Uuid) -> Result<Vec<Cliente>, DbError> {
            unimplemented!("not used by these tests")
        }

        async fn add_dependente(
            &self,
            _cliente_id: Uuid,
            _dependente: NewDependente,
        ) -> Result<Dependente, DbError> {
            unimplemented!("not used by these tests")
        }

        async fn list_dependentes(&self, _cliente_id: Uuid) -> Result<Vec<Dependente>, DbError> {
            unimplemented!("not used by these tests")
        }
    }

    /// Records checkout calls and answers with a canned session.
    #[derive(Default)]
    struct RecordingCheckout {
        calls: Mutex<Vec<CheckoutRequest>>,
    }

    impl CheckoutService for RecordingCheckout {
        fn create_checkout(
            &self,
            request: CheckoutRequest,
        ) -> BoxFuture<'_, CheckoutSession, BoxedError> {
            let payment_ref = format!("cs_test_{}", request.reference_id);
            self.calls.lock().unwrap().push(request);
            Box::pin(async move {
                Ok(CheckoutSession {
                    provider: "stripe".to_string(),
                    checkout_url: "https://checkout.stripe.com/c/pay/test".to_string(),
                    payment_ref,
                })
            })
        }
    }

    fn providers(service: Arc<RecordingCheckout>) -> CheckoutProviders {
        CheckoutProviders {
            stripe: Some(service),
            mercado_pago: None,
        }
    }

    fn orcamento_aguardando(documento_id: Uuid) -> Orcamento {
        Orcamento {
            id: Uuid::new_v4(),
            documento_id,
            valor_base_cents: 10_000,
            markup_percent: 20,
            valor_total_cents: 12_000,
            moeda: "BRL".to_string(),
            status: OrcamentoStatus::AguardandoAprovacao.as_str().to_string(),
            provider: None,
            payment_ref: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn documento_em(status: DocumentoStatus) -> Documento {
        Documento {
            id: Uuid::new_v4(),
            cliente_id: Uuid::new_v4(),
            processo_id: None,
            nome: "passaporte.pdf".to_string(),
            caminho: "cliente/passaporte.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            tamanho_bytes: 1024,
            status: status.as_str().to_string(),
            observacao: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn aprovar_requires_documento_awaiting_quote_approval() {
        let documento = documento_em(DocumentoStatus::Rejected);
        let orcamento = orcamento_aguardando(documento.id);
        let orcamento_id = orcamento.id;
        let orcamentos = FakeOrcamentos::with(orcamento);
        let documentos = FakeDocumentos::with(documento);
        let service = Arc::new(RecordingCheckout::default());
        let checkout = providers(service.clone());

        let err = aprovar_orcamento(
            &orcamentos,
            &documentos,
            &FakeClientes,
            &checkout,
            orcamento_id,
            AprovarRequest {
                provider: "stripe".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, TraducoesError::WrongState { .. }));
        assert_eq!(err.status_code(), 409);
        // No money moved and the quote is still open.
        assert!(service.calls.lock().unwrap().is_empty());
        assert_eq!(
            orcamentos.row(orcamento_id).status,
            OrcamentoStatus::AguardandoAprovacao.as_str()
        );
    }

    #[tokio::test]
    async fn aprovar_creates_checkout_and_marks_quote_approved() {
        let documento = documento_em(DocumentoStatus::WaitingQuoteApproval);
        let orcamento = orcamento_aguardando(documento.id);
        let orcamento_id = orcamento.id;
        let orcamentos = FakeOrcamentos::with(orcamento);
        let documentos = FakeDocumentos::with(documento);
        let service = Arc::new(RecordingCheckout::default());
        let checkout = providers(service.clone());

        let response = aprovar_orcamento(
            &orcamentos,
            &documentos,
            &FakeClientes,
            &checkout,
            orcamento_id,
            AprovarRequest {
                provider: "stripe".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(response.orcamento.status, OrcamentoStatus::Aprovado.as_str());
        assert!(response.orcamento.payment_ref.is_some());
        let calls = service.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].amount_cents, 12_000);
    }

    #[tokio::test]
    async fn rejeitar_moves_waiting_documento_to_rejected() {
        let documento = documento_em(DocumentoStatus::WaitingQuoteApproval);
        let documento_id = documento.id;
        let orcamento = orcamento_aguardando(documento_id);
        let orcamento_id = orcamento.id;
        let orcamentos = FakeOrcamentos::with(orcamento);
        let documentos = FakeDocumentos::with(documento);

        let updated = rejeitar_orcamento(&orcamentos, &documentos, orcamento_id)
            .await
            .unwrap();

        assert_eq!(updated.status, OrcamentoStatus::Rejeitado.as_str());
        assert_eq!(
            documentos.row(documento_id).status,
            DocumentoStatus::Rejected.as_str()
        );
    }

    #[tokio::test]
    async fn rejeitar_leaves_documento_alone_when_it_already_moved_on() {
        // The legal team already pushed the documento onward; the quote can
        // still be closed out, but the documento must not move backwards.
        let documento = documento_em(DocumentoStatus::WaitingTranslation);
        let documento_id = documento.id;
        let orcamento = orcamento_aguardando(documento_id);
        let orcamento_id = orcamento.id;
        let orcamentos = FakeOrcamentos::with(orcamento);
        let documentos = FakeDocumentos::with(documento);

        let updated = rejeitar_orcamento(&orcamentos, &documentos, orcamento_id)
            .await
            .unwrap();

        assert_eq!(updated.status, OrcamentoStatus::Rejeitado.as_str());
        assert_eq!(
            documentos.row(documento_id).status,
            DocumentoStatus::WaitingTranslation.as_str()
        );
    }
}
