// --- File: crates/services/bora_backend/src/fulfillment.rs ---
//! The business effect of a confirmed payment.
//!
//! Both webhook crates hand verified payments here. The implementation is
//! idempotent: providers retry notifications, so an already-fulfilled
//! reference is acknowledged without side effects.

use bora_common::services::{
    BoxFuture, BoxedError, CalendarEvent, CalendarService, FulfillmentKind, FulfillmentRequest,
    PaymentFulfillment,
};
use bora_common::{DocumentoStatus, OrcamentoStatus};
use bora_db::repositories::{
    agendamentos::Agendamento, orcamentos::Orcamento, AgendamentosRepository,
    DocumentosRepository, OrcamentosRepository, SqlAgendamentosRepository,
    SqlDocumentosRepository, SqlOrcamentosRepository,
};
use std::error::Error as StdError;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct BoraFulfillment<
    O = SqlOrcamentosRepository,
    D = SqlDocumentosRepository,
    A = SqlAgendamentosRepository,
> {
    pub orcamentos: O,
    pub documentos: D,
    pub agendamentos: A,
    pub calendar: Option<Arc<dyn CalendarService<Error = BoxedError>>>,
    pub calendar_id: Option<String>,
}

fn boxed<E: StdError + Send + Sync + 'static>(e: E) -> BoxedError {
    BoxedError(Box::new(e))
}

fn invalid(msg: String) -> BoxedError {
    BoxedError(msg.into())
}

impl<O, D, A> BoraFulfillment<O, D, A>
where
    O: OrcamentosRepository + Sync,
    D: DocumentosRepository + Sync,
    A: AgendamentosRepository + Sync,
{
    async fn fulfill_traducao(&self, request: &FulfillmentRequest) -> Result<(), BoxedError> {
        let orcamento = self.find_orcamento(request).await?;

        if orcamento.status == OrcamentoStatus::Pago.as_str() {
            info!("Orcamento {} already paid, nothing to do", orcamento.id);
            return Ok(());
        }

        self.orcamentos
            .set_payment(
                orcamento.id,
                &request.provider,
                &request.payment_ref,
                OrcamentoStatus::Pago,
            )
            .await
            .map_err(boxed)?;

        // The documento may have been rejected or reworked between checkout
        // and payment. The payment is recorded either way; the documento only
        // moves when the workflow allows it.
        match self
            .documentos
            .find_by_id(orcamento.documento_id)
            .await
            .map_err(boxed)?
        {
            Some(documento) => {
                let current = documento.parsed_status().map_err(boxed)?;
                if current.can_transition_to(DocumentoStatus::WaitingTranslation) {
                    self.documentos
                        .update_status(documento.id, DocumentoStatus::WaitingTranslation, None)
                        .await
                        .map_err(boxed)?;
                    info!(
                        "Orcamento {} paid via {}, documento {} moved to translation",
                        orcamento.id, request.provider, documento.id
                    );
                } else {
                    error!(
                        "Orcamento {} paid via {}, but documento {} is '{}' and stays put",
                        orcamento.id, request.provider, documento.id, documento.status
                    );
                }
            }
            None => error!(
                "Orcamento {} paid, but documento {} no longer exists",
                orcamento.id, orcamento.documento_id
            ),
        }

        Ok(())
    }

    /// Checkout references the orcamento by its payment_ref when it was
    /// created through the approval flow; direct dashboard checkouts carry
    /// the orcamento id instead.
    async fn find_orcamento(&self, request: &FulfillmentRequest) -> Result<Orcamento, BoxedError> {
        if let Some(orcamento) = self
            .orcamentos
            .find_by_payment_ref(&request.payment_ref)
            .await
            .map_err(boxed)?
        {
            return Ok(orcamento);
        }

        let id: Uuid = request
            .reference_id
            .parse()
            .map_err(|_| invalid(format!("'{}' is not an orcamento id", request.reference_id)))?;
        self.orcamentos
            .find_by_id(id)
            .await
            .map_err(boxed)?
            .ok_or_else(|| invalid(format!("orcamento {id} not found")))
    }

    async fn fulfill_agendamento(&self, request: &FulfillmentRequest) -> Result<(), BoxedError> {
        let id: Uuid = request.reference_id.parse().map_err(|_| {
            invalid(format!(
                "'{}' is not an agendamento id",
                request.reference_id
            ))
        })?;
        let agendamento = self
            .agendamentos
            .find_by_id(id)
            .await
            .map_err(boxed)?
            .ok_or_else(|| invalid(format!("agendamento {id} not found")))?;

        if agendamento.status == "confirmado" {
            info!("Agendamento {} already confirmed, nothing to do", id);
            return Ok(());
        }
        if agendamento.status == "cancelado" {
            // Acknowledge so the provider stops retrying; the refund is a
            // back-office decision.
            error!(
                "Payment {} received for cancelled agendamento {}",
                request.payment_ref, id
            );
            return Ok(());
        }

        self.agendamentos
            .set_payment_ref(id, &request.payment_ref)
            .await
            .map_err(boxed)?;

        let event_id = self.create_event(&agendamento).await;

        self.agendamentos
            .confirm(id, event_id.as_deref().unwrap_or(""))
            .await
            .map_err(boxed)?;

        info!(
            "Agendamento {} confirmed after payment via {}",
            id, request.provider
        );
        Ok(())
    }

    /// A calendar failure must not lose the paid booking, so event creation
    /// is best-effort here.
    async fn create_event(&self, agendamento: &Agendamento) -> Option<String> {
        let (calendar, calendar_id) = match (&self.calendar, &self.calendar_id) {
            (Some(calendar), Some(calendar_id)) => (calendar, calendar_id),
            _ => {
                warn!(
                    "Calendar not configured, agendamento {} confirmed without an event",
                    agendamento.id
                );
                return None;
            }
        };

        let result = calendar
            .create_event(
                calendar_id,
                CalendarEvent {
                    start_time: agendamento.inicio.to_rfc3339(),
                    end_time: agendamento.fim.to_rfc3339(),
                    summary: format!("Consultoria - {}", agendamento.nome),
                    description: Some(format!("Agendado por {}", agendamento.email)),
                    payment_ref: agendamento.payment_ref.clone(),
                    payment_amount: Some(agendamento.valor_cents),
                },
            )
            .await;

        match result {
            Ok(created) => created.event_id,
            Err(e) => {
                error!(
                    "Calendar event creation failed for paid agendamento {}: {}",
                    agendamento.id, e
                );
                None
            }
        }
    }
}

impl<O, D, A> PaymentFulfillment for BoraFulfillment<O, D, A>
where
    O: OrcamentosRepository + Send + Sync,
    D: DocumentosRepository + Send + Sync,
    A: AgendamentosRepository + Send + Sync,
{
    fn fulfill(&self, request: FulfillmentRequest) -> BoxFuture<'_, (), BoxedError> {
        Box::pin(async move {
            match request.kind {
                FulfillmentKind::Traducao => self.fulfill_traducao(&request).await,
                FulfillmentKind::Agendamento => self.fulfill_agendamento(&request).await,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bora_common::AgendamentoStatus;
    use bora_db::repositories::agendamentos::NewAgendamento;
    use bora_db::repositories::documentos::{Documento, NewDocumento};
    use bora_db::repositories::orcamentos::NewOrcamento;
    use bora_db::DbError;
    use chrono::{Duration, Utc};
    use std::sync::Mutex;

    struct FakeOrcamentos {
        rows: Mutex<Vec<Orcamento>>,
        payment_writes: Mutex<u32>,
    }

    impl FakeOrcamentos {
        fn with(orcamento: Orcamento) -> Self {
            Self {
                rows: Mutex::new(vec![orcamento]),
                payment_writes: Mutex::new(0),
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
            *self.payment_writes.lock().unwrap() += 1;
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
            payment_ref: &str,
        ) -> Result<Option<Orcamento>, DbError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|o| o.payment_ref.as_deref() == Some(payment_ref))
                .cloned())
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

    struct FakeAgendamentos {
        rows: Mutex<Vec<Agendamento>>,
    }

    impl FakeAgendamentos {
        fn with(agendamento: Agendamento) -> Self {
            Self {
                rows: Mutex::new(vec![agendamento]),
            }
        }

        fn row(&self, id: Uuid) -> Agendamento {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == id)
                .cloned()
                .expect("agendamento fixture missing")
        }
    }

    impl AgendamentosRepository for FakeAgendamentos {
        async fn init_schema(&self) -> Result<(), DbError> {
            Ok(())
        }

        async fn create(&self, _agendamento: NewAgendamento) -> Result<Agendamento, DbError> {
            unimplemented!("not used by these tests")
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Agendamento>, DbError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == id)
                .cloned())
        }

        async fn list_between(
            &self,
            _start: chrono::DateTime<Utc>,
            _end: chrono::DateTime<Utc>,
        ) -> Result<Vec<Agendamento>, DbError> {
            unimplemented!("not used by these tests")
        }

        async fn count_overlapping(
            &self,
            _inicio: chrono::DateTime<Utc>,
            _fim: chrono::DateTime<Utc>,
        ) -> Result<i64, DbError> {
            unimplemented!("not used by these tests")
        }

        async fn confirm(
            &self,
            id: Uuid,
            gcal_event_id: &str,
        ) -> Result<Option<Agendamento>, DbError> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows.iter_mut().find(|a| a.id == id).map(|a| {
                a.status = AgendamentoStatus::Confirmado.as_str().to_string();
                a.gcal_event_id = Some(gcal_event_id.to_string());
                a.clone()
            }))
        }

        async fn cancel(&self, id: Uuid) -> Result<Option<Agendamento>, DbError> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows.iter_mut().find(|a| a.id == id).map(|a| {
                a.status = AgendamentoStatus::Cancelado.as_str().to_string();
                a.clone()
            }))
        }

        async fn set_payment_ref(
            &self,
            id: Uuid,
            payment_ref: &str,
        ) -> Result<Option<Agendamento>, DbError> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows.iter_mut().find(|a| a.id == id).map(|a| {
                a.payment_ref = Some(payment_ref.to_string());
                a.clone()
            }))
        }
    }

    fn documento_em(status: DocumentoStatus) -> Documento {
        Documento {
            id: Uuid::new_v4(),
            cliente_id: Uuid::new_v4(),
            processo_id: None,
            nome: "certidao.pdf".to_string(),
            caminho: "cliente/certidao.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            tamanho_bytes: 2048,
            status: status.as_str().to_string(),
            observacao: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn orcamento_em(documento_id: Uuid, status: OrcamentoStatus) -> Orcamento {
        Orcamento {
            id: Uuid::new_v4(),
            documento_id,
            valor_base_cents: 10_000,
            markup_percent: 20,
            valor_total_cents: 12_000,
            moeda: "BRL".to_string(),
            status: status.as_str().to_string(),
            provider: Some("stripe".to_string()),
            payment_ref: Some("cs_test_ref".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn agendamento_em(status: AgendamentoStatus) -> Agendamento {
        let inicio = Utc::now() + Duration::days(1);
        Agendamento {
            id: Uuid::new_v4(),
            cliente_id: None,
            nome: "Maria Silva".to_string(),
            email: "maria@example.com".to_string(),
            inicio,
            fim: inicio + Duration::minutes(30),
            status: status.as_str().to_string(),
            gcal_event_id: None,
            payment_ref: None,
            valor_cents: 15_000,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn fulfillment(
        orcamentos: FakeOrcamentos,
        documentos: FakeDocumentos,
        agendamentos: FakeAgendamentos,
    ) -> BoraFulfillment<FakeOrcamentos, FakeDocumentos, FakeAgendamentos> {
        BoraFulfillment {
            orcamentos,
            documentos,
            agendamentos,
            calendar: None,
            calendar_id: None,
        }
    }

    fn traducao_request(orcamento: &Orcamento) -> FulfillmentRequest {
        FulfillmentRequest {
            kind: FulfillmentKind::Traducao,
            reference_id: orcamento.id.to_string(),
            payment_ref: "cs_test_ref".to_string(),
            provider: "stripe".to_string(),
            amount_cents: Some(orcamento.valor_total_cents),
        }
    }

    #[tokio::test]
    async fn paid_quote_moves_documento_to_translation() {
        let documento = documento_em(DocumentoStatus::WaitingQuoteApproval);
        let documento_id = documento.id;
        let orcamento = orcamento_em(documento_id, OrcamentoStatus::Aprovado);
        let request = traducao_request(&orcamento);
        let orcamento_id = orcamento.id;
        let f = fulfillment(
            FakeOrcamentos::with(orcamento),
            FakeDocumentos::with(documento),
            FakeAgendamentos::with(agendamento_em(AgendamentoStatus::PendentePagamento)),
        );

        f.fulfill(request).await.unwrap();

        assert_eq!(
            f.orcamentos.row(orcamento_id).status,
            OrcamentoStatus::Pago.as_str()
        );
        assert_eq!(
            f.documentos.row(documento_id).status,
            DocumentoStatus::WaitingTranslation.as_str()
        );
    }

    #[tokio::test]
    async fn payment_for_rejected_documento_is_recorded_but_does_not_move_it() {
        // A late payment must not drag a rejected documento back into the
        // translation queue.
        let documento = documento_em(DocumentoStatus::Rejected);
        let documento_id = documento.id;
        let orcamento = orcamento_em(documento_id, OrcamentoStatus::Aprovado);
        let request = traducao_request(&orcamento);
        let orcamento_id = orcamento.id;
        let f = fulfillment(
            FakeOrcamentos::with(orcamento),
            FakeDocumentos::with(documento),
            FakeAgendamentos::with(agendamento_em(AgendamentoStatus::PendentePagamento)),
        );

        f.fulfill(request).await.unwrap();

        assert_eq!(
            f.orcamentos.row(orcamento_id).status,
            OrcamentoStatus::Pago.as_str()
        );
        assert_eq!(
            f.documentos.row(documento_id).status,
            DocumentoStatus::Rejected.as_str()
        );
    }

    #[tokio::test]
    async fn replayed_payment_notification_is_a_no_op() {
        let documento = documento_em(DocumentoStatus::WaitingTranslation);
        let documento_id = documento.id;
        let orcamento = orcamento_em(documento_id, OrcamentoStatus::Pago);
        let request = traducao_request(&orcamento);
        let f = fulfillment(
            FakeOrcamentos::with(orcamento),
            FakeDocumentos::with(documento),
            FakeAgendamentos::with(agendamento_em(AgendamentoStatus::PendentePagamento)),
        );

        f.fulfill(request).await.unwrap();

        assert_eq!(*f.orcamentos.payment_writes.lock().unwrap(), 0);
        assert_eq!(
            f.documentos.row(documento_id).status,
            DocumentoStatus::WaitingTranslation.as_str()
        );
    }

    #[tokio::test]
    async fn paid_booking_is_confirmed_even_without_calendar() {
        let agendamento = agendamento_em(AgendamentoStatus::PendentePagamento);
        let agendamento_id = agendamento.id;
        let request = FulfillmentRequest {
            kind: FulfillmentKind::Agendamento,
            reference_id: agendamento_id.to_string(),
            payment_ref: "cs_test_booking".to_string(),
            provider: "stripe".to_string(),
            amount_cents: Some(15_000),
        };
        let f = fulfillment(
            FakeOrcamentos::with(orcamento_em(Uuid::new_v4(), OrcamentoStatus::Aprovado)),
            FakeDocumentos::with(documento_em(DocumentoStatus::Pending)),
            FakeAgendamentos::with(agendamento),
        );

        f.fulfill(request).await.unwrap();

        let row = f.agendamentos.row(agendamento_id);
        assert_eq!(row.status, AgendamentoStatus::Confirmado.as_str());
        assert_eq!(row.payment_ref.as_deref(), Some("cs_test_booking"));
    }

    #[tokio::test]
    async fn payment_for_cancelled_booking_is_acknowledged_without_confirming() {
        let agendamento = agendamento_em(AgendamentoStatus::Cancelado);
        let agendamento_id = agendamento.id;
        let request = FulfillmentRequest {
            kind: FulfillmentKind::Agendamento,
            reference_id: agendamento_id.to_string(),
            payment_ref: "cs_test_late".to_string(),
            provider: "stripe".to_string(),
            amount_cents: Some(15_000),
        };
        let f = fulfillment(
            FakeOrcamentos::with(orcamento_em(Uuid::new_v4(), OrcamentoStatus::Aprovado)),
            FakeDocumentos::with(documento_em(DocumentoStatus::Pending)),
            FakeAgendamentos::with(agendamento),
        );

        f.fulfill(request).await.unwrap();

        let row = f.agendamentos.row(agendamento_id);
        assert_eq!(row.status, AgendamentoStatus::Cancelado.as_str());
        assert!(row.payment_ref.is_none());
    }
}
