// --- File: crates/bora_comercial/src/handlers.rs ---
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use bora_common::{
    services::{
        BoxedError, CalendarEvent, CalendarService, CheckoutProviders, CheckoutRequest,
        FulfillmentKind,
    },
    AgendamentoStatus, HttpStatusCode,
};
use bora_config::{AppConfig, ComercialConfig};
use bora_db::repositories::{
    agendamentos::{Agendamento, NewAgendamento},
    AgendamentosRepository, ConfiguracoesRepository, SqlAgendamentosRepository,
    SqlConfiguracoesRepository,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ComercialError;
use crate::logic::{
    booking_duration, calculate_available_slots, validate_date_range, working_hours, Slot,
};

#[derive(Clone)]
pub struct ComercialState {
    pub config: Arc<AppConfig>,
    pub agendamentos: SqlAgendamentosRepository,
    pub configuracoes: SqlConfiguracoesRepository,
    pub calendar: Option<Arc<dyn CalendarService<Error = BoxedError>>>,
    pub checkout: CheckoutProviders,
}

impl ComercialState {
    fn calendar_id(&self) -> Option<String> {
        self.config
            .gcal
            .as_ref()
            .and_then(|g| g.calendar_id.clone())
    }

    fn calendar(
        &self,
    ) -> Result<(&Arc<dyn CalendarService<Error = BoxedError>>, String), ComercialError> {
        let service = self
            .calendar
            .as_ref()
            .ok_or(ComercialError::CalendarUnavailable)?;
        let calendar_id = self
            .calendar_id()
            .ok_or(ComercialError::CalendarUnavailable)?;
        Ok((service, calendar_id))
    }
}

fn into_http(err: ComercialError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, err.to_string())
}

// --- Availability ---

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct DisponibilidadeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SlotResponse {
    pub inicio: DateTime<Utc>,
    pub fim: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DisponibilidadeResponse {
    pub slots: Vec<SlotResponse>,
}

/// Free slots: configured working hours minus calendar busy times.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/comercial/disponibilidade",
    params(DisponibilidadeQuery),
    responses(
        (status = 200, description = "Available slots", body = DisponibilidadeResponse),
        (status = 400, description = "Bad date range"),
        (status = 503, description = "Calendar not configured")
    ),
    tag = "Comercial"
))]
pub async fn disponibilidade_handler(
    State(state): State<Arc<ComercialState>>,
    Query(query): Query<DisponibilidadeQuery>,
) -> Result<Json<DisponibilidadeResponse>, (StatusCode, String)> {
    validate_date_range(query.start_date, query.end_date).map_err(into_http)?;

    let comercial = state.config.comercial.clone().unwrap_or_default();
    let duration = booking_duration(query.duration_minutes, comercial.duracao_padrao_minutos)
        .map_err(into_http)?;

    let settings = state
        .configuracoes
        .get()
        .await
        .map_err(|e| into_http(e.into()))?;
    let hours = working_hours(&settings).map_err(into_http)?;

    let (service, calendar_id) = state.calendar().map_err(into_http)?;
    let range_start = query.start_date.and_time(hours.start).and_utc();
    let range_end = query.end_date.and_time(hours.end).and_utc();

    let busy = service
        .get_busy_times(&calendar_id, range_start, range_end)
        .await
        .map_err(|e| {
            error!("Busy-time lookup failed: {}", e);
            into_http(ComercialError::CalendarFailed(e.to_string()))
        })?;

    let slots = calculate_available_slots(
        query.start_date,
        query.end_date,
        duration,
        Duration::minutes(comercial.buffer_minutos),
        Duration::minutes(comercial.step_minutos),
        &hours,
        &busy,
        Utc::now(),
    );

    Ok(Json(DisponibilidadeResponse {
        slots: slots
            .into_iter()
            .map(|Slot { inicio, fim }| SlotResponse { inicio, fim })
            .collect(),
    }))
}

// --- Booking ---

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingRequest {
    pub cliente_id: Option<Uuid>,
    pub nome: String,
    pub email: String,
    pub inicio: DateTime<Utc>,
    pub duration_minutes: Option<i64>,
    /// Required when the consultation is paid: "stripe" or "mercadopago".
    pub provider: Option<String>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingResponse {
    pub agendamento: Agendamento,
    /// Present when payment is required before confirmation.
    pub checkout_url: Option<String>,
}

/// Books a slot. Free consultations are confirmed on the spot with a calendar
/// event; paid ones are stored as `pendente_pagamento` and the caller is sent
/// to the provider checkout.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/comercial/agendamentos",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Agendamento created", body = BookingResponse),
        (status = 400, description = "Bad request"),
        (status = 409, description = "Slot already taken"),
        (status = 503, description = "Calendar or provider not configured")
    ),
    tag = "Comercial"
))]
pub async fn create_agendamento_handler(
    State(state): State<Arc<ComercialState>>,
    Json(payload): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), (StatusCode, String)> {
    let comercial = state.config.comercial.clone().unwrap_or_default();
    book_agendamento(
        &state.agendamentos,
        &state.configuracoes,
        state.calendar().ok(),
        &state.checkout,
        &comercial,
        payload,
        Utc::now(),
    )
    .await
    .map(|response| (StatusCode::CREATED, Json(response)))
    .map_err(into_http)
}

pub(crate) async fn book_agendamento<A, C>(
    agendamentos: &A,
    configuracoes: &C,
    calendar: Option<(&Arc<dyn CalendarService<Error = BoxedError>>, String)>,
    checkout: &CheckoutProviders,
    comercial: &ComercialConfig,
    payload: BookingRequest,
    now: DateTime<Utc>,
) -> Result<BookingResponse, ComercialError>
where
    A: AgendamentosRepository + Sync,
    C: ConfiguracoesRepository + Sync,
{
    if payload.nome.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(ComercialError::ValidationError(
            "nome and email are required".to_string(),
        ));
    }
    if payload.inicio <= now {
        return Err(ComercialError::ValidationError(
            "inicio must be in the future".to_string(),
        ));
    }

    let duration = booking_duration(payload.duration_minutes, comercial.duracao_padrao_minutos)?;
    let fim = payload.inicio + duration;

    let overlapping = agendamentos.count_overlapping(payload.inicio, fim).await?;
    if overlapping > 0 {
        warn!("Slot {} - {} already taken", payload.inicio, fim);
        return Err(ComercialError::SlotTaken);
    }

    let valor_cents = comercial.valor_consulta_cents;

    if valor_cents == 0 {
        // Free consultation: confirm right away with a calendar event.
        let (service, calendar_id) = calendar.ok_or(ComercialError::CalendarUnavailable)?;

        let agendamento = agendamentos
            .create(NewAgendamento {
                cliente_id: payload.cliente_id,
                nome: payload.nome.clone(),
                email: payload.email.clone(),
                inicio: payload.inicio,
                fim,
                status: AgendamentoStatus::PendentePagamento,
                valor_cents,
            })
            .await?;

        let event_id = match create_calendar_event(service, &calendar_id, &agendamento).await {
            Ok(event_id) => event_id,
            Err(e) => {
                // The row must not keep holding the slot.
                release_slot(agendamentos, agendamento.id).await;
                return Err(e);
            }
        };

        let confirmed = agendamentos
            .confirm(agendamento.id, &event_id)
            .await?
            .ok_or_else(|| ComercialError::NotFound(format!("agendamento {}", agendamento.id)))?;

        info!("Agendamento {} confirmed (free consultation)", confirmed.id);
        return Ok(BookingResponse {
            agendamento: confirmed,
            checkout_url: None,
        });
    }

    // Paid consultation: hold the slot, send the client to checkout.
    let provider_name = payload.provider.as_deref().unwrap_or("stripe");
    let service = checkout
        .get(provider_name)
        .ok_or_else(|| ComercialError::ProviderUnavailable(provider_name.to_string()))?
        .clone();

    let agendamento = agendamentos
        .create(NewAgendamento {
            cliente_id: payload.cliente_id,
            nome: payload.nome.clone(),
            email: payload.email.clone(),
            inicio: payload.inicio,
            fim,
            status: AgendamentoStatus::PendentePagamento,
            valor_cents,
        })
        .await?;

    let currency = match configuracoes.get().await {
        Ok(settings) => settings.moeda.to_lowercase(),
        Err(e) => {
            release_slot(agendamentos, agendamento.id).await;
            return Err(e.into());
        }
    };

    let session = match service
        .create_checkout(CheckoutRequest {
            kind: FulfillmentKind::Agendamento,
            reference_id: agendamento.id.to_string(),
            title: format!("Consultoria comercial - {}", payload.nome),
            amount_cents: valor_cents,
            currency,
            payer_email: Some(payload.email.clone()),
        })
        .await
    {
        Ok(session) => session,
        Err(e) => {
            error!(
                "Checkout creation failed for agendamento {}: {}",
                agendamento.id, e
            );
            release_slot(agendamentos, agendamento.id).await;
            return Err(ComercialError::CheckoutFailed(e.to_string()));
        }
    };

    let updated = agendamentos
        .set_payment_ref(agendamento.id, &session.payment_ref)
        .await?
        .unwrap_or(agendamento);

    info!(
        "Agendamento {} awaiting payment via {}",
        updated.id, session.provider
    );
    Ok(BookingResponse {
        agendamento: updated,
        checkout_url: Some(session.checkout_url),
    })
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct ListAgendamentosQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/comercial/agendamentos",
    params(ListAgendamentosQuery),
    responses((status = 200, description = "Agendamentos in the range (default: next 30 days)")),
    tag = "Comercial"
))]
pub async fn list_agendamentos_handler(
    State(state): State<Arc<ComercialState>>,
    Query(query): Query<ListAgendamentosQuery>,
) -> Result<Json<Vec<Agendamento>>, (StatusCode, String)> {
    let start = query
        .start_date
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
        .unwrap_or_else(Utc::now);
    let end = query
        .end_date
        .map(|d| d.and_hms_opt(23, 59, 59).unwrap_or_default().and_utc())
        .unwrap_or_else(|| start + Duration::days(30));

    if end < start {
        return Err(into_http(ComercialError::ValidationError(
            "end_date must not be before start_date".to_string(),
        )));
    }

    state
        .agendamentos
        .list_between(start, end)
        .await
        .map(Json)
        .map_err(|e| into_http(e.into()))
}

/// Cancels an appointment and removes its calendar event, when one exists.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/comercial/agendamentos/{id}/cancelar",
    params(("id" = Uuid, Path, description = "Agendamento id")),
    responses(
        (status = 200, description = "Agendamento cancelled"),
        (status = 404, description = "Unknown agendamento"),
        (status = 409, description = "Already cancelled")
    ),
    tag = "Comercial"
))]
pub async fn cancelar_agendamento_handler(
    State(state): State<Arc<ComercialState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Agendamento>, (StatusCode, String)> {
    let agendamento = state
        .agendamentos
        .find_by_id(id)
        .await
        .map_err(|e| into_http(e.into()))?
        .ok_or_else(|| into_http(ComercialError::NotFound(format!("agendamento {id}"))))?;

    if agendamento.status == AgendamentoStatus::Cancelado.as_str() {
        return Err(into_http(ComercialError::AlreadyInState(
            agendamento.status,
        )));
    }

    if let Some(event_id) = agendamento.gcal_event_id.as_deref() {
        if let Ok((service, calendar_id)) = state.calendar() {
            if let Err(e) = service.delete_event(&calendar_id, event_id, true).await {
                // The row still gets cancelled; the orphan event is logged.
                warn!("Failed to delete calendar event {}: {}", event_id, e);
            }
        }
    }

    let cancelled = state
        .agendamentos
        .cancel(id)
        .await
        .map_err(|e| into_http(e.into()))?
        .ok_or_else(|| into_http(ComercialError::NotFound(format!("agendamento {id}"))))?;

    info!("Agendamento {} cancelled", id);
    Ok(Json(cancelled))
}

// --- Admin calendar views ---

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct CalendarEventsQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub include_cancelled: bool,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/calendar/events",
    params(CalendarEventsQuery),
    responses(
        (status = 200, description = "Booked calendar events"),
        (status = 503, description = "Calendar not configured")
    ),
    tag = "Calendar Admin"
))]
pub async fn list_calendar_events_handler(
    State(state): State<Arc<ComercialState>>,
    Query(query): Query<CalendarEventsQuery>,
) -> Result<Json<Vec<bora_common::services::BookedEvent>>, (StatusCode, String)> {
    let (service, calendar_id) = state.calendar().map_err(into_http)?;

    let start = query.start_date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    let end = query.end_date.and_hms_opt(23, 59, 59).unwrap_or_default().and_utc();

    service
        .get_booked_events(&calendar_id, start, end, query.include_cancelled)
        .await
        .map(Json)
        .map_err(|e| into_http(ComercialError::CalendarFailed(e.to_string())))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/api/calendar/events/{event_id}",
    params(("event_id" = String, Path, description = "Calendar event id")),
    responses(
        (status = 204, description = "Event removed"),
        (status = 503, description = "Calendar not configured")
    ),
    tag = "Calendar Admin"
))]
pub async fn delete_calendar_event_handler(
    State(state): State<Arc<ComercialState>>,
    Path(event_id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let (service, calendar_id) = state.calendar().map_err(into_http)?;

    service
        .delete_event(&calendar_id, &event_id, true)
        .await
        .map_err(|e| into_http(ComercialError::CalendarFailed(e.to_string())))?;

    Ok(StatusCode::NO_CONTENT)
}

// --- helpers ---

async fn create_calendar_event(
    service: &Arc<dyn CalendarService<Error = BoxedError>>,
    calendar_id: &str,
    agendamento: &Agendamento,
) -> Result<String, ComercialError> {
    let result = service
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
        .await
        .map_err(|e| {
            error!(
                "Calendar event creation failed for agendamento {}: {}",
                agendamento.id, e
            );
            ComercialError::CalendarFailed(e.to_string())
        })?;

    result.event_id.ok_or_else(|| {
        ComercialError::CalendarFailed("calendar returned no event id".to_string())
    })
}

async fn release_slot<A>(agendamentos: &A, id: Uuid)
where
    A: AgendamentosRepository + Sync,
{
    if let Err(e) = agendamentos.cancel(id).await {
        error!("Failed to release slot held by agendamento {}: {}", id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bora_common::services::{
        BookedEvent, BoxFuture, CalendarEventResult, CheckoutService, CheckoutSession,
    };
    use bora_db::repositories::configuracoes::{Configuracoes, UpdateConfiguracoes};
    use bora_db::DbError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeAgendamentos {
        rows: Mutex<Vec<Agendamento>>,
    }

    impl FakeAgendamentos {
        fn with(agendamento: Agendamento) -> Self {
            Self {
                rows: Mutex::new(vec![agendamento]),
            }
        }

        fn count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        fn last_row(&self) -> Agendamento {
            self.rows
                .lock()
                .unwrap()
                .last()
                .cloned()
                .expect("no agendamento was created")
        }
    }

    impl AgendamentosRepository for FakeAgendamentos {
        async fn init_schema(&self) -> Result<(), DbError> {
            Ok(())
        }

        async fn create(&self, agendamento: NewAgendamento) -> Result<Agendamento, DbError> {
            let row = Agendamento {
                id: Uuid::new_v4(),
                cliente_id: agendamento.cliente_id,
                nome: agendamento.nome,
                email: agendamento.email,
                inicio: agendamento.inicio,
                fim: agendamento.fim,
                status: agendamento.status.as_str().to_string(),
                gcal_event_id: None,
                payment_ref: None,
                valor_cents: agendamento.valor_cents,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
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
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<Agendamento>, DbError> {
            unimplemented!("not used by these tests")
        }

        async fn count_overlapping(
            &self,
            inicio: DateTime<Utc>,
            fim: DateTime<Utc>,
        ) -> Result<i64, DbError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|a| {
                    a.status != AgendamentoStatus::Cancelado.as_str()
                        && a.inicio < fim
                        && a.fim > inicio
                })
                .count() as i64)
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

    struct FakeConfiguracoes;

    impl ConfiguracoesRepository for FakeConfiguracoes {
        async fn init_schema(&self) -> Result<(), DbError> {
            Ok(())
        }

        async fn get(&self) -> Result<Configuracoes, DbError> {
            Ok(Configuracoes {
                id: 1,
                markup_percent: 20,
                moeda: "BRL".to_string(),
                horario_inicio: "09:00".to_string(),
                horario_fim: "18:00".to_string(),
                dias_uteis: "1,2,3,4,5".to_string(),
                updated_at: Utc::now(),
            })
        }

        async fn update(&self, _update: UpdateConfiguracoes) -> Result<Configuracoes, DbError> {
            unimplemented!("not used by these tests")
        }
    }

    /// Calendar stub; `fail_create` simulates the provider being down.
    struct StubCalendar {
        fail_create: bool,
    }

    impl CalendarService for StubCalendar {
        type Error = BoxedError;

        fn get_busy_times(
            &self,
            _calendar_id: &str,
            _start_time: DateTime<Utc>,
            _end_time: DateTime<Utc>,
        ) -> BoxFuture<'_, Vec<(DateTime<Utc>, DateTime<Utc>)>, Self::Error> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn create_event(
            &self,
            _calendar_id: &str,
            _event: CalendarEvent,
        ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
            let fail = self.fail_create;
            Box::pin(async move {
                if fail {
                    Err(BoxedError("calendar is down".to_string().into()))
                } else {
                    Ok(CalendarEventResult {
                        event_id: Some("evt_test_1".to_string()),
                        status: "confirmed".to_string(),
                    })
                }
            })
        }

        fn delete_event(
            &self,
            _calendar_id: &str,
            _event_id: &str,
            _notify_attendees: bool,
        ) -> BoxFuture<'_, (), Self::Error> {
            Box::pin(async { Ok(()) })
        }

        fn get_booked_events(
            &self,
            _calendar_id: &str,
            _start_time: DateTime<Utc>,
            _end_time: DateTime<Utc>,
            _include_cancelled: bool,
        ) -> BoxFuture<'_, Vec<BookedEvent>, Self::Error> {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    struct StubCheckout {
        fail: bool,
    }

    impl CheckoutService for StubCheckout {
        fn create_checkout(
            &self,
            request: CheckoutRequest,
        ) -> BoxFuture<'_, CheckoutSession, BoxedError> {
            let fail = self.fail;
            let payment_ref = format!("cs_test_{}", request.reference_id);
            Box::pin(async move {
                if fail {
                    Err(BoxedError("provider is down".to_string().into()))
                } else {
                    Ok(CheckoutSession {
                        provider: "stripe".to_string(),
                        checkout_url: "https://checkout.stripe.com/c/pay/test".to_string(),
                        payment_ref,
                    })
                }
            })
        }
    }

    fn calendar(fail_create: bool) -> Arc<dyn CalendarService<Error = BoxedError>> {
        Arc::new(StubCalendar { fail_create })
    }

    fn checkout_with(fail: bool) -> CheckoutProviders {
        CheckoutProviders {
            stripe: Some(Arc::new(StubCheckout { fail })),
            mercado_pago: None,
        }
    }

    fn comercial_config(valor_consulta_cents: i64) -> ComercialConfig {
        ComercialConfig {
            duracao_padrao_minutos: 30,
            buffer_minutos: 0,
            step_minutos: 30,
            valor_consulta_cents,
        }
    }

    fn booking(inicio: DateTime<Utc>) -> BookingRequest {
        BookingRequest {
            cliente_id: None,
            nome: "Maria Silva".to_string(),
            email: "maria@example.com".to_string(),
            inicio,
            duration_minutes: None,
            provider: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn tomorrow() -> DateTime<Utc> {
        now() + Duration::days(1)
    }

    #[tokio::test]
    async fn booking_rejects_blank_nome_without_touching_providers() {
        let agendamentos = FakeAgendamentos::default();
        let cal = calendar(false);
        let mut payload = booking(tomorrow());
        payload.nome = "  ".to_string();

        let err = book_agendamento(
            &agendamentos,
            &FakeConfiguracoes,
            Some((&cal, "primary".to_string())),
            &checkout_with(false),
            &comercial_config(0),
            payload,
            now(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ComercialError::ValidationError(_)));
        assert_eq!(err.status_code(), 400);
        assert_eq!(agendamentos.count(), 0);
    }

    #[tokio::test]
    async fn booking_rejects_nonpositive_duration() {
        let agendamentos = FakeAgendamentos::default();
        let cal = calendar(false);
        let mut payload = booking(tomorrow());
        payload.duration_minutes = Some(0);

        let err = book_agendamento(
            &agendamentos,
            &FakeConfiguracoes,
            Some((&cal, "primary".to_string())),
            &checkout_with(false),
            &comercial_config(0),
            payload,
            now(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert_eq!(agendamentos.count(), 0);
    }

    #[tokio::test]
    async fn booking_rejects_past_inicio() {
        let agendamentos = FakeAgendamentos::default();
        let cal = calendar(false);
        let payload = booking(now() - Duration::hours(1));

        let err = book_agendamento(
            &agendamentos,
            &FakeConfiguracoes,
            Some((&cal, "primary".to_string())),
            &checkout_with(false),
            &comercial_config(0),
            payload,
            now(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert_eq!(agendamentos.count(), 0);
    }

    #[tokio::test]
    async fn taken_slot_is_a_conflict() {
        let inicio = tomorrow();
        let cal = calendar(false);
        let agendamentos = FakeAgendamentos::default();
        // An earlier paid booking still holds the slot.
        let held = book_agendamento(
            &agendamentos,
            &FakeConfiguracoes,
            Some((&cal, "primary".to_string())),
            &checkout_with(false),
            &comercial_config(15_000),
            booking(inicio),
            now(),
        )
        .await
        .unwrap();
        assert_eq!(
            held.agendamento.status,
            AgendamentoStatus::PendentePagamento.as_str()
        );

        let err = book_agendamento(
            &agendamentos,
            &FakeConfiguracoes,
            Some((&cal, "primary".to_string())),
            &checkout_with(false),
            &comercial_config(15_000),
            booking(inicio),
            now(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ComercialError::SlotTaken));
        assert_eq!(err.status_code(), 409);
        assert_eq!(agendamentos.count(), 1);
    }

    #[tokio::test]
    async fn free_booking_is_confirmed_with_an_event() {
        let agendamentos = FakeAgendamentos::default();
        let cal = calendar(false);

        let response = book_agendamento(
            &agendamentos,
            &FakeConfiguracoes,
            Some((&cal, "primary".to_string())),
            &checkout_with(false),
            &comercial_config(0),
            booking(tomorrow()),
            now(),
        )
        .await
        .unwrap();

        assert_eq!(
            response.agendamento.status,
            AgendamentoStatus::Confirmado.as_str()
        );
        assert_eq!(
            response.agendamento.gcal_event_id.as_deref(),
            Some("evt_test_1")
        );
        assert!(response.checkout_url.is_none());
    }

    #[tokio::test]
    async fn calendar_failure_releases_the_held_slot() {
        let agendamentos = FakeAgendamentos::default();
        let cal = calendar(true);

        let err = book_agendamento(
            &agendamentos,
            &FakeConfiguracoes,
            Some((&cal, "primary".to_string())),
            &checkout_with(false),
            &comercial_config(0),
            booking(tomorrow()),
            now(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ComercialError::CalendarFailed(_)));
        // The row exists but no longer blocks the slot.
        assert_eq!(
            agendamentos.last_row().status,
            AgendamentoStatus::Cancelado.as_str()
        );
        let inicio = agendamentos.last_row().inicio;
        let fim = agendamentos.last_row().fim;
        assert_eq!(agendamentos.count_overlapping(inicio, fim).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn checkout_failure_releases_the_held_slot() {
        let agendamentos = FakeAgendamentos::default();
        let cal = calendar(false);

        let err = book_agendamento(
            &agendamentos,
            &FakeConfiguracoes,
            Some((&cal, "primary".to_string())),
            &checkout_with(true),
            &comercial_config(15_000),
            booking(tomorrow()),
            now(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ComercialError::CheckoutFailed(_)));
        assert_eq!(
            agendamentos.last_row().status,
            AgendamentoStatus::Cancelado.as_str()
        );
    }

    #[tokio::test]
    async fn paid_booking_holds_the_slot_and_returns_checkout_url() {
        let agendamentos = FakeAgendamentos::default();
        let cal = calendar(false);

        let response = book_agendamento(
            &agendamentos,
            &FakeConfiguracoes,
            Some((&cal, "primary".to_string())),
            &checkout_with(false),
            &comercial_config(15_000),
            booking(tomorrow()),
            now(),
        )
        .await
        .unwrap();

        assert_eq!(
            response.agendamento.status,
            AgendamentoStatus::PendentePagamento.as_str()
        );
        assert!(response.agendamento.payment_ref.is_some());
        assert!(response.checkout_url.is_some());
    }

    #[tokio::test]
    async fn unknown_provider_is_rejected_before_creating_a_row() {
        let agendamentos = FakeAgendamentos::default();
        let cal = calendar(false);
        let mut payload = booking(tomorrow());
        payload.provider = Some("pix".to_string());

        let err = book_agendamento(
            &agendamentos,
            &FakeConfiguracoes,
            Some((&cal, "primary".to_string())),
            &checkout_with(false),
            &comercial_config(15_000),
            payload,
            now(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ComercialError::ProviderUnavailable(_)));
        assert_eq!(err.status_code(), 503);
        assert_eq!(agendamentos.count(), 0);
    }
}
