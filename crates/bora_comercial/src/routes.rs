// --- File: crates/bora_comercial/src/routes.rs ---

use crate::handlers::{
    cancelar_agendamento_handler, create_agendamento_handler, delete_calendar_event_handler,
    disponibilidade_handler, list_agendamentos_handler, list_calendar_events_handler,
    ComercialState,
};
use axum::{
    routing::{delete, get, post},
    Router,
};
use bora_common::services::{BoxedError, CalendarService, CheckoutProviders};
use bora_config::AppConfig;
use bora_db::repositories::{SqlAgendamentosRepository, SqlConfiguracoesRepository};
use bora_db::DbClient;
use std::sync::Arc;

/// Creates a router containing all commercial-scheduling routes.
///
/// `calendar` is optional: without it the availability and admin endpoints
/// answer 503, but bookings stored before a calendar outage stay readable.
pub fn routes(
    config: Arc<AppConfig>,
    db_client: DbClient,
    calendar: Option<Arc<dyn CalendarService<Error = BoxedError>>>,
    checkout: CheckoutProviders,
) -> Router {
    let state = Arc::new(ComercialState {
        config,
        agendamentos: SqlAgendamentosRepository::new(db_client.clone()),
        configuracoes: SqlConfiguracoesRepository::new(db_client),
        calendar,
        checkout,
    });

    Router::new()
        .route("/comercial/disponibilidade", get(disponibilidade_handler))
        .route(
            "/comercial/agendamentos",
            post(create_agendamento_handler).get(list_agendamentos_handler),
        )
        .route(
            "/comercial/agendamentos/{id}/cancelar",
            post(cancelar_agendamento_handler),
        )
        .route("/api/calendar/events", get(list_calendar_events_handler))
        .route(
            "/api/calendar/events/{event_id}",
            delete(delete_calendar_event_handler),
        )
        .with_state(state)
}
