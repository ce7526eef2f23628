// --- File: crates/bora_comercial/src/doc.rs ---
#![allow(dead_code)]
#![cfg(feature = "openapi")]
use crate::handlers::{BookingRequest, BookingResponse, DisponibilidadeResponse, SlotResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::disponibilidade_handler,
        crate::handlers::create_agendamento_handler,
        crate::handlers::list_agendamentos_handler,
        crate::handlers::cancelar_agendamento_handler,
        crate::handlers::list_calendar_events_handler,
        crate::handlers::delete_calendar_event_handler,
    ),
    components(schemas(
        BookingRequest,
        BookingResponse,
        SlotResponse,
        DisponibilidadeResponse
    )),
    tags(
        (name = "Comercial", description = "Availability and appointment booking"),
        (name = "Calendar Admin", description = "Direct calendar event management")
    )
)]
pub struct ComercialApiDoc;
