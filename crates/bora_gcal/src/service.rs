// --- File: crates/bora_gcal/src/service.rs ---
//! [`CalendarService`] implementation backed by the Google Calendar API.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use bora_common::services::{
    BookedEvent, BoxFuture, CalendarEvent, CalendarEventResult, CalendarService,
};
use google_calendar3::api::{Event, EventDateTime, FreeBusyRequest, FreeBusyRequestItem};

use crate::auth::HubType;

#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("Failed to parse time: {0}")]
    TimeParseError(String),
    #[error("End time must be after start time")]
    InvalidRange,
    #[error("Booking conflict")]
    Conflict,
}

pub struct GoogleCalendarService {
    calendar_hub: Arc<HubType>,
}

impl GoogleCalendarService {
    pub fn new(calendar_hub: Arc<HubType>) -> Self {
        Self { calendar_hub }
    }
}

impl CalendarService for GoogleCalendarService {
    type Error = GcalServiceError;

    /// Busy intervals from the freebusy endpoint, sorted by start.
    fn get_busy_times(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<(DateTime<Utc>, DateTime<Utc>)>, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let req = FreeBusyRequest {
                time_min: Some(start_time),
                time_max: Some(end_time),
                time_zone: Some("UTC".to_string()),
                items: Some(vec![FreeBusyRequestItem {
                    id: Some(calendar_id.to_string()),
                    ..Default::default()
                }]),
                ..Default::default()
            };

            let (_response, freebusy_response) =
                calendar_hub.freebusy().query(req).doit().await?;

            let mut busy_periods = Vec::new();
            if let Some(calendars) = freebusy_response.calendars {
                if let Some(cal_info) = calendars.get(&calendar_id) {
                    if let Some(busy_times) = &cal_info.busy {
                        for period in busy_times {
                            if let (Some(start_dt), Some(end_dt)) = (period.start, period.end) {
                                busy_periods.push((start_dt, end_dt));
                            } else {
                                warn!("Skipping busy period with missing start/end: {:?}", period);
                            }
                        }
                    }
                }
            }
            busy_periods.sort_by_key(|k| k.0);
            Ok(busy_periods)
        })
    }

    /// Inserts an event after a freebusy conflict check over its window.
    fn create_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();
        let this = self;

        Box::pin(async move {
            let start_dt = DateTime::parse_from_rfc3339(&event.start_time)
                .map_err(|e| GcalServiceError::TimeParseError(format!("Invalid start_time: {e}")))?
                .with_timezone(&Utc);
            let end_dt = DateTime::parse_from_rfc3339(&event.end_time)
                .map_err(|e| GcalServiceError::TimeParseError(format!("Invalid end_time: {e}")))?
                .with_timezone(&Utc);

            if end_dt <= start_dt {
                return Err(GcalServiceError::InvalidRange);
            }

            let busy_times = this.get_busy_times(&calendar_id, start_dt, end_dt).await?;
            for (busy_start, busy_end) in &busy_times {
                if start_dt < *busy_end && end_dt > *busy_start {
                    return Err(GcalServiceError::Conflict);
                }
            }

            let new_event = Event {
                summary: Some(event.summary),
                description: event.description,
                start: Some(EventDateTime {
                    date_time: Some(start_dt),
                    time_zone: Some("UTC".to_string()),
                    ..Default::default()
                }),
                end: Some(EventDateTime {
                    date_time: Some(end_dt),
                    time_zone: Some("UTC".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            };

            let (_response, created_event) = calendar_hub
                .events()
                .insert(new_event, &calendar_id)
                .doit()
                .await?;

            debug!("Created calendar event {:?}", created_event.id);
            Ok(CalendarEventResult {
                event_id: created_event.id,
                status: created_event
                    .status
                    .unwrap_or_else(|| "confirmed".to_string()),
            })
        })
    }

    /// Deletes an event. A 404 from the API counts as already deleted.
    fn delete_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        notify_attendees: bool,
    ) -> BoxFuture<'_, (), Self::Error> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let delete_result = calendar_hub
                .events()
                .delete(&calendar_id, &event_id)
                .send_updates(if notify_attendees { "all" } else { "none" })
                .doit()
                .await;

            match delete_result {
                Ok(_) => Ok(()),
                Err(e) if e.to_string().contains("404") => {
                    warn!("Event {} already gone, treating delete as success", event_id);
                    Ok(())
                }
                Err(e) => Err(GcalServiceError::ApiError(e)),
            }
        })
    }

    fn get_booked_events(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        include_cancelled: bool,
    ) -> BoxFuture<'_, Vec<BookedEvent>, Self::Error> {
        let calendar_id = calendar_id.to_string();
        let calendar_hub = self.calendar_hub.clone();

        Box::pin(async move {
            let request = calendar_hub
                .events()
                .list(&calendar_id)
                .time_min(start_time)
                .time_max(end_time)
                .single_events(true)
                .order_by("startTime")
                .show_deleted(include_cancelled);

            let (_, events_list) = request.doit().await?;

            let mut booked_events = Vec::new();
            if let Some(items) = events_list.items {
                for event in items {
                    let status = event.status.as_deref().unwrap_or("confirmed");
                    if !include_cancelled && status == "cancelled" {
                        continue;
                    }

                    // All-day events only carry a date, not a datetime
                    let start_time = event
                        .start
                        .and_then(|s| {
                            s.date_time
                                .map(|dt| dt.to_rfc3339())
                                .or_else(|| s.date.map(|d| format!("{d}T00:00:00Z")))
                        })
                        .unwrap_or_else(|| "unknown".to_string());
                    let end_time = event
                        .end
                        .and_then(|e| {
                            e.date_time
                                .map(|dt| dt.to_rfc3339())
                                .or_else(|| e.date.map(|d| format!("{d}T23:59:59Z")))
                        })
                        .unwrap_or_else(|| "unknown".to_string());

                    booked_events.push(BookedEvent {
                        event_id: event.id.unwrap_or_default(),
                        summary: event.summary.unwrap_or_default(),
                        description: event.description,
                        start_time,
                        end_time,
                        status: status.to_string(),
                    });
                }
            }

            Ok(booked_events)
        })
    }
}
