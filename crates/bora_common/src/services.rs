// --- File: crates/bora_common/src/services.rs ---
//! Service abstractions for external integrations.
//!
//! These traits decouple the feature crates from concrete providers: the
//! webhook crates (Stripe, Mercado Pago) only know how to verify and parse
//! events, and hand the business effect to a [`PaymentFulfillment`]
//! implementation wired up by the backend binary. The comercial crate talks
//! to calendars through [`CalendarService`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for
/// `Box<dyn std::error::Error + Send + Sync>`.
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// A trait for calendar service operations.
pub trait CalendarService: Send + Sync {
    /// Error type returned by calendar service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Get busy time intervals within a specified time range.
    #[allow(clippy::type_complexity)]
    fn get_busy_times(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<(DateTime<Utc>, DateTime<Utc>)>, Self::Error>;

    /// Create a calendar event.
    fn create_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error>;

    /// Delete a calendar event.
    fn delete_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        notify_attendees: bool,
    ) -> BoxFuture<'_, (), Self::Error>;

    /// Get booked events within a specified time range.
    #[allow(clippy::type_complexity)]
    fn get_booked_events(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        include_cancelled: bool,
    ) -> BoxFuture<'_, Vec<BookedEvent>, Self::Error>;
}

/// Adapter that erases a calendar service's error type so implementations
/// can be stored as `Arc<dyn CalendarService<Error = BoxedError>>`.
pub struct BoxedCalendarService<S>(pub S);

impl<S> CalendarService for BoxedCalendarService<S>
where
    S: CalendarService,
{
    type Error = BoxedError;

    fn get_busy_times(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<(DateTime<Utc>, DateTime<Utc>)>, Self::Error> {
        let fut = self.0.get_busy_times(calendar_id, start_time, end_time);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn create_event(
        &self,
        calendar_id: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, CalendarEventResult, Self::Error> {
        let fut = self.0.create_event(calendar_id, event);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn delete_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        notify_attendees: bool,
    ) -> BoxFuture<'_, (), Self::Error> {
        let fut = self.0.delete_event(calendar_id, event_id, notify_attendees);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }

    fn get_booked_events(
        &self,
        calendar_id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        include_cancelled: bool,
    ) -> BoxFuture<'_, Vec<BookedEvent>, Self::Error> {
        let fut = self
            .0
            .get_booked_events(calendar_id, start_time, end_time, include_cancelled);
        Box::pin(async move { fut.await.map_err(|e| BoxedError(Box::new(e))) })
    }
}

/// What a completed payment is supposed to unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentKind {
    /// Translation quote payment: orcamento -> pago, documento -> WAITING_TRANSLATION
    Traducao,
    /// Appointment payment: agendamento -> confirmado, calendar event created
    Agendamento,
}

impl FulfillmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentKind::Traducao => "traducao",
            FulfillmentKind::Agendamento => "agendamento",
        }
    }
}

impl fmt::Display for FulfillmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FulfillmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "traducao" => Ok(FulfillmentKind::Traducao),
            "agendamento" => Ok(FulfillmentKind::Agendamento),
            other => Err(format!("unknown fulfillment kind: {other}")),
        }
    }
}

/// Payload carried through provider metadata and handed back by webhooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulfillmentRequest {
    pub kind: FulfillmentKind,
    /// The orcamento or agendamento id being paid for.
    pub reference_id: String,
    /// Provider name, e.g. "stripe" or "mercadopago".
    pub provider: String,
    /// Provider-side payment reference (session id / payment id).
    pub payment_ref: String,
    /// Paid amount in cents, when the provider reports it.
    pub amount_cents: Option<i64>,
}

/// Applies the business effect of a confirmed payment.
///
/// Implemented once in the backend binary, where the repositories and the
/// calendar service are available. Webhook crates depend only on this trait.
pub trait PaymentFulfillment: Send + Sync {
    fn fulfill(&self, request: FulfillmentRequest) -> BoxFuture<'_, (), BoxedError>;
}

/// Input for starting a provider checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub kind: FulfillmentKind,
    /// The orcamento or agendamento id the payment is for.
    pub reference_id: String,
    /// Line-item title shown on the provider's checkout page.
    pub title: String,
    pub amount_cents: i64,
    /// ISO 4217 lowercase, e.g. "brl".
    pub currency: String,
    /// Payer email, when known (Mercado Pago wants it).
    pub payer_email: Option<String>,
}

/// A created checkout the client should be redirected to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub provider: String,
    pub checkout_url: String,
    /// Provider-side reference (session id / preference id).
    pub payment_ref: String,
}

/// A trait for payment providers that host a checkout page.
pub trait CheckoutService: Send + Sync {
    fn create_checkout(&self, request: CheckoutRequest) -> BoxFuture<'_, CheckoutSession, BoxedError>;
}

/// The configured checkout providers, keyed by name.
#[derive(Clone, Default)]
pub struct CheckoutProviders {
    pub stripe: Option<std::sync::Arc<dyn CheckoutService>>,
    pub mercado_pago: Option<std::sync::Arc<dyn CheckoutService>>,
}

impl CheckoutProviders {
    pub fn get(&self, provider: &str) -> Option<&std::sync::Arc<dyn CheckoutService>> {
        match provider {
            "stripe" => self.stripe.as_ref(),
            "mercadopago" => self.mercado_pago.as_ref(),
            _ => None,
        }
    }
}

/// Data structures for calendar service operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// The start time of the event (RFC 3339).
    pub start_time: String,
    /// The end time of the event (RFC 3339).
    pub end_time: String,
    /// The summary or title of the event.
    pub summary: String,
    /// An optional description of the event.
    pub description: Option<String>,
    #[serde(skip)]
    pub payment_ref: Option<String>,
    #[serde(skip)]
    pub payment_amount: Option<i64>,
}

/// Represents the result of a calendar event operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventResult {
    /// The ID of the event.
    pub event_id: Option<String>,
    /// The status of the event.
    pub status: String,
}

/// Represents a booked event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedEvent {
    pub event_id: String,
    pub summary: String,
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fulfillment_kind_roundtrip() {
        assert_eq!("traducao".parse(), Ok(FulfillmentKind::Traducao));
        assert_eq!("agendamento".parse(), Ok(FulfillmentKind::Agendamento));
        assert!("twilio_session".parse::<FulfillmentKind>().is_err());
    }
}
