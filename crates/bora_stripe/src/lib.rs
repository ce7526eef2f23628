// --- File: crates/bora_stripe/src/lib.rs ---

pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;
pub mod service;

pub use error::StripeError;
pub use routes::routes;
pub use service::StripeCheckoutService;
