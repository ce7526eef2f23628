// --- File: crates/bora_mercadopago/src/lib.rs ---

pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;
pub mod service;

pub use error::MercadoPagoError;
pub use routes::routes;
pub use service::MercadoPagoCheckoutService;
