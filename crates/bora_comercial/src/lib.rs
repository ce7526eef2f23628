// --- File: crates/bora_comercial/src/lib.rs ---

pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;

pub use error::ComercialError;
pub use handlers::ComercialState;
pub use routes::routes;
