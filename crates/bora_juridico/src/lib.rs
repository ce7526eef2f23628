// --- File: crates/bora_juridico/src/lib.rs ---

pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;

pub use error::JuridicoError;
pub use handlers::JuridicoState;
pub use routes::routes;
