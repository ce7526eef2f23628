// --- File: crates/bora_cliente/src/lib.rs ---

pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;

pub use error::ClienteError;
pub use handlers::ClienteState;
pub use routes::routes;
