// --- File: crates/bora_parceiro/src/lib.rs ---

pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;

pub use error::ParceiroError;
pub use handlers::ParceiroState;
pub use routes::routes;
