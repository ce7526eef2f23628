// --- File: crates/bora_traducoes/src/lib.rs ---

pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;

pub use error::TraducoesError;
pub use handlers::TraducoesState;
pub use routes::routes;
