// --- File: crates/bora_configuracoes/src/lib.rs ---

pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;

pub use error::ConfiguracoesError;
pub use handlers::ConfiguracoesState;
pub use routes::routes;
