//! Entity repositories.

pub mod agendamentos;
pub mod clientes;
pub mod configuracoes;
pub mod documentos;
pub mod juridico;
pub mod orcamentos;
pub mod parceiros;
pub mod processos;

pub use agendamentos::{AgendamentosRepository, SqlAgendamentosRepository};
pub use clientes::{ClientesRepository, SqlClientesRepository};
pub use configuracoes::{ConfiguracoesRepository, SqlConfiguracoesRepository};
pub use documentos::{DocumentosRepository, SqlDocumentosRepository};
pub use juridico::{JuridicoRepository, SqlJuridicoRepository};
pub use orcamentos::{OrcamentosRepository, SqlOrcamentosRepository};
pub use parceiros::{ParceirosRepository, SqlParceirosRepository};
pub use processos::{ProcessosRepository, SqlProcessosRepository};
