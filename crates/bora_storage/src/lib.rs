// --- File: crates/bora_storage/src/lib.rs ---

pub mod client;
pub mod error;

pub use client::StorageClient;
pub use error::StorageError;
