//! Database layer for the BoraExpandir backend.
//!
//! One repository per entity, each with an `init_schema` that creates its
//! tables when missing. Repositories are traits so handlers can be tested
//! against mocks; the SQL implementations live next to them.

pub mod client;
pub mod error;
pub mod repositories;

pub use client::{DbClient, DbTransaction};
pub use error::DbError;
