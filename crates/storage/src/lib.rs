//! Storage layer for pmos
//!
//! PostgreSQL (sqlx) is the primary backend. An in-memory backend with the
//! same atomicity guarantees covers local runs without a database and tests.
//! Both sit behind the async traits in [`traits`] and are dispatched through
//! [`StorageBackend`].

mod backend;
mod error;
mod memory;
pub mod pg_migrations;
mod pg_storage;
#[cfg(test)]
mod tests;
pub mod traits;
mod types;

pub use backend::StorageBackend;
pub use error::StorageError;
pub use memory::MemoryStorage;
pub use pg_storage::PgStorage;
pub use types::{
    ProfileUpdate, RewardClaim, SquadActivation, default_visibility_timeout_secs,
    max_retry_count,
};
