//! Storage adapters: SeaORM/PostgreSQL and the in-memory store.

mod memory;

#[cfg(feature = "postgres")]
mod connections;
#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
mod postgres_repo;

pub use memory::{InMemoryStore, InMemoryTransaction};

#[cfg(feature = "postgres")]
pub use connections::{DatabaseConfig, connect};
#[cfg(feature = "postgres")]
pub use postgres_base::{PostgresTransaction, SeaOrmTransactionManager};

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
