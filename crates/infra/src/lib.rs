//! Infrastructure layer: store adapters, database config, pool wiring.

pub mod config;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use config::{StoreConfig, connect_pool, postgres_resolver};
pub use store::{InMemoryAccountStore, InMemoryRoleGraph, PostgresAccountStore, PostgresRoleGraph};
