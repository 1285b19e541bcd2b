//! Store adapters behind the resolver's `AccountStore` / `RoleGraphStore` seams.
//!
//! `in_memory` is for tests and local development; `postgres` reads the
//! production account/role tables through a shared `sqlx` pool.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryAccountStore, InMemoryRoleGraph};
pub use postgres::{PostgresAccountStore, PostgresRoleGraph};

pub(crate) use postgres::map_sqlx_error;
