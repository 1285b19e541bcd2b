//! Store configuration loading and pool construction.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use serde::Deserialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use nutritrack_auth::{AuthorityResolver, StoreError};

use crate::store::{PostgresAccountStore, PostgresRoleGraph, map_sqlx_error};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Connection settings for the account/role database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Upper bound on waiting for a pooled connection; this is the only
    /// timeout a resolver call is subject to.
    #[serde(default = "default_acquire_timeout", with = "secs")]
    pub acquire_timeout: Duration,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_acquire_timeout() -> Duration {
    Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS)
}

mod secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

impl StoreConfig {
    /// Load from `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`,
    /// `DATABASE_ACQUIRE_TIMEOUT_SECS`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("DATABASE_URL must be set"))?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS is not a number: {raw}"))?,
            None => {
                tracing::warn!(fallback = DEFAULT_MAX_CONNECTIONS, "DATABASE_MAX_CONNECTIONS not set; using default");
                DEFAULT_MAX_CONNECTIONS
            }
        };
        if max_connections == 0 {
            return Err(anyhow!("DATABASE_MAX_CONNECTIONS must be at least 1"));
        }

        let acquire_timeout = match lookup("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("DATABASE_ACQUIRE_TIMEOUT_SECS is not a number: {raw}"))?,
            ),
            None => {
                tracing::warn!(fallback = DEFAULT_ACQUIRE_TIMEOUT_SECS, "DATABASE_ACQUIRE_TIMEOUT_SECS not set; using default");
                default_acquire_timeout()
            }
        };

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout,
        })
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
    }
}

/// Open a connection pool; failure to connect is `StoreError::Unavailable`.
pub async fn connect_pool(config: &StoreConfig) -> Result<PgPool, StoreError> {
    config
        .pool_options()
        .connect(&config.database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Build a resolver over Postgres stores sharing one pool.
pub fn postgres_resolver(pool: PgPool) -> AuthorityResolver<PostgresAccountStore, PostgresRoleGraph> {
    let pool = Arc::new(pool);
    AuthorityResolver::new(
        PostgresAccountStore::from_shared(pool.clone()),
        PostgresRoleGraph::from_shared(pool),
    )
}
