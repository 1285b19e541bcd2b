//! Read-only store boundaries consumed by the authority resolver.
//!
//! Both stores are external collaborators: the resolver only needs point
//! lookups. "Not found" is a normal `Ok(None)` answer; `Err` is reserved for
//! the store itself being unreachable or broken.

use std::sync::Arc;

use thiserror::Error;

use nutritrack_core::RoleId;

use crate::{Account, IdentityKey, RoleNode};

/// Store operation error.
///
/// These are **infrastructure errors**, never "the record does not exist".
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached (connection refused, pool
    /// exhausted, timeout, poisoned lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but the answer was unusable (query failure,
    /// undecodable row).
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Source of role nodes (name, direct permissions, direct inherited keys).
///
/// Implementations must allow concurrent reads from many resolver calls.
#[async_trait::async_trait]
pub trait RoleGraphStore: Send + Sync {
    /// Fetch one role with its direct permissions and inherited-role keys.
    async fn get_role(&self, id: RoleId) -> Result<Option<RoleNode>, StoreError>;
}

/// Source of accounts keyed by identity.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    async fn get_account(&self, identity: &IdentityKey) -> Result<Option<Account>, StoreError>;
}

#[async_trait::async_trait]
impl<S> RoleGraphStore for Arc<S>
where
    S: RoleGraphStore + ?Sized,
{
    async fn get_role(&self, id: RoleId) -> Result<Option<RoleNode>, StoreError> {
        (**self).get_role(id).await
    }
}

#[async_trait::async_trait]
impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    async fn get_account(&self, identity: &IdentityKey) -> Result<Option<Account>, StoreError> {
        (**self).get_account(identity).await
    }
}
