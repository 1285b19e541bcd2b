use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use nutritrack_auth::{Account, AccountStatus, AccountStore, IdentityKey, RoleGraphStore, RoleNode, StoreError};
use nutritrack_core::{Entity, RoleId};

/// In-memory role graph.
///
/// Intended for tests/dev. Reads take a shared lock, so concurrent resolvers
/// only contend with writers. A poisoned lock fails every operation, reads and
/// writes alike, with `StoreError::Unavailable`.
#[derive(Debug, Default)]
pub struct InMemoryRoleGraph {
    roles: RwLock<HashMap<RoleId, RoleNode>>,
}

impl InMemoryRoleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roles(roles: impl IntoIterator<Item = RoleNode>) -> Self {
        Self {
            roles: RwLock::new(roles.into_iter().map(|r| (r.id(), r)).collect()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<RoleId, RoleNode>>, StoreError> {
        self.roles
            .read()
            .map_err(|_| StoreError::unavailable("role graph lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<RoleId, RoleNode>>, StoreError> {
        self.roles
            .write()
            .map_err(|_| StoreError::unavailable("role graph lock poisoned"))
    }

    /// Insert or replace a role.
    pub fn insert(&self, role: RoleNode) -> Result<(), StoreError> {
        self.write()?.insert(role.id(), role);
        Ok(())
    }

    /// Remove a role. Edges pointing at it are left in place (they dangle).
    pub fn remove(&self, id: RoleId) -> Result<Option<RoleNode>, StoreError> {
        Ok(self.write()?.remove(&id))
    }

    /// Replace a role's inherited-role edges. `Ok(false)` if the role is unknown.
    pub fn set_inherits(&self, id: RoleId, parents: impl IntoIterator<Item = RoleId>) -> Result<bool, StoreError> {
        let mut map = self.write()?;
        let Some(role) = map.get_mut(&id) else {
            return Ok(false);
        };
        role.inherits = Vec::new();
        for parent in parents {
            if !role.inherits.contains(&parent) {
                role.inherits.push(parent);
            }
        }
        Ok(true)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }
}

#[async_trait::async_trait]
impl RoleGraphStore for InMemoryRoleGraph {
    async fn get_role(&self, id: RoleId) -> Result<Option<RoleNode>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }
}

/// In-memory account store keyed by identity.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<IdentityKey, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: RwLock::new(accounts.into_iter().map(|a| (a.identity.clone(), a)).collect()),
        }
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<IdentityKey, Account>>, StoreError> {
        self.accounts
            .write()
            .map_err(|_| StoreError::unavailable("account store lock poisoned"))
    }

    pub fn insert(&self, account: Account) -> Result<(), StoreError> {
        self.write()?.insert(account.identity.clone(), account);
        Ok(())
    }

    pub fn remove(&self, identity: &IdentityKey) -> Result<Option<Account>, StoreError> {
        Ok(self.write()?.remove(identity))
    }

    pub fn set_status(&self, identity: &IdentityKey, status: AccountStatus) -> Result<bool, StoreError> {
        self.update(identity, |a| a.status = status)
    }

    pub fn set_base_role(&self, identity: &IdentityKey, role: RoleId) -> Result<bool, StoreError> {
        self.update(identity, |a| a.base_role = role)
    }

    fn update(&self, identity: &IdentityKey, f: impl FnOnce(&mut Account)) -> Result<bool, StoreError> {
        let mut map = self.write()?;
        Ok(match map.get_mut(identity) {
            Some(account) => {
                f(account);
                true
            }
            None => false,
        })
    }
}

#[async_trait::async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get_account(&self, identity: &IdentityKey) -> Result<Option<Account>, StoreError> {
        let map = self
            .accounts
            .read()
            .map_err(|_| StoreError::unavailable("account store lock poisoned"))?;
        Ok(map.get(identity).cloned())
    }
}
