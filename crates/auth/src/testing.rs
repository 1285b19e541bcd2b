//! Store doubles shared by the unit tests in this crate.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use nutritrack_core::RoleId;

use crate::{Account, AccountStore, IdentityKey, Permission, RoleGraphStore, RoleNode, StoreError};

pub fn perm(id: i32, name: &str) -> Permission {
    Permission::new(id, name)
}

pub fn account(id: i64, email: &str, base_role: i32) -> Account {
    Account::new(id, IdentityKey::parse(email).unwrap(), base_role)
}

#[derive(Debug, Default)]
pub struct MapGraph {
    nodes: RwLock<HashMap<RoleId, RoleNode>>,
}

impl MapGraph {
    pub fn from_nodes(nodes: impl IntoIterator<Item = RoleNode>) -> Self {
        Self {
            nodes: RwLock::new(nodes.into_iter().map(|n| (n.id, n)).collect()),
        }
    }

    pub fn put(&self, node: RoleNode) {
        self.nodes.write().unwrap().insert(node.id, node);
    }
}

#[async_trait::async_trait]
impl RoleGraphStore for MapGraph {
    async fn get_role(&self, id: RoleId) -> Result<Option<RoleNode>, StoreError> {
        Ok(self.nodes.read().unwrap().get(&id).cloned())
    }
}

/// Counts reads, overall and per role id.
#[derive(Debug)]
pub struct CountingGraph<S> {
    inner: S,
    pub calls: AtomicUsize,
    per_id: Mutex<HashMap<RoleId, usize>>,
}

impl<S> CountingGraph<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            per_id: Mutex::new(HashMap::new()),
        }
    }

    pub fn calls_for(&self, id: RoleId) -> usize {
        self.per_id.lock().unwrap().get(&id).copied().unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl<S: RoleGraphStore> RoleGraphStore for CountingGraph<S> {
    async fn get_role(&self, id: RoleId) -> Result<Option<RoleNode>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.per_id.lock().unwrap().entry(id).or_default() += 1;
        self.inner.get_role(id).await
    }
}

/// Fails with `Unavailable` when asked for one specific role.
#[derive(Debug)]
pub struct FailingGraph<S> {
    inner: S,
    fail_on: RoleId,
}

impl<S> FailingGraph<S> {
    pub fn new(inner: S, fail_on: RoleId) -> Self {
        Self { inner, fail_on }
    }
}

#[async_trait::async_trait]
impl<S: RoleGraphStore> RoleGraphStore for FailingGraph<S> {
    async fn get_role(&self, id: RoleId) -> Result<Option<RoleNode>, StoreError> {
        if id == self.fail_on {
            return Err(StoreError::unavailable("connection refused"));
        }
        self.inner.get_role(id).await
    }
}

#[derive(Debug, Default)]
pub struct MapAccounts {
    accounts: HashMap<IdentityKey, Account>,
    unavailable: bool,
    pub calls: AtomicUsize,
}

impl MapAccounts {
    pub fn from_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: accounts.into_iter().map(|a| (a.identity.clone(), a)).collect(),
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl AccountStore for MapAccounts {
    async fn get_account(&self, identity: &IdentityKey) -> Result<Option<Account>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(StoreError::unavailable("pool timed out"));
        }
        Ok(self.accounts.get(identity).cloned())
    }
}

/// Log sink for a test-local `tracing` subscriber.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
