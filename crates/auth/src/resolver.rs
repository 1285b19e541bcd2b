//! Effective-authority resolution.
//!
//! Given a principal's identity key, look up its account and walk the role
//! inheritance graph from the account's base role, collecting every role and
//! permission reachable from it.
//!
//! # Invariants
//! - Terminates on any graph shape (cycles, self-loops, diamonds): a role id is
//!   expanded at most once per call.
//! - One account read per call, one role read per distinct role id reached.
//! - Absent identity, unknown identity and inactive accounts yield the empty
//!   set; a dangling inherited-role key is a dead end. None of these are errors.
//! - A store failure aborts the whole call; no partial set is ever returned.
//! - Nothing is cached between calls.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, error, instrument, warn};

use nutritrack_core::RoleId;

use crate::{
    AccountStore, EffectiveAuthoritySet, IdentityKey, PrincipalClaims, RoleGraphStore, RoleNode,
    StoreError, authorities_for,
};

/// Infrastructure failure while resolving authorities.
///
/// Distinct from an empty result: callers should still deny, but must be able
/// to tell an outage apart from an unauthorized principal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("account lookup for '{identity}' failed: {source}")]
    Account {
        identity: IdentityKey,
        #[source]
        source: StoreError,
    },

    #[error("role lookup for role {role_id} failed: {source}")]
    Role {
        role_id: RoleId,
        #[source]
        source: StoreError,
    },
}

impl ResolveError {
    pub fn store_error(&self) -> &StoreError {
        match self {
            ResolveError::Account { source, .. } | ResolveError::Role { source, .. } => source,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.store_error().is_transient()
    }
}

/// Result of walking the inheritance graph from one role.
#[derive(Debug, Clone, Default)]
pub struct RoleClosure {
    /// Every role id taken off the work list, found or not.
    pub visited: HashSet<RoleId>,
    /// Role nodes that were found, in expansion order.
    pub roles: Vec<RoleNode>,
    /// Visited ids the store had no record for.
    pub dangling: Vec<RoleId>,
}

impl RoleClosure {
    pub fn authorities(&self) -> EffectiveAuthoritySet {
        authorities_for(&self.roles)
    }

    pub fn contains(&self, id: RoleId) -> bool {
        self.roles.iter().any(|r| r.id == id)
    }
}

/// Computes a principal's effective authority set from the account and role
/// graph stores.
///
/// Stateless between calls; every call works on its own visited set and work
/// list, so one resolver can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct AuthorityResolver<A, R> {
    accounts: A,
    roles: R,
}

impl<A, R> AuthorityResolver<A, R>
where
    A: AccountStore,
    R: RoleGraphStore,
{
    pub fn new(accounts: A, roles: R) -> Self {
        Self { accounts, roles }
    }

    /// Resolve the authority set for an identity claim.
    ///
    /// `None` (or a blank claim) grants nothing and performs no lookup.
    /// Failures are returned, not logged; logging them is the caller's call
    /// (see [`resolve_or_deny`](Self::resolve_or_deny)).
    #[instrument(skip(self))]
    pub async fn resolve_authorities(
        &self,
        identity: Option<&str>,
    ) -> Result<EffectiveAuthoritySet, ResolveError> {
        let Some(identity) = IdentityKey::from_claim(identity) else {
            debug!("no identity claim; granting nothing");
            return Ok(EffectiveAuthoritySet::empty());
        };

        self.resolve_identity(&identity).await
    }

    /// Resolve the authority set for a trusted claim set (identity claim: `email`).
    pub async fn resolve_claims(
        &self,
        claims: &PrincipalClaims,
    ) -> Result<EffectiveAuthoritySet, ResolveError> {
        self.resolve_authorities(claims.email.as_deref()).await
    }

    /// Resolve the authority set for a parsed identity key.
    pub async fn resolve_identity(
        &self,
        identity: &IdentityKey,
    ) -> Result<EffectiveAuthoritySet, ResolveError> {
        let account = self
            .accounts
            .get_account(identity)
            .await
            .map_err(|source| ResolveError::Account {
                identity: identity.clone(),
                source,
            })?;

        let Some(account) = account else {
            debug!("no account for identity; granting nothing");
            return Ok(EffectiveAuthoritySet::empty());
        };

        if !account.is_active() {
            debug!(account_id = %account.id, status = %account.status, "account inactive; granting nothing");
            return Ok(EffectiveAuthoritySet::empty());
        }

        let closure = self.resolve_role_closure(account.base_role).await?;
        let authorities = closure.authorities();

        debug!(
            account_id = %account.id,
            base_role = %account.base_role,
            roles = closure.roles.len(),
            dangling = closure.dangling.len(),
            authorities = authorities.len(),
            "resolved effective authorities"
        );

        Ok(authorities)
    }

    /// Walk the inheritance graph from `start`.
    ///
    /// Depth-first with an explicit stack; the visited check on pop is what
    /// stops cycles.
    #[instrument(skip(self))]
    pub async fn resolve_role_closure(&self, start: RoleId) -> Result<RoleClosure, ResolveError> {
        let mut closure = RoleClosure::default();
        let mut work = vec![start];

        while let Some(id) = work.pop() {
            if !closure.visited.insert(id) {
                continue;
            }

            let node = self
                .roles
                .get_role(id)
                .await
                .map_err(|source| ResolveError::Role { role_id: id, source })?;

            match node {
                Some(node) => {
                    work.extend(node.inherits.iter().copied());
                    closure.roles.push(node);
                }
                None => {
                    warn!(role_id = %id, "role referenced but not found; skipping");
                    closure.dangling.push(id);
                }
            }
        }

        Ok(closure)
    }

    /// Resolve, denying everything on failure.
    ///
    /// The failure is logged at `error` before being turned into an empty set,
    /// so an outage never reads like an unauthorized user in the logs.
    pub async fn resolve_or_deny(&self, identity: Option<&str>) -> EffectiveAuthoritySet {
        match self.resolve_authorities(identity).await {
            Ok(set) => set,
            Err(err) => {
                error!(error = %err, transient = err.is_transient(), "authority resolution failed; denying");
                EffectiveAuthoritySet::empty()
            }
        }
    }
}
