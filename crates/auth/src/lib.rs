//! `nutritrack-auth`: effective-authority resolution (fail-closed).
//!
//! Turns an authenticated principal's identity claim into the flattened set
//! of `ROLE_*` / `PERM_*` authorities reachable through the role inheritance
//! graph. Decoupled from HTTP and from any particular storage: stores are
//! consumed through [`AccountStore`] and [`RoleGraphStore`].

pub mod account;
pub mod authority;
pub mod authorize;
pub mod claims;
pub mod permissions;
pub mod resolver;
pub mod roles;
pub mod store;

#[cfg(test)]
mod testing;

pub use account::{Account, AccountStatus, IdentityKey};
pub use authority::{Authority, AuthorityKind, EffectiveAuthoritySet, PERM_PREFIX, ROLE_PREFIX, authorities_for};
pub use authorize::{
    AuthorizationExplanation, AuthzError, explain_authorization, require, require_any, require_permission,
    require_role,
};
pub use claims::PrincipalClaims;
pub use permissions::Permission;
pub use resolver::{AuthorityResolver, ResolveError, RoleClosure};
pub use roles::RoleNode;
pub use store::{AccountStore, RoleGraphStore, StoreError};
