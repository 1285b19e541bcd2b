//! Granted authorities and the effective authority set.
//!
//! The string forms `ROLE_<NAME>` and `PERM_<NAME>` (name uppercased) are a
//! bit-exact contract with the access-control layer that consumes them.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize, Serializer};

use nutritrack_core::DomainError;

use crate::RoleNode;

pub const ROLE_PREFIX: &str = "ROLE_";
pub const PERM_PREFIX: &str = "PERM_";

/// Whether an authority marks role membership or a granted permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AuthorityKind {
    Role,
    Permission,
}

impl AuthorityKind {
    pub fn prefix(self) -> &'static str {
        match self {
            AuthorityKind::Role => ROLE_PREFIX,
            AuthorityKind::Permission => PERM_PREFIX,
        }
    }
}

/// A single granted capability.
///
/// Names are stored uppercased, so `Authority::role("admin")` and
/// `Authority::role("ADMIN")` are the same authority. The fields are private:
/// the only way in is through [`Authority::role`], [`Authority::permission`]
/// or parsing, all of which uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Authority {
    kind: AuthorityKind,
    name: String,
}

impl Authority {
    pub fn role(name: &str) -> Self {
        Self::new(AuthorityKind::Role, name)
    }

    pub fn permission(name: &str) -> Self {
        Self::new(AuthorityKind::Permission, name)
    }

    fn new(kind: AuthorityKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_uppercase(),
        }
    }

    pub fn kind(&self) -> AuthorityKind {
        self.kind
    }

    /// The uppercased name without its prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_role(&self) -> bool {
        self.kind == AuthorityKind::Role
    }
}

impl core::fmt::Display for Authority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.name)
    }
}

/// Parses the string form. The name is uppercased like every other
/// constructor; an empty name is accepted because a role stored with an empty
/// name still renders as `ROLE_`.
impl core::str::FromStr for Authority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix(ROLE_PREFIX) {
            Ok(Authority::role(rest))
        } else if let Some(rest) = s.strip_prefix(PERM_PREFIX) {
            Ok(Authority::permission(rest))
        } else {
            Err(DomainError::validation(format!(
                "authority '{s}' must start with {ROLE_PREFIX} or {PERM_PREFIX}"
            )))
        }
    }
}

impl TryFrom<String> for Authority {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Authority> for String {
    fn from(value: Authority) -> Self {
        value.to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Effective Authority Set
// ─────────────────────────────────────────────────────────────────────────────

/// The flattened, deduplicated set of authorities a principal holds.
///
/// Iteration order is unspecified; use [`EffectiveAuthoritySet::to_strings`]
/// when a stable order is needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveAuthoritySet {
    inner: HashSet<Authority>,
}

impl EffectiveAuthoritySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, authority: Authority) -> bool {
        self.inner.insert(authority)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Membership by exact string form, e.g. `contains("PERM_LEER_USER_PROPIO")`.
    ///
    /// Agrees with [`to_strings`](Self::to_strings): `ROLE_user` is never a
    /// member because no member renders that way.
    pub fn contains(&self, authority: &str) -> bool {
        match authority.parse::<Authority>() {
            Ok(parsed) => parsed.to_string() == authority && self.inner.contains(&parsed),
            Err(_) => false,
        }
    }

    pub fn contains_authority(&self, authority: &Authority) -> bool {
        self.inner.contains(authority)
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.inner.contains(&Authority::role(name))
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.inner.contains(&Authority::permission(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Authority> {
        self.inner.iter()
    }

    pub fn roles(&self) -> impl Iterator<Item = &Authority> {
        self.inner.iter().filter(|a| a.is_role())
    }

    pub fn permissions(&self) -> impl Iterator<Item = &Authority> {
        self.inner.iter().filter(|a| !a.is_role())
    }

    /// Sorted string forms (for logging and exact comparison).
    pub fn to_strings(&self) -> BTreeSet<String> {
        self.inner.iter().map(ToString::to_string).collect()
    }
}

impl FromIterator<Authority> for EffectiveAuthoritySet {
    fn from_iter<I: IntoIterator<Item = Authority>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl Extend<Authority> for EffectiveAuthoritySet {
    fn extend<I: IntoIterator<Item = Authority>>(&mut self, iter: I) {
        self.inner.extend(iter);
    }
}

impl IntoIterator for EffectiveAuthoritySet {
    type Item = Authority;
    type IntoIter = std::collections::hash_set::IntoIter<Authority>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a> IntoIterator for &'a EffectiveAuthoritySet {
    type Item = &'a Authority;
    type IntoIter = std::collections::hash_set::Iter<'a, Authority>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl Serialize for EffectiveAuthoritySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.to_strings())
    }
}

/// Build the authority set for a collection of reached roles.
///
/// Every role contributes `ROLE_<name>`; every permission attached to any of
/// them contributes `PERM_<name>`. The result is a plain union.
pub fn authorities_for<'a, I>(roles: I) -> EffectiveAuthoritySet
where
    I: IntoIterator<Item = &'a RoleNode>,
{
    let mut set = EffectiveAuthoritySet::empty();
    for role in roles {
        set.insert(Authority::role(role.name()));
        set.extend(role.permissions.iter().map(|p| Authority::permission(p.name())));
    }
    set
}
