//! Account records as seen by the authority resolver.
//!
//! The resolver never mutates an account; it only reads the identity key, the
//! activation status and the base role reference.

use serde::{Deserialize, Serialize};

use nutritrack_core::{AccountId, DomainError, DomainResult, RoleId, ValueObject};

// ─────────────────────────────────────────────────────────────────────────────
// Identity Key
// ─────────────────────────────────────────────────────────────────────────────

/// Stable identity of a principal (its verified email).
///
/// Surrounding whitespace is trimmed; case is kept as-is because accounts are
/// matched on the exact stored value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("identity key cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Parse an optional claim value; absent and blank both map to `None`.
    pub fn from_claim(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|r| Self::parse(r).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for IdentityKey {}

impl core::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for IdentityKey {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IdentityKey> for String {
    fn from(value: IdentityKey) -> Self {
        value.0
    }
}

impl core::str::FromStr for IdentityKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Account Status
// ─────────────────────────────────────────────────────────────────────────────

/// Account activation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AccountStatus {
    /// Account is active; its role graph is honoured.
    #[default]
    Active,
    /// Account is deactivated; it is granted nothing.
    Inactive,
}

impl AccountStatus {
    /// Status code stored in the `estado` column for an active account.
    pub const ACTIVE_CODE: i32 = 1;

    /// Map the stored status code. Only `1` is active.
    pub fn from_code(code: i32) -> Self {
        if code == Self::ACTIVE_CODE {
            AccountStatus::Active
        } else {
            AccountStatus::Inactive
        }
    }

    pub fn code(self) -> i32 {
        match self {
            AccountStatus::Active => Self::ACTIVE_CODE,
            AccountStatus::Inactive => 0,
        }
    }

    pub fn is_active(self) -> bool {
        self == AccountStatus::Active
    }
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccountStatus::Active => write!(f, "Active"),
            AccountStatus::Inactive => write!(f, "Inactive"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Account
// ─────────────────────────────────────────────────────────────────────────────

/// A registered account.
///
/// # Invariants
/// - Exactly one base role, referenced by key.
/// - `identity` is unique across accounts (enforced by the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub identity: IdentityKey,
    pub status: AccountStatus,
    pub base_role: RoleId,
}

impl Account {
    pub fn new(id: impl Into<AccountId>, identity: IdentityKey, base_role: impl Into<RoleId>) -> Self {
        Self {
            id: id.into(),
            identity,
            status: AccountStatus::Active,
            base_role: base_role.into(),
        }
    }

    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
