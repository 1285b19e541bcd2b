use serde::Serialize;
use thiserror::Error;

use crate::{Authority, EffectiveAuthoritySet};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing authority '{0}'")]
    Forbidden(String),
}

/// Require a role marker (`ROLE_<name>`).
///
/// - No IO
/// - No panics
/// - An empty set always denies
pub fn require_role(authorities: &EffectiveAuthoritySet, role: &str) -> Result<(), AuthzError> {
    require(authorities, &Authority::role(role))
}

/// Require a permission marker (`PERM_<name>`).
pub fn require_permission(authorities: &EffectiveAuthoritySet, permission: &str) -> Result<(), AuthzError> {
    require(authorities, &Authority::permission(permission))
}

pub fn require(authorities: &EffectiveAuthoritySet, required: &Authority) -> Result<(), AuthzError> {
    if authorities.contains_authority(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.to_string()))
    }
}

/// Require at least one of `accepted`. An empty `accepted` list denies.
pub fn require_any(authorities: &EffectiveAuthoritySet, accepted: &[Authority]) -> Result<(), AuthzError> {
    if accepted.iter().any(|a| authorities.contains_authority(a)) {
        return Ok(());
    }

    let wanted = accepted.iter().map(ToString::to_string).collect::<Vec<_>>().join(" | ");
    Err(AuthzError::Forbidden(wanted))
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Why a check passed or failed, for audit logs and debugging.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub required: String,
    pub granted: bool,
    pub reason: String,
    /// Sorted string forms of everything the principal holds.
    pub held: Vec<String>,
}

pub fn explain_authorization(authorities: &EffectiveAuthoritySet, required: &Authority) -> AuthorizationExplanation {
    let held: Vec<String> = authorities.to_strings().into_iter().collect();
    let required_str = required.to_string();

    if authorities.is_empty() {
        return AuthorizationExplanation {
            required: required_str,
            granted: false,
            reason: "principal holds no authorities (unknown, inactive or unauthenticated)".to_string(),
            held,
        };
    }

    let granted = authorities.contains_authority(required);
    let reason = if granted {
        format!("principal holds '{required_str}'")
    } else {
        format!("principal lacks '{required_str}'; holds {} other authorities", held.len())
    };

    AuthorizationExplanation {
        required: required_str,
        granted,
        reason,
        held,
    }
}
