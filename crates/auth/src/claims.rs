use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::IdentityKey;

/// Claims of an already-verified principal token (transport-agnostic).
///
/// Signature checks and issuer/audience validation happen upstream; by the
/// time a value of this type exists the claims are trusted. Only the identity
/// claim matters for authority resolution, everything else is carried along.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrincipalClaims {
    /// Subject, as issued by the identity provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Verified email; this is the identity key accounts are stored under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,

    /// Any other claims present on the token.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PrincipalClaims {
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }

    /// The identity claim, if present and non-blank.
    pub fn identity_key(&self) -> Option<IdentityKey> {
        IdentityKey::from_claim(self.email.as_deref())
    }

    pub fn is_email_verified(&self) -> bool {
        self.email_verified.unwrap_or(false)
    }
}
