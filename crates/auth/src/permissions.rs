use serde::{Deserialize, Serialize};

use nutritrack_core::PermissionId;

/// A permission as stored in the role graph.
///
/// Permissions are immutable once created; equality and hashing go through
/// the whole value, but set membership on a role is by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
}

impl Permission {
    pub fn new(id: impl Into<PermissionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}
