use serde::{Deserialize, Serialize};

use nutritrack_core::{Entity, RoleId};

use crate::Permission;

/// A role as fetched from the role graph store.
///
/// Inheritance edges are role *keys*, never embedded roles: the graph may
/// contain cycles (a role may even inherit itself), so nothing here owns
/// another role. Walk it by re-fetching keys through a
/// [`RoleGraphStore`](crate::RoleGraphStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleNode {
    pub id: RoleId,
    pub name: String,
    /// Permissions granted directly to this role (unique by id).
    pub permissions: Vec<Permission>,
    /// Roles this role inherits from (outgoing edges).
    pub inherits: Vec<RoleId>,
}

impl RoleNode {
    pub fn new(id: impl Into<RoleId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            permissions: Vec::new(),
            inherits: Vec::new(),
        }
    }

    /// Add a direct permission. A permission whose id is already present is ignored.
    pub fn with_permission(mut self, permission: Permission) -> Self {
        if !self.permissions.iter().any(|p| p.id == permission.id) {
            self.permissions.push(permission);
        }
        self
    }

    /// Add an inheritance edge to `parent`. Duplicate edges are ignored.
    pub fn inheriting(mut self, parent: impl Into<RoleId>) -> Self {
        let parent = parent.into();
        if !self.inherits.contains(&parent) {
            self.inherits.push(parent);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inherits_self(&self) -> bool {
        self.inherits.contains(&self.id)
    }
}

impl Entity for RoleNode {
    type Id = RoleId;

    fn id(&self) -> RoleId {
        self.id
    }
}

impl core::fmt::Display for RoleNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}
