use serde::{Deserialize, Serialize};

use rolegate_core::{Entity, PermissionId, RoleId};

/// A named bundle of permissions.
///
/// Roles are shared by many users; a role's lifetime is independent of any
/// single user. Permissions are referenced by id, never owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    /// Unique machine label (e.g. `"admin"`).
    pub label: String,
    /// Display name.
    pub name: String,
    pub permission_ids: Vec<PermissionId>,
}

impl Role {
    pub fn new(id: RoleId, label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            name: name.into(),
            permission_ids: Vec::new(),
        }
    }

    /// Grant a permission (idempotent).
    pub fn grant(&mut self, permission: PermissionId) {
        if !self.permission_ids.contains(&permission) {
            self.permission_ids.push(permission);
        }
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = PermissionId>) -> Self {
        for p in permissions {
            self.grant(p);
        }
        self
    }
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
