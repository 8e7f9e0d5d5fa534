//! The denormalized user → role → permission join row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rolegate_core::{PermissionId, RoleId, UserId};

use crate::permissions::TOP_LEVEL;
use crate::{Permission, PermissionType, Role};

/// One (user, role, permission) triple as produced by the record store.
///
/// Deliberately flat: the join spans two many-to-many relations and nothing
/// here assumes how they are stored. The same permission appears once per
/// role that grants it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatAssignmentRecord {
    pub user_id: UserId,
    pub role_id: RoleId,
    pub role_label: String,
    pub role_name: String,
    pub permission_id: PermissionId,
    pub permission_type: PermissionType,
    pub permission_name: String,
    pub route: String,
    pub route_file: String,
    pub level: i32,
    pub sort: String,
    pub parent_id: Option<PermissionId>,
    pub path: String,
    pub icon: String,
    pub method: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl FlatAssignmentRecord {
    /// Build the join row for `user_id` holding `permission` through `role`.
    pub fn join(user_id: &UserId, role: &Role, permission: &Permission) -> Self {
        Self {
            user_id: user_id.clone(),
            role_id: role.id,
            role_label: role.label.clone(),
            role_name: role.name.clone(),
            permission_id: permission.id,
            permission_type: permission.permission_type.clone(),
            permission_name: permission.name.clone(),
            route: permission.route.clone(),
            route_file: permission.route_file.clone(),
            level: permission.level,
            sort: permission.sort.clone(),
            parent_id: permission.parent_id,
            path: permission.path.clone(),
            icon: permission.icon.clone(),
            method: permission.method.clone(),
            created_at: permission.created_at,
            updated_at: permission.updated_at,
        }
    }

    /// Project the permission half of the row.
    pub fn permission(&self) -> Permission {
        Permission {
            id: self.permission_id,
            name: self.permission_name.clone(),
            permission_type: self.permission_type.clone(),
            path: self.path.clone(),
            route: self.route.clone(),
            route_file: self.route_file.clone(),
            parent_id: self.parent_id,
            level: self.level,
            sort: self.sort.clone(),
            icon: self.icon.clone(),
            method: self.method.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn is_type(&self, permission_type: &PermissionType) -> bool {
        &self.permission_type == permission_type
    }

    /// Level 1 places a menu node directly under the root.
    pub fn is_top_level(&self) -> bool {
        self.level == TOP_LEVEL
    }
}
