//! User identity as seen by the authorization layer.

use serde::{Deserialize, Serialize};

use rolegate_core::{Entity, RoleId, UserId};

/// A user and its role assignments (many-to-many).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role_ids: Vec<RoleId>,
}

impl User {
    pub fn new(id: UserId, email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into().trim().to_lowercase(),
            display_name: display_name.into(),
            role_ids: Vec::new(),
        }
    }

    /// Assign a role (idempotent).
    pub fn assign(&mut self, role: RoleId) {
        if !self.role_ids.contains(&role) {
            self.role_ids.push(role);
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = RoleId>) -> Self {
        for r in roles {
            self.assign(r);
        }
        self
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
