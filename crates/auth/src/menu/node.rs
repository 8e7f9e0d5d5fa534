use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FlatAssignmentRecord, PermissionType};

/// Key of the synthetic root. Top-level nodes carry it as their `parentId`.
pub const MENU_ROOT_KEY: &str = "0";

/// Label of the synthetic root.
pub const MENU_ROOT_LABEL: &str = "root";

/// One node of the rendered navigation tree.
///
/// Each node exclusively owns its `children`. Field names are part of the
/// public JSON contract consumed by the UI; do not rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    /// Permission id as a decimal string.
    pub key: String,
    pub label: String,
    pub sort: String,
    pub permission_type: PermissionType,
    pub parent_id: String,
    pub level: i32,
    pub icon: String,
    pub route: String,
    pub route_file: String,
    pub path: String,
    pub method: String,
    #[serde(default)]
    pub children: Vec<MenuNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl MenuNode {
    /// The synthetic root (level 0, type `menu`, no children yet).
    pub fn root() -> Self {
        Self {
            key: MENU_ROOT_KEY.to_string(),
            label: MENU_ROOT_LABEL.to_string(),
            sort: String::new(),
            permission_type: PermissionType::Menu,
            parent_id: String::new(),
            level: 0,
            icon: String::new(),
            route: String::new(),
            route_file: String::new(),
            path: String::new(),
            method: String::new(),
            children: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Childless node for one assignment row.
    pub fn from_record(record: &FlatAssignmentRecord) -> Self {
        Self {
            key: record.permission_id.to_string(),
            label: record.permission_name.clone(),
            sort: record.sort.clone(),
            permission_type: record.permission_type.clone(),
            parent_id: record
                .parent_id
                .map(|p| p.to_string())
                .unwrap_or_else(|| MENU_ROOT_KEY.to_string()),
            level: record.level,
            icon: record.icon.clone(),
            route: record.route.clone(),
            route_file: record.route_file.clone(),
            path: record.path.clone(),
            method: record.method.clone(),
            children: Vec::new(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    pub fn is_root(&self) -> bool {
        self.level == 0 && self.key == MENU_ROOT_KEY
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes below this one (excluding itself).
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    /// Depth-first search for a node by key (including this node).
    pub fn find(&self, key: &str) -> Option<&MenuNode> {
        if self.key == key {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(key))
    }

    pub fn child_labels(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.label.as_str()).collect()
    }
}
