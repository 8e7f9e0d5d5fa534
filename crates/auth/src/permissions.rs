use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rolegate_core::{Entity, PermissionId};

/// Kind of a permission row.
///
/// Only `api` and `menu` carry meaning. Anything else is kept verbatim in
/// [`PermissionType::Unknown`] so it never silently matches either filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PermissionType {
    /// Guards an API path.
    Api,
    /// Describes a UI menu entry.
    Menu,
    /// Unrecognised type value (raw, as stored).
    Unknown(String),
}

impl PermissionType {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("api") {
            Self::Api
        } else if trimmed.eq_ignore_ascii_case("menu") {
            Self::Menu
        } else {
            Self::Unknown(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Api => "api",
            Self::Menu => "menu",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for PermissionType {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for PermissionType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<PermissionType> for String {
    fn from(value: PermissionType) -> Self {
        match value {
            PermissionType::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl core::fmt::Display for PermissionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level of a top-level permission (direct child of the menu root).
pub const TOP_LEVEL: i32 = 1;

/// An atomic grantable capability.
///
/// Permissions form an implicit forest through `parent_id`; `None` is the
/// top-level sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub permission_type: PermissionType,
    /// Guarded resource path (`api`) or UI path (`menu`).
    pub path: String,
    pub route: String,
    pub route_file: String,
    pub parent_id: Option<PermissionId>,
    pub level: i32,
    pub sort: String,
    pub icon: String,
    pub method: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Permission {
    /// Minimal permission with empty presentation fields.
    pub fn new(
        id: PermissionId,
        name: impl Into<String>,
        permission_type: PermissionType,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            permission_type,
            path: String::new(),
            route: String::new(),
            route_file: String::new(),
            parent_id: None,
            level: TOP_LEVEL,
            sort: String::new(),
            icon: String::new(),
            method: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_route(mut self, route: impl Into<String>, route_file: impl Into<String>) -> Self {
        self.route = route.into();
        self.route_file = route_file.into();
        self
    }

    /// Nest this permission under `parent` at the given level.
    pub fn under(mut self, parent: PermissionId, level: i32) -> Self {
        self.parent_id = Some(parent);
        self.level = level;
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }
}

impl Entity for Permission {
    type Id = PermissionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_parsing_is_case_insensitive() {
        assert_eq!(PermissionType::parse("api"), PermissionType::Api);
        assert_eq!(PermissionType::parse("API"), PermissionType::Api);
        assert_eq!(PermissionType::parse(" Menu "), PermissionType::Menu);
    }

    #[test]
    fn unrecognised_type_is_kept_verbatim() {
        let ty = PermissionType::parse("Button");
        assert_eq!(ty, PermissionType::Unknown("Button".to_string()));
        assert!(!ty.is_known());
        assert_eq!(ty.to_string(), "Button");
    }

    #[test]
    fn type_serializes_as_plain_string() {
        assert_eq!(serde_json::to_string(&PermissionType::Menu).unwrap(), "\"menu\"");
        let parsed: PermissionType = serde_json::from_str("\"API\"").unwrap();
        assert_eq!(parsed, PermissionType::Api);
    }

    #[test]
    fn builder_helpers_set_hierarchy() {
        let p = Permission::new(PermissionId::new(3), "Overview", PermissionType::Menu)
            .under(PermissionId::new(1), 2)
            .with_sort("0");
        assert_eq!(p.parent_id, Some(PermissionId::new(1)));
        assert_eq!(p.level, 2);
        assert_eq!(p.sort, "0");
    }
}
