//! Default data set used when no database is configured.

use rolegate_auth::{Permission, PermissionType, Role, StoreError, User};
use rolegate_core::{PermissionId, RoleId, UserId};

use crate::InMemoryAssignmentStore;

/// Holds the `user` role only: dashboard menu plus the `auth_0` API.
pub const DEMO_USER_ID: &str = "demo";

/// Holds `user` and `admin`.
pub const DEMO_ADMIN_ID: &str = "admin";

pub const DEFAULT_API_PATH: &str = "auth_0";

fn permissions() -> Vec<Permission> {
    let menu = |id: u64, name: &str, sort: &str| {
        Permission::new(PermissionId::new(id), name, PermissionType::Menu).with_sort(sort)
    };

    let mut default_api = Permission::new(PermissionId::new(100), "default permission", PermissionType::Api)
        .with_path(DEFAULT_API_PATH);
    default_api.method = "all".to_string();
    let mut admin_api = Permission::new(PermissionId::new(101), "admin api", PermissionType::Api)
        .with_path("auth_1");
    admin_api.method = "GET".to_string();

    vec![
        menu(1, "Dashboard", "1").with_route("/dashboard", "views/dashboard/index.vue"),
        menu(2, "Overview", "0")
            .under(PermissionId::new(1), 2)
            .with_route("/dashboard/overview", "views/dashboard/overview.vue"),
        menu(3, "Settings", "1")
            .under(PermissionId::new(1), 2)
            .with_route("/dashboard/settings", "views/dashboard/settings.vue"),
        menu(4, "System", "2").with_route("/system", "views/system/index.vue"),
        menu(5, "Users", "0")
            .under(PermissionId::new(4), 2)
            .with_route("/system/users", "views/system/users.vue"),
        default_api,
        admin_api,
    ]
}

/// Populate `store` with the demo directory.
pub fn load_demo(store: &InMemoryAssignmentStore) -> Result<(), StoreError> {
    for permission in permissions() {
        store.put_permission(permission)?;
    }

    let user_role = Role::new(RoleId::new(1), "user", "Regular user").with_permissions(
        [1, 2, 3, 100].map(PermissionId::new),
    );
    let admin_role = Role::new(RoleId::new(2), "admin", "Administrator")
        .with_permissions([1, 4, 5, 100, 101].map(PermissionId::new));
    store.put_role(user_role)?;
    store.put_role(admin_role)?;

    let demo = UserId::new(DEMO_USER_ID).map_err(|e| StoreError::Decode(e.to_string()))?;
    let admin = UserId::new(DEMO_ADMIN_ID).map_err(|e| StoreError::Decode(e.to_string()))?;
    store.put_user(User::new(demo, "demo@rolegate.local", "Demo").with_roles([RoleId::new(1)]))?;
    store.put_user(
        User::new(admin, "admin@rolegate.local", "Admin").with_roles([RoleId::new(1), RoleId::new(2)]),
    )?;

    Ok(())
}

/// A fresh store holding the demo directory.
pub fn demo_store() -> Result<InMemoryAssignmentStore, StoreError> {
    let store = InMemoryAssignmentStore::new();
    load_demo(&store)?;
    Ok(store)
}
