use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

use rolegate_auth::{
    AssignmentStore, FlatAssignmentRecord, Permission, PermissionType, Role, SortDirection,
    StoreError, User,
};
use rolegate_core::{Entity, PermissionId, RoleId, UserId};

#[derive(Debug, Default)]
struct Directory {
    users: HashMap<UserId, User>,
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, Permission>,
}

/// In-memory user/role/permission directory.
///
/// Intended for tests/dev. Performs the same user → role → permission join
/// the SQL store does; dangling role or permission references are skipped.
#[derive(Debug, Default)]
pub struct InMemoryAssignmentStore {
    directory: RwLock<Directory>,
}

impl InMemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user (keyed by id).
    pub fn put_user(&self, user: User) -> Result<(), StoreError> {
        upsert(&mut self.write()?.users, user);
        Ok(())
    }

    pub fn put_role(&self, role: Role) -> Result<(), StoreError> {
        upsert(&mut self.write()?.roles, role);
        Ok(())
    }

    pub fn put_permission(&self, permission: Permission) -> Result<(), StoreError> {
        upsert(&mut self.write()?.permissions, permission);
        Ok(())
    }

    /// Remove a permission; roles still referencing it simply stop yielding it.
    pub fn remove_permission(&self, id: PermissionId) -> Result<Option<Permission>, StoreError> {
        Ok(self.write()?.permissions.remove(&id))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Directory>, StoreError> {
        self.directory
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Directory>, StoreError> {
        self.directory
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

fn upsert<E>(map: &mut HashMap<E::Id, E>, entity: E)
where
    E: Entity,
    E::Id: Hash + Eq,
{
    map.insert(entity.id().clone(), entity);
}

#[async_trait::async_trait]
impl AssignmentStore for InMemoryAssignmentStore {
    async fn fetch_assignments(
        &self,
        user_id: &UserId,
        permission_type: Option<&PermissionType>,
        sort_hint: Option<SortDirection>,
    ) -> Result<Vec<FlatAssignmentRecord>, StoreError> {
        let directory = self.read()?;

        let Some(user) = directory.users.get(user_id) else {
            return Ok(vec![]);
        };

        let mut rows = Vec::new();
        for role in user.role_ids.iter().filter_map(|id| directory.roles.get(id)) {
            for permission in role
                .permission_ids
                .iter()
                .filter_map(|id| directory.permissions.get(id))
            {
                if permission_type.is_some_and(|t| &permission.permission_type != t) {
                    continue;
                }
                rows.push(FlatAssignmentRecord::join(user_id, role, permission));
            }
        }

        match sort_hint {
            Some(SortDirection::Asc) => rows.sort_by(|a, b| a.sort.cmp(&b.sort)),
            Some(SortDirection::Desc) => rows.sort_by(|a, b| b.sort.cmp(&a.sort)),
            None => {}
        }

        Ok(rows)
    }

    async fn find_user(&self, user_id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(id: u64, name: &str, sort: &str) -> Permission {
        Permission::new(PermissionId::new(id), name, PermissionType::Menu).with_sort(sort)
    }

    fn store() -> (InMemoryAssignmentStore, UserId) {
        let store = InMemoryAssignmentStore::new();
        let user_id = UserId::new("u-1").unwrap();

        store.put_permission(menu(1, "Dashboard", "2")).unwrap();
        store.put_permission(menu(2, "Reports", "1")).unwrap();
        store
            .put_permission(
                Permission::new(PermissionId::new(3), "default", PermissionType::Api).with_path("auth_0"),
            )
            .unwrap();
        store
            .put_role(
                Role::new(RoleId::new(1), "user", "User")
                    .with_permissions([PermissionId::new(1), PermissionId::new(3)]),
            )
            .unwrap();
        store
            .put_role(
                Role::new(RoleId::new(2), "analyst", "Analyst")
                    .with_permissions([PermissionId::new(1), PermissionId::new(2)]),
            )
            .unwrap();
        store
            .put_user(
                User::new(user_id.clone(), "u1@example.com", "U One")
                    .with_roles([RoleId::new(1), RoleId::new(2)]),
            )
            .unwrap();

        (store, user_id)
    }

    #[tokio::test]
    async fn joins_every_role_without_deduplicating() {
        let (store, user_id) = store();

        let rows = store.fetch_assignments(&user_id, None, None).await.unwrap();

        // Dashboard arrives once per role; collapsing is the aggregator's job.
        assert_eq!(rows.len(), 4);
        assert_eq!(rows.iter().filter(|r| r.permission_id == PermissionId::new(1)).count(), 2);
    }

    #[tokio::test]
    async fn filters_by_type_and_orders_by_hint() {
        let (store, user_id) = store();

        let rows = store
            .fetch_assignments(&user_id, Some(&PermissionType::Menu), Some(SortDirection::Asc))
            .await
            .unwrap();

        assert!(rows.iter().all(|r| r.permission_type == PermissionType::Menu));
        let sorts: Vec<_> = rows.iter().map(|r| r.sort.as_str()).collect();
        assert_eq!(sorts, vec!["1", "2", "2"]);

        let rows = store
            .fetch_assignments(&user_id, Some(&PermissionType::Api), Some(SortDirection::Desc))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].path, "auth_0");
    }

    #[tokio::test]
    async fn unknown_user_yields_no_rows() {
        let (store, _) = store();
        let rows = store
            .fetch_assignments(&UserId::new("nobody").unwrap(), None, None)
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn finds_stored_user_profile() {
        let (store, user_id) = store();

        let user = store.find_user(&user_id).await.unwrap().unwrap();
        assert_eq!(user.email, "u1@example.com");
        assert_eq!(user.display_name, "U One");
        assert_eq!(user.role_ids, vec![RoleId::new(1), RoleId::new(2)]);

        let missing = store.find_user(&UserId::new("nobody").unwrap()).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn dangling_references_are_skipped() {
        let (store, user_id) = store();
        store.remove_permission(PermissionId::new(2)).unwrap();

        let rows = store
            .fetch_assignments(&user_id, Some(&PermissionType::Menu), None)
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.permission_id == PermissionId::new(1)));
    }
}
