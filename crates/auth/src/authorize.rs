//! Point-query authorization: may this user call this API path?

use std::sync::Arc;

use rolegate_core::UserId;

use crate::{AssignmentStore, PermissionAggregator, PermissionType, StoreError};

/// Answers API-path authorization questions from the record store.
///
/// - One store query per check (no caching)
/// - Exact path equality, no prefix or wildcard semantics
/// - A store failure is returned as-is and must not be read as a denial
pub struct AuthorizationChecker<S: ?Sized> {
    store: Arc<S>,
    aggregator: PermissionAggregator,
}

impl<S> AuthorizationChecker<S>
where
    S: AssignmentStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            aggregator: PermissionAggregator::new(),
        }
    }

    pub fn with_aggregator(mut self, aggregator: PermissionAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// `Ok(true)` iff one of the user's `api` permissions has exactly `path`.
    ///
    /// A user with no rows gets `Ok(false)`. Aggregation runs inline; past the
    /// fan-out threshold it briefly joins at most
    /// [`MAX_FAN_OUT_WORKERS`](crate::MAX_FAN_OUT_WORKERS) scoped threads.
    pub async fn is_authorized(&self, user_id: &UserId, path: &str) -> Result<bool, StoreError> {
        let records = self
            .store
            .fetch_assignments(user_id, Some(&PermissionType::Api), None)
            .await?;

        let granted = self.aggregator.aggregate(&records, &PermissionType::Api);
        Ok(granted.contains_path(path))
    }
}

impl<S: ?Sized> Clone for AuthorizationChecker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            aggregator: self.aggregator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::StaticStore;
    use crate::{FlatAssignmentRecord, Permission, Role};
    use rolegate_core::{PermissionId, RoleId};

    fn alice() -> UserId {
        UserId::new("alice").unwrap()
    }

    fn grant(user: &UserId, role: u64, permission: &Permission) -> FlatAssignmentRecord {
        FlatAssignmentRecord::join(user, &Role::new(RoleId::new(role), format!("r{role}"), "R"), permission)
    }

    fn api(id: u64, path: &str) -> Permission {
        Permission::new(PermissionId::new(id), path, PermissionType::Api).with_path(path)
    }

    #[tokio::test]
    async fn exact_path_is_authorized() {
        let store = Arc::new(StaticStore::with_records(vec![grant(&alice(), 1, &api(3, "auth_3"))]));
        let checker = AuthorizationChecker::new(store);

        assert!(checker.is_authorized(&alice(), "auth_3").await.unwrap());
    }

    #[tokio::test]
    async fn prefix_or_substring_is_not_authorized() {
        let store = Arc::new(StaticStore::with_records(vec![grant(&alice(), 1, &api(30, "auth_30"))]));
        let checker = AuthorizationChecker::new(store);

        assert!(!checker.is_authorized(&alice(), "auth_3").await.unwrap());
        assert!(!checker.is_authorized(&alice(), "auth_").await.unwrap());
        assert!(!checker.is_authorized(&alice(), "auth_300").await.unwrap());
    }

    #[tokio::test]
    async fn menu_permission_with_same_path_does_not_authorize() {
        let menu = Permission::new(PermissionId::new(4), "m", PermissionType::Menu).with_path("auth_4");
        let store = Arc::new(StaticStore::with_records(vec![grant(&alice(), 1, &menu)]));
        let checker = AuthorizationChecker::new(store);

        assert!(!checker.is_authorized(&alice(), "auth_4").await.unwrap());
    }

    #[tokio::test]
    async fn user_without_rows_is_denied_not_errored() {
        let store = Arc::new(StaticStore::with_records(Vec::new()));
        let checker = AuthorizationChecker::new(store);

        assert_eq!(checker.is_authorized(&alice(), "auth_0").await, Ok(false));
    }

    #[tokio::test]
    async fn store_failure_propagates_unchanged() {
        let err = StoreError::Unavailable("pool closed".into());
        let store = Arc::new(StaticStore::failing(err.clone()));
        let checker = AuthorizationChecker::new(store.clone());

        assert_eq!(checker.is_authorized(&alice(), "auth_0").await, Err(err));
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn fan_out_path_agrees_with_sequential() {
        let user = alice();
        let records: Vec<_> = (0..8).map(|r| grant(&user, r, &api(r, &format!("auth_{r}")))).collect();
        let store = Arc::new(StaticStore::with_records(records));
        let checker = AuthorizationChecker::new(store)
            .with_aggregator(PermissionAggregator::new().with_fan_out_threshold(1));

        assert!(checker.is_authorized(&user, "auth_7").await.unwrap());
        assert!(!checker.is_authorized(&user, "auth_8").await.unwrap());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn many_roles_on_a_single_threaded_runtime() {
        let user = alice();
        let records: Vec<_> = (0..200).map(|r| grant(&user, r, &api(r, &format!("auth_{r}")))).collect();
        let store = Arc::new(StaticStore::with_records(records));
        let checker = AuthorizationChecker::new(store.clone())
            .with_aggregator(PermissionAggregator::new().with_fan_out_threshold(4));

        let (first, last) = tokio::join!(
            checker.is_authorized(&user, "auth_0"),
            checker.is_authorized(&user, "auth_199"),
        );

        assert_eq!(first, Ok(true));
        assert_eq!(last, Ok(true));
        assert_eq!(checker.is_authorized(&user, "auth_200").await, Ok(false));
        assert_eq!(store.calls(), 3);
    }
}
