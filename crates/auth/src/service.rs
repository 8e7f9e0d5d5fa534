//! Inbound interface used by the HTTP layer.

use std::sync::Arc;

use rolegate_core::UserId;

use crate::menu::{MenuNode, MenuTreeBuilder, SortDirection, TreeReport};
use crate::{AssignmentStore, AuthorizationChecker, PermissionAggregator, PermissionType, StoreError, User};

/// Access decisions and navigation trees for authenticated callers.
///
/// Stateless apart from the shared store handle: every call re-resolves the
/// user's permissions, and every returned tree belongs to that call alone.
pub struct AccessService<S: ?Sized> {
    store: Arc<S>,
    checker: AuthorizationChecker<S>,
}

impl<S> AccessService<S>
where
    S: AssignmentStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            checker: AuthorizationChecker::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn with_aggregator(mut self, aggregator: PermissionAggregator) -> Self {
        self.checker = self.checker.with_aggregator(aggregator);
        self
    }

    /// May `user_id` call `path`?
    pub async fn check_access(&self, user_id: &UserId, path: &str) -> Result<bool, StoreError> {
        self.checker.is_authorized(user_id, path).await
    }

    /// The caller's profile, `Ok(None)` when the store does not know them.
    pub async fn profile(&self, user_id: &UserId) -> Result<Option<User>, StoreError> {
        self.store.find_user(user_id).await
    }

    /// The user's menu tree. No permissions yields a childless root.
    pub async fn get_menu(
        &self,
        user_id: &UserId,
        direction: SortDirection,
    ) -> Result<MenuNode, StoreError> {
        Ok(self.get_menu_with_report(user_id, direction).await?.0)
    }

    /// As [`AccessService::get_menu`], plus the structural repairs applied.
    pub async fn get_menu_with_report(
        &self,
        user_id: &UserId,
        direction: SortDirection,
    ) -> Result<(MenuNode, TreeReport), StoreError> {
        let records = self
            .store
            .fetch_assignments(user_id, Some(&PermissionType::Menu), Some(direction))
            .await?;

        Ok(MenuTreeBuilder::build_with_report(&records, direction))
    }
}

impl<S: ?Sized> Clone for AccessService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            checker: self.checker.clone(),
        }
    }
}
