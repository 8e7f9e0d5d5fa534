//! Outbound port to the assignment record store.

use std::sync::Arc;

use thiserror::Error;

use rolegate_core::UserId;

use crate::menu::SortDirection;
use crate::{FlatAssignmentRecord, PermissionType, User};

/// The record store could not produce a complete answer.
///
/// Every variant means "indeterminate": callers must never read a
/// `StoreError` as a denial.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend unreachable (pool closed, connection refused, ...).
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// The query itself failed.
    #[error("record store query failed: {0}")]
    Query(String),

    /// A row came back but could not be decoded.
    #[error("record store returned a malformed row: {0}")]
    Decode(String),
}

/// Query interface yielding a user's profile and flat (role, permission) rows.
///
/// Implementations must be safe for concurrent reads; the core calls
/// `fetch_assignments` once per request and never caches the result.
#[async_trait::async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Every (role, permission) pair reachable from `user_id`.
    ///
    /// - `permission_type`: when set, only rows of that type are returned.
    /// - `sort_hint`: when set, rows are ordered by sort key in that direction.
    ///
    /// A user without permissions (or an unknown user) yields `Ok(vec![])`.
    async fn fetch_assignments(
        &self,
        user_id: &UserId,
        permission_type: Option<&PermissionType>,
        sort_hint: Option<SortDirection>,
    ) -> Result<Vec<FlatAssignmentRecord>, StoreError>;

    /// The user's profile and role ids; `Ok(None)` for an unknown user.
    async fn find_user(&self, user_id: &UserId) -> Result<Option<User>, StoreError>;
}

#[async_trait::async_trait]
impl<S> AssignmentStore for Arc<S>
where
    S: AssignmentStore + ?Sized,
{
    async fn fetch_assignments(
        &self,
        user_id: &UserId,
        permission_type: Option<&PermissionType>,
        sort_hint: Option<SortDirection>,
    ) -> Result<Vec<FlatAssignmentRecord>, StoreError> {
        (**self)
            .fetch_assignments(user_id, permission_type, sort_hint)
            .await
    }

    async fn find_user(&self, user_id: &UserId) -> Result<Option<User>, StoreError> {
        (**self).find_user(user_id).await
    }
}
