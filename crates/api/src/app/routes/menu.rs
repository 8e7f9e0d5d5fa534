//! Navigation tree for the authenticated user.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use rolegate_auth::SortDirection;

use crate::app::{errors, AppServices};
use crate::context::PrincipalContext;

#[derive(Debug, Default, Deserialize)]
pub struct MenuTreeQuery {
    /// `asc` (default) or `desc`; anything else is treated as `asc`.
    pub sort: Option<String>,
}

/// GET /v1/menu-tree?sort=asc|desc
///
/// A user without menu permissions gets the bare root with a 200.
pub async fn menu_tree(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<MenuTreeQuery>,
) -> Response {
    let direction = SortDirection::parse(query.sort.as_deref().unwrap_or_default());

    match services
        .access
        .get_menu_with_report(principal.user_id(), direction)
        .await
    {
        Ok((root, report)) => {
            if !report.is_clean() {
                tracing::warn!(
                    user_id = %principal.user_id(),
                    orphans = ?report.orphans,
                    misplaced_top_level = ?report.misplaced_top_level,
                    cycle_breaks = ?report.cycle_breaks,
                    depth_breaks = report.depth_breaks.len(),
                    "menu tree needed repair"
                );
            }
            Json(root).into_response()
        }
        Err(e) => {
            tracing::error!(user_id = %principal.user_id(), error = %e, "menu tree query failed");
            errors::store_error_to_response(&e)
        }
    }
}
