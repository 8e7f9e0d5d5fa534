use std::sync::Arc;

use axum::{routing::get, Router};

use crate::app::AppServices;
use crate::middleware;

pub mod api_auth;
pub mod menu;
pub mod system;

/// Router for all authenticated endpoints.
///
/// Routes under `/v1/:api` additionally require the `api` permission named
/// by the `auth_<n>` segment.
pub fn router(services: Arc<AppServices>) -> Router {
    let rbac_guarded = Router::new()
        .route("/v1/:api/api-auth-test", get(api_auth::api_auth_test))
        .route_layer(axum::middleware::from_fn_with_state(
            services,
            middleware::rbac_middleware,
        ));

    Router::new()
        .route("/v1/whoami", get(system::whoami))
        .route("/v1/user", get(system::profile))
        .route("/v1/menu-tree", get(menu::menu_tree))
        .merge(rbac_guarded)
}
