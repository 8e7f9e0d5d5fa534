//! Probe endpoint for API-permission checks.

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};

use crate::context::PrincipalContext;

/// GET /v1/:api/api-auth-test - succeeds only when the caller holds `:api`
/// (enforced by the RBAC middleware before this runs).
pub async fn api_auth_test(
    Path(api): Path<String>,
    Extension(principal): Extension<PrincipalContext>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "api auth test passed",
        "api": api,
        "userId": principal.user_id().to_string(),
    }))
}
