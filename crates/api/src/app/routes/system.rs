use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::app::{errors, AppServices};
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "userId": principal.user_id().to_string(),
    }))
}

/// GET /v1/user
///
/// The caller's stored profile. A token whose subject the store does not
/// know is a 404.
pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    match services.access.profile(principal.user_id()).await {
        Ok(Some(user)) => Json(serde_json::json!({
            "userId": user.id.to_string(),
            "nickname": user.display_name,
            "email": user.email,
            "roleIds": user.role_ids,
        }))
        .into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "unknown user"),
        Err(e) => {
            tracing::error!(user_id = %principal.user_id(), error = %e, "profile lookup failed");
            errors::store_error_to_response(&e)
        }
    }
}
