use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use rolegate_auth::StoreError;

/// Store failures are indeterminate outcomes: always a 500, never a denial.
pub fn store_error_to_response(err: &StoreError) -> axum::response::Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
