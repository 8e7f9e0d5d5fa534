use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use regex::Regex;

use crate::app::errors::{json_error, store_error_to_response};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;
use crate::token::TokenVerifier;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenVerifier>,
}

/// Bearer token → [`PrincipalContext`]; anything else is a 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    let user_id = state.tokens.verify(token).map_err(|e| {
        tracing::debug!(error = %e, path = %req.uri().path(), "token rejected");
        StatusCode::UNAUTHORIZED
    })?;

    req.extensions_mut().insert(PrincipalContext::new(user_id));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}

/// Finds the API permission path (`auth_<digits>`) embedded in a request path.
#[derive(Debug, Clone)]
pub struct ApiPathExtractor {
    pattern: Regex,
}

impl ApiPathExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(r"auth_(\d+)")?,
        })
    }

    /// First `auth_<n>` occurrence in `path`, if any.
    pub fn extract<'a>(&self, path: &'a str) -> Option<&'a str> {
        self.pattern.find(path).map(|m| m.as_str())
    }
}

/// Gate a route on the caller holding the `api` permission named in its path.
///
/// Runs after [`auth_middleware`]. No permission path in the URL or a denial
/// is a 403; a store failure is a 500 and is never treated as a denial.
pub async fn rbac_middleware(
    State(services): State<Arc<AppServices>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    let Some(principal) = req.extensions().get::<PrincipalContext>().cloned() else {
        tracing::error!(%path, "rbac check reached without an authenticated principal");
        return json_error(StatusCode::UNAUTHORIZED, "unauthorized", "missing credentials");
    };

    let Some(api_path) = services.api_paths.extract(&path) else {
        tracing::warn!(user_id = %principal.user_id(), %path, "no api permission path in request");
        return json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "request path does not name an api permission",
        );
    };

    match services.access.check_access(principal.user_id(), api_path).await {
        Ok(true) => next.run(req).await,
        Ok(false) => {
            tracing::warn!(user_id = %principal.user_id(), %path, api_path, "access denied");
            json_error(
                StatusCode::FORBIDDEN,
                "forbidden",
                format!("missing api permission {api_path}"),
            )
        }
        Err(e) => {
            tracing::error!(user_id = %principal.user_id(), %path, error = %e, "access check failed");
            store_error_to_response(&e)
        }
    }
}
