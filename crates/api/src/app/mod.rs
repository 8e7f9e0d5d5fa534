//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the shared access service
//! - `routes/`: HTTP routes + handlers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;
use crate::token::TokenVerifier;

pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>, tokens: Arc<dyn TokenVerifier>) -> Router {
    let auth_state = middleware::AuthState { tokens };

    // Protected routes: require a valid bearer token.
    let protected = routes::router(Arc::clone(&services)).route_layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            ))
            .layer(Extension(services)),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
