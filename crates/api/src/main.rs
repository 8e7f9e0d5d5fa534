use std::sync::Arc;

use anyhow::Context;

use rolegate_api::app::{self, services};
use rolegate_api::config::AppConfig;
use rolegate_api::token::Hs256TokenVerifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    rolegate_observability::init(config.log_format);

    if config.uses_dev_jwt_secret() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let services = Arc::new(services::build_services(&config).await?);
    let tokens = Arc::new(Hs256TokenVerifier::new(config.jwt_secret.as_bytes()));
    let app = app::build_app(services, tokens);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
