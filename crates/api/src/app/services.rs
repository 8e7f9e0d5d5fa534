//! Service wiring: picks the assignment store and builds the access service.

use std::sync::Arc;

use rolegate_auth::{AccessService, AssignmentStore, PermissionAggregator};
use rolegate_infra::{PgAssignmentStore, seed};

use crate::config::AppConfig;
use crate::middleware::ApiPathExtractor;

/// Shared, immutable per-process services handed to routes and middleware.
pub struct AppServices {
    pub access: AccessService<dyn AssignmentStore>,
    pub api_paths: ApiPathExtractor,
}

impl AppServices {
    pub fn new(store: Arc<dyn AssignmentStore>, fan_out_threshold: usize) -> Result<Self, regex::Error> {
        let aggregator = PermissionAggregator::new().with_fan_out_threshold(fan_out_threshold);
        Ok(Self {
            access: AccessService::new(store).with_aggregator(aggregator),
            api_paths: ApiPathExtractor::new()?,
        })
    }
}

/// Connect to Postgres when `DATABASE_URL` is set, otherwise serve the demo directory.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn AssignmentStore> = match &config.database_url {
        Some(url) => Arc::new(PgAssignmentStore::connect(url).await?),
        None => {
            tracing::warn!(
                "DATABASE_URL not set; serving the in-memory demo directory (users `{}`, `{}`)",
                seed::DEMO_USER_ID,
                seed::DEMO_ADMIN_ID
            );
            Arc::new(seed::demo_store()?)
        }
    };

    Ok(AppServices::new(store, config.fan_out_threshold)?)
}
