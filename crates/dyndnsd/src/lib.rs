// # dyndnsd - dyndns2 update endpoint
//
// Thin HTTP layer over `dyndns-core`:
//
// - Reads configuration from environment variables (see `config`)
// - Builds the record directory and the `UpdateService`
// - Serves `GET /nic/update` behind HTTP Basic authentication
//
// All reconciliation logic lives in `dyndns-core`.

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod state;

pub use auth::Credentials;
pub use config::Config;
pub use errors::ApiError;
pub use state::AppState;

use anyhow::Result;
use axum::{Router, middleware, routing::get};
use dyndns_core::{DnsDirectory, MemoryDirectory, ProviderConfig, UpdateService};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the router; every route requires Basic authentication
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/nic/update", get(handlers::nic_update))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ))
        .with_state(state)
}

/// Build the record directory for the configured provider
pub fn build_directory(
    provider: &ProviderConfig,
    zone_name: &str,
) -> Result<Arc<dyn DnsDirectory>> {
    match provider {
        ProviderConfig::Memory => {
            warn!("Using in-memory record directory; records are lost on restart");
            Ok(Arc::new(MemoryDirectory::new(zone_name)))
        }
        #[cfg(feature = "cloudflare")]
        ProviderConfig::Cloudflare { .. } => {
            info!("Using Cloudflare record directory");
            Ok(Arc::new(
                dyndns_provider_cloudflare::CloudflareDirectory::from_config(provider)?,
            ))
        }
        #[cfg(not(feature = "cloudflare"))]
        ProviderConfig::Cloudflare { .. } => {
            anyhow::bail!("dyndnsd was built without the cloudflare feature")
        }
    }
}

/// Build the application state from a validated configuration
pub fn build_state(config: &Config) -> Result<AppState> {
    let update_config = config.update_config()?;
    let directory = build_directory(&config.provider_config(), &update_config.zone_name)?;
    let service = UpdateService::new(directory, update_config)?;

    info!(
        "Update service ready: provider={}, zone={}",
        service.provider_name(),
        config.zone
    );

    Ok(AppState::new(
        service,
        Credentials::new(&config.username, &config.password),
    ))
}
