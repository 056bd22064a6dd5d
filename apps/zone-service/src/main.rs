//! Zone Service - WasteWise zone administration
//!
//! HTTP service owning the zone lifecycle. Before deleting a zone it asks the
//! route service whether any route still references it.

mod client;
mod config;
mod dto;
mod handlers;
mod routes;
mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use wastewise_common::{init_tracing, Env, LogFormat};
use wastewise_domain::zone::ZoneService;
use wastewise_domain::ReferentialGuard;
use wastewise_s3::IdSequence;

use crate::client::HttpRouteDirectory;
use crate::config::Config;
use crate::storage::ZoneStore;

pub type AppZoneService = ZoneService<ZoneStore, IdSequence, HttpRouteDirectory>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub zone_service: Arc<AppZoneService>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let env = Env::process();
    init_tracing(LogFormat::from_env(&env).context("invalid LOG_FORMAT")?)?;

    info!("Starting WasteWise zone service");

    let config = Config::from_env(&env).context("invalid configuration")?;

    let (store, sequence) = storage::open(&config.shared).await?;

    let directory =
        HttpRouteDirectory::new(&config.route_service_url, config.route_service_timeout)?;
    info!(
        url = %config.route_service_url,
        timeout_ms = config.route_service_timeout.as_millis() as u64,
        fallback = %config.delete_fallback,
        "Route service directory configured"
    );
    let references = ReferentialGuard::new(
        directory,
        config.delete_fallback,
        config.route_service_timeout,
    );

    let state = AppState {
        zone_service: Arc::new(ZoneService::new(store, sequence, references)),
    };

    // Build HTTP router
    let app = routes::create_router(state);

    let addr = config.bind_address();
    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
