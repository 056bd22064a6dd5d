//! Route Service - WasteWise route administration
//!
//! HTTP service owning routes. Every route belongs to a zone owned by the zone
//! service, which is asked to confirm the zone before a route is created.

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
use wastewise_domain::route::RouteService;
use wastewise_s3::IdSequence;

use crate::client::HttpZoneDirectory;
use crate::config::Config;
use crate::storage::RouteStore;

pub type AppRouteService = RouteService<RouteStore, IdSequence, HttpZoneDirectory>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub route_service: Arc<AppRouteService>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let env = Env::process();
    init_tracing(LogFormat::from_env(&env).context("invalid LOG_FORMAT")?)?;

    info!("Starting WasteWise route service");

    let config = Config::from_env(&env).context("invalid configuration")?;

    let (store, sequence) = storage::open(&config.shared).await?;

    let zones = HttpZoneDirectory::new(&config.zone_service_url, config.zone_service_timeout)?;
    info!(
        url = %config.zone_service_url,
        timeout_ms = config.zone_service_timeout.as_millis() as u64,
        "Zone service directory configured"
    );

    let service = RouteService::with_timeout(store, sequence, zones, config.zone_service_timeout);
    let state = AppState {
        route_service: Arc::new(service),
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
