//! Zone service configuration

use std::time::Duration;

use anyhow::Result;
use wastewise_common::{Env, SharedConfig};
use wastewise_domain::FallbackPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub shared: SharedConfig,
    pub host: String,
    pub port: u16,
    pub route_service_url: String,
    pub route_service_timeout: Duration,
    pub delete_fallback: FallbackPolicy,
}

impl Config {
    pub fn from_env(env: &Env) -> Result<Self> {
        Ok(Self {
            shared: SharedConfig::from_env(env)?,
            host: env.string("ZONE_HOST", "0.0.0.0"),
            port: env.parse("ZONE_PORT", 8081)?,
            route_service_url: env.string("ROUTE_SERVICE_URL", "http://localhost:8082"),
            route_service_timeout: Duration::from_millis(
                env.parse("ROUTE_SERVICE_TIMEOUT_MS", 2000)?,
            ),
            delete_fallback: env.parse("ZONE_DELETE_FALLBACK", FallbackPolicy::default())?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
