//! Route service configuration

use std::time::Duration;

use anyhow::Result;
use wastewise_common::{Env, SharedConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub shared: SharedConfig,
    pub host: String,
    pub port: u16,
    pub zone_service_url: String,
    pub zone_service_timeout: Duration,
}

impl Config {
    pub fn from_env(env: &Env) -> Result<Self> {
        Ok(Self {
            shared: SharedConfig::from_env(env)?,
            host: env.string("ROUTE_HOST", "0.0.0.0"),
            port: env.parse("ROUTE_PORT", 8082)?,
            zone_service_url: env.string("ZONE_SERVICE_URL", "http://localhost:8081"),
            zone_service_timeout: Duration::from_millis(
                env.parse("ZONE_SERVICE_TIMEOUT_MS", 2000)?,
            ),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_env(&Env::from_map(Default::default())).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8082");
        assert_eq!(config.zone_service_url, "http://localhost:8081");
        assert_eq!(config.zone_service_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_overrides() {
        let env = Env::from_map(
            [
                ("ZONE_SERVICE_URL", "http://zones:9000"),
                ("ZONE_SERVICE_TIMEOUT_MS", "750"),
                ("ROUTE_HOST", "127.0.0.1"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        );
        let config = Config::from_env(&env).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8082");
        assert_eq!(config.zone_service_url, "http://zones:9000");
        assert_eq!(config.zone_service_timeout, Duration::from_millis(750));
    }
}
