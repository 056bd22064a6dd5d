//! HTTP client for the zone service

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use wastewise_domain::route::ZoneDirectory;
use wastewise_domain::zone::ZoneId;
use wastewise_domain::DomainError;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

/// [`ZoneDirectory`] backed by the zone service's HTTP API
#[derive(Clone)]
pub struct HttpZoneDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpZoneDirectory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build zone service HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ZoneDirectory for HttpZoneDirectory {
    #[instrument(skip(self), fields(zone_id = %zone_id))]
    async fn zone_exists(&self, zone_id: &ZoneId) -> Result<bool, DomainError> {
        let url = format!("{}/wastewise/admin/zones/{}/exists", self.base_url, zone_id);
        debug!(url = %url, "Asking zone service whether zone exists");

        let unavailable = |detail: String| {
            warn!(url = %url, detail = %detail, "Zone service lookup failed");
            DomainError::upstream_unavailable(detail)
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| unavailable(format!("zone service request failed: {}", err)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("zone service answered {}", status)));
        }

        let envelope: Envelope<bool> = response
            .json()
            .await
            .map_err(|err| unavailable(format!("unreadable zone service response: {}", err)))?;

        envelope
            .data
            .ok_or_else(|| unavailable("zone service response carried no data".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn exists_on(server: &MockServer, zone: u32) -> Result<bool, DomainError> {
        HttpZoneDirectory::new(server.uri(), Duration::from_millis(500))
            .unwrap()
            .zone_exists(&ZoneId::from_sequence(zone))
            .await
    }

    #[tokio::test]
    async fn test_reads_existence_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wastewise/admin/zones/Z001/exists"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "message": "ok", "data": true })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wastewise/admin/zones/Z002/exists"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "message": "ok", "data": false })),
            )
            .mount(&server)
            .await;

        assert!(exists_on(&server, 1).await.unwrap());
        assert!(!exists_on(&server, 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_error_status_is_upstream_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = exists_on(&server, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_non_boolean_data_is_upstream_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "message": "ok", "data": "yes" })),
            )
            .mount(&server)
            .await;

        let err = exists_on(&server, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_slow_zone_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "message": "ok", "data": true }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = exists_on(&server, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::UpstreamUnavailable(_)));
    }
}
