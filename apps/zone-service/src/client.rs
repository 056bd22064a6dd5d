//! HTTP client for the route service

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use wastewise_domain::zone::{RouteDirectory, ZoneId};
use wastewise_domain::DomainError;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

/// [`RouteDirectory`] backed by the route service's HTTP API
#[derive(Clone)]
pub struct HttpRouteDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRouteDirectory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build route service HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn zone_routes_url(&self, zone_id: &ZoneId) -> String {
        format!("{}/wastewise/admin/routes/zone/{}", self.base_url, zone_id)
    }
}

#[async_trait]
impl RouteDirectory for HttpRouteDirectory {
    #[instrument(skip(self), fields(zone_id = %zone_id))]
    async fn route_ids_for_zone(&self, zone_id: &ZoneId) -> Result<Vec<String>, DomainError> {
        let url = self.zone_routes_url(zone_id);
        debug!(url = %url, "Asking route service for zone routes");

        let response = self.client.get(&url).send().await.map_err(|err| {
            warn!(url = %url, error = %err, "Route service request failed");
            DomainError::upstream_unavailable(format!("route service request failed: {}", err))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Route service returned an error status");
            return Err(DomainError::upstream_unavailable(format!(
                "route service answered {}",
                status
            )));
        }

        let envelope: Envelope<Vec<String>> = response.json().await.map_err(|err| {
            warn!(url = %url, error = %err, "Route service returned an unreadable body");
            DomainError::upstream_unavailable(format!("unreadable route service response: {}", err))
        })?;

        envelope.data.ok_or_else(|| {
            DomainError::upstream_unavailable("route service response carried no data")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn zone() -> ZoneId {
        ZoneId::from_sequence(1)
    }

    async fn directory_for(server: &MockServer) -> HttpRouteDirectory {
        HttpRouteDirectory::new(format!("{}/", server.uri()), Duration::from_millis(500)).unwrap()
    }

    #[tokio::test]
    async fn test_reads_route_ids_from_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wastewise/admin/routes/zone/Z001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Routes retrieved successfully",
                "data": ["Z001-R001", "Z001-R002"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ids = directory_for(&server)
            .await
            .route_ids_for_zone(&zone())
            .await
            .unwrap();

        assert_eq!(ids, vec!["Z001-R001", "Z001-R002"]);
    }

    #[tokio::test]
    async fn test_empty_list_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "message": "ok", "data": [] })),
            )
            .mount(&server)
            .await;

        let ids = directory_for(&server)
            .await
            .route_ids_for_zone(&zone())
            .await
            .unwrap();

        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = directory_for(&server)
            .await
            .route_ids_for_zone(&zone())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_upstream_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = directory_for(&server)
            .await
            .route_ids_for_zone(&zone())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_missing_data_is_upstream_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
            .mount(&server)
            .await;

        let err = directory_for(&server)
            .await
            .route_ids_for_zone(&zone())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "message": "ok", "data": [] }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = directory_for(&server)
            .await
            .route_ids_for_zone(&zone())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::UpstreamUnavailable(_)));
    }
}
