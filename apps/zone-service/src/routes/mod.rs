//! API routes

pub mod zones;

use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    dto::{
        CreatedZone, CreatedZoneResponse, ErrorResponse, ExistsResponse, ZoneDeleted,
        ZoneDeletedResponse, ZoneDto, ZoneListResponse, ZoneRequest, ZoneResponse,
        ZoneSummaryDto, ZoneSummaryListResponse,
    },
    handlers, AppState,
};

/// Path prefix of every zone endpoint
pub const ZONES_BASE: &str = "/wastewise/admin/zones";

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::zones::create_zone,
        handlers::zones::update_zone,
        handlers::zones::delete_zone,
        handlers::zones::list_zones,
        handlers::zones::list_zone_names,
        handlers::zones::get_zone,
        handlers::zones::zone_exists,
        health_handler
    ),
    components(
        schemas(
            ZoneRequest, ZoneDto, ZoneSummaryDto, CreatedZone, ZoneDeleted,
            CreatedZoneResponse, ZoneResponse, ZoneListResponse, ZoneSummaryListResponse,
            ZoneDeletedResponse, ExistsResponse, ErrorResponse
        )
    ),
    tags(
        (name = "zones", description = "Zone administration endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "WasteWise Zone Service API",
        version = "0.1.0",
        description = "Administration of collection zones",
        contact(
            name = "WasteWise Team"
        )
    )
)]
pub struct ApiDoc;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest(ZONES_BASE, zones::routes())
        .route("/health", axum::routing::get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    ),
    tag = "health"
)]
async fn health_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wastewise_domain::memory::InMemoryZoneRepository;
    use wastewise_domain::zone::ZoneService;
    use wastewise_domain::{FallbackPolicy, PartitionedSequence, ReferentialGuard};
    use wastewise_s3::IdSequence;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::client::HttpRouteDirectory;
    use crate::storage::ZoneStore;

    /// Nothing listens on the discard port
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn app_with(route_service_url: &str, policy: FallbackPolicy) -> Router {
        let timeout = Duration::from_millis(300);
        let directory = HttpRouteDirectory::new(route_service_url, timeout).unwrap();
        let service = ZoneService::new(
            ZoneStore::Memory(InMemoryZoneRepository::new()),
            IdSequence::Rescan(PartitionedSequence::new()),
            ReferentialGuard::new(directory, policy, timeout),
        );
        create_router(AppState {
            zone_service: Arc::new(service),
        })
    }

    fn app() -> Router {
        app_with(UNREACHABLE, FallbackPolicy::FailOpen)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn create(app: &Router, name: &str, area: i64) -> (StatusCode, Value) {
        send(
            app,
            Method::POST,
            "/wastewise/admin/zones/create",
            Some(json!({ "zoneName": name, "areaCoverage": area })),
        )
        .await
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_and_get_zone() {
        let app = app();

        let (status, body) = create(&app, "North", 120).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["zoneId"], "Z001");
        assert_eq!(body["message"], "Zone created successfully");

        let (status, body) = send(&app, Method::GET, "/wastewise/admin/zones/Z001", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["zoneName"], "North");
        assert_eq!(body["data"]["areaCoverage"], 120);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let app = app();
        create(&app, "North", 120).await;

        let (status, body) = create(&app, "North", 50).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Zone with name 'North' already exists");
    }

    #[tokio::test]
    async fn test_invalid_details_are_bad_request() {
        let app = app();

        let (status, _) = create(&app, "  ", 120).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::POST,
            "/wastewise/admin/zones/create",
            Some(json!({ "zoneName": "North" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Rejected requests consume no identifier
        let (_, body) = create(&app, "North", 10).await;
        assert_eq!(body["data"]["zoneId"], "Z001");
    }

    #[tokio::test]
    async fn test_update_without_changes_is_conflict() {
        let app = app();
        create(&app, "North", 120).await;

        let (status, _) = send(
            &app,
            Method::PUT,
            "/wastewise/admin/zones/update/Z001",
            Some(json!({ "zoneName": "North", "areaCoverage": 120 })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(
            &app,
            Method::PUT,
            "/wastewise/admin/zones/update/Z001",
            Some(json!({ "zoneName": "North", "areaCoverage": 130 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["areaCoverage"], 130);
    }

    #[tokio::test]
    async fn test_unknown_zone_is_not_found() {
        let (status, body) = send(&app(), Method::GET, "/wastewise/admin/zones/Z404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Zone with ID 'Z404' not found");
    }

    #[tokio::test]
    async fn test_list_names_and_exists() {
        let app = app();
        create(&app, "North", 1).await;
        create(&app, "South", 2).await;

        let (_, body) = send(&app, Method::GET, "/wastewise/admin/zones/names", None).await;
        assert_eq!(
            body["data"],
            json!([
                { "zoneId": "Z001", "zoneName": "North" },
                { "zoneId": "Z002", "zoneName": "South" }
            ])
        );

        let (_, body) = send(&app, Method::GET, "/wastewise/admin/zones/list", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (_, body) = send(&app, Method::GET, "/wastewise/admin/zones/Z002/exists", None).await;
        assert_eq!(body["data"], true);
        let (_, body) = send(&app, Method::GET, "/wastewise/admin/zones/Z009/exists", None).await;
        assert_eq!(body["data"], false);
    }

    #[tokio::test]
    async fn test_delete_blocked_by_routes_lists_them() {
        let routes = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wastewise/admin/routes/zone/Z001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "ok",
                "data": ["Z001-R001"]
            })))
            .mount(&routes)
            .await;

        let app = app_with(&routes.uri(), FallbackPolicy::FailOpen);
        create(&app, "North", 120).await;

        let (status, body) = send(&app, Method::DELETE, "/wastewise/admin/zones/delete/Z001", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["data"], json!(["Z001-R001"]));
        assert_eq!(
            body["message"],
            "Cannot delete zone Z001 because it has assigned routes: Z001-R001"
        );
    }

    #[tokio::test]
    async fn test_delete_verified_when_no_routes() {
        let routes = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "message": "ok", "data": [] })),
            )
            .mount(&routes)
            .await;

        let app = app_with(&routes.uri(), FallbackPolicy::FailOpen);
        create(&app, "North", 120).await;

        let (status, body) = send(&app, Method::DELETE, "/wastewise/admin/zones/delete/Z001", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["referencesVerified"], true);
    }

    #[tokio::test]
    async fn test_delete_fails_open_when_route_service_is_down() {
        let app = app();
        create(&app, "North", 120).await;

        let (status, body) = send(&app, Method::DELETE, "/wastewise/admin/zones/delete/Z001", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["referencesVerified"], false);

        let (status, _) = send(&app, Method::GET, "/wastewise/admin/zones/Z001", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_fails_closed_when_configured() {
        let app = app_with(UNREACHABLE, FallbackPolicy::FailClosed);
        create(&app, "North", 120).await;

        let (status, _) = send(&app, Method::DELETE, "/wastewise/admin/zones/delete/Z001", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = send(&app, Method::GET, "/wastewise/admin/zones/Z001", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn test_openapi_lists_zone_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/wastewise/admin/zones/create"));
        assert!(doc.paths.paths.contains_key("/wastewise/admin/zones/{zone_id}/exists"));
    }
}
