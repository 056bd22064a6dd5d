//! API routes

pub mod admin;

use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    dto::{
        CountResponse, CreateRouteRequest, CreatedRoute, CreatedRouteResponse, ErrorResponse,
        MessageResponse, RouteDto, RouteIdListResponse, RouteListResponse, RouteResponse,
        UpdateRouteRequest,
    },
    handlers, AppState,
};

/// Path prefix of every route endpoint
pub const ROUTES_BASE: &str = "/wastewise/admin/routes";

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::routes::create_route,
        handlers::routes::update_route,
        handlers::routes::delete_route,
        handlers::routes::list_routes,
        handlers::routes::get_route,
        handlers::routes::list_route_ids_by_zone,
        handlers::routes::count_routes_by_zone,
        health_handler
    ),
    components(
        schemas(
            CreateRouteRequest, UpdateRouteRequest, RouteDto, CreatedRoute,
            CreatedRouteResponse, RouteResponse, RouteListResponse, RouteIdListResponse,
            CountResponse, MessageResponse, ErrorResponse
        )
    ),
    tags(
        (name = "routes", description = "Route administration endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "WasteWise Route Service API",
        version = "0.1.0",
        description = "Administration of collection routes within zones",
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
        .nest(ROUTES_BASE, admin::routes())
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
