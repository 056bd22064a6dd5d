//! Route handlers
//!
//! Every handler answers with the `{ message, data }` envelope; failures go
//! through [`ApiError`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use wastewise_common::ApiError;

use crate::dto::{ApiResponse, CreateRouteRequest, CreatedRoute, RouteDto, UpdateRouteRequest};
use crate::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Create a route in an existing zone
#[utoipa::path(
    post,
    path = "/wastewise/admin/routes/create",
    request_body = CreateRouteRequest,
    responses(
        (status = 201, description = "Route created", body = CreatedRouteResponse),
        (status = 400, description = "Invalid route details", body = ErrorResponse),
        (status = 404, description = "Zone does not exist or could not be confirmed", body = ErrorResponse),
        (status = 409, description = "Route name already taken in the zone", body = ErrorResponse)
    ),
    tag = "routes"
)]
pub async fn create_route(
    State(state): State<AppState>,
    Json(payload): Json<CreateRouteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedRoute>>), ApiError> {
    info!(zone_id = %payload.zone_id, route_name = %payload.route_name, "Received create route request");

    let route = state.route_service.create_route(payload.try_into()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Route created successfully",
            CreatedRoute {
                route_id: route.id().to_string(),
            },
        )),
    ))
}

/// Replace a route's name, pickup points and estimated time
#[utoipa::path(
    put,
    path = "/wastewise/admin/routes/update/{route_id}",
    params(("route_id" = String, Path, description = "Route identifier, e.g. Z001-R001")),
    request_body = UpdateRouteRequest,
    responses(
        (status = 200, description = "Route updated", body = RouteResponse),
        (status = 400, description = "Invalid route details", body = ErrorResponse),
        (status = 404, description = "Route not found", body = ErrorResponse),
        (status = 409, description = "No changes, or name already taken", body = ErrorResponse)
    ),
    tag = "routes"
)]
pub async fn update_route(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
    Json(payload): Json<UpdateRouteRequest>,
) -> ApiResult<RouteDto> {
    let route = state
        .route_service
        .update_route(&route_id, payload.try_into()?)
        .await?;
    Ok(Json(ApiResponse::new(
        "Route updated successfully",
        RouteDto::from(&route),
    )))
}

#[utoipa::path(
    delete,
    path = "/wastewise/admin/routes/delete/{route_id}",
    params(("route_id" = String, Path, description = "Route identifier, e.g. Z001-R001")),
    responses(
        (status = 200, description = "Route deleted", body = MessageResponse),
        (status = 404, description = "Route not found", body = ErrorResponse)
    ),
    tag = "routes"
)]
pub async fn delete_route(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> ApiResult<bool> {
    state.route_service.delete_route(&route_id).await?;
    Ok(Json(ApiResponse::message_only("Route deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/wastewise/admin/routes/list",
    responses((status = 200, description = "All routes", body = RouteListResponse)),
    tag = "routes"
)]
pub async fn list_routes(State(state): State<AppState>) -> ApiResult<Vec<RouteDto>> {
    let routes = state.route_service.list_routes().await?;
    Ok(Json(ApiResponse::new(
        "Routes retrieved successfully",
        routes.iter().map(RouteDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/wastewise/admin/routes/{route_id}",
    params(("route_id" = String, Path, description = "Route identifier, e.g. Z001-R001")),
    responses(
        (status = 200, description = "The route", body = RouteResponse),
        (status = 404, description = "Route not found", body = ErrorResponse)
    ),
    tag = "routes"
)]
pub async fn get_route(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> ApiResult<RouteDto> {
    let route = state.route_service.get_route(&route_id).await?;
    Ok(Json(ApiResponse::new(
        "Route retrieved successfully",
        RouteDto::from(&route),
    )))
}

/// Ids of the routes assigned to a zone
///
/// The zone service calls this before deleting a zone.
#[utoipa::path(
    get,
    path = "/wastewise/admin/routes/zone/{zone_id}",
    params(("zone_id" = String, Path, description = "Zone identifier, e.g. Z001")),
    responses((status = 200, description = "Route ids, possibly empty", body = RouteIdListResponse)),
    tag = "routes"
)]
pub async fn list_route_ids_by_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
) -> ApiResult<Vec<String>> {
    let ids = state.route_service.list_route_ids_by_zone(&zone_id).await?;
    Ok(Json(ApiResponse::new("Routes retrieved successfully", ids)))
}

#[utoipa::path(
    get,
    path = "/wastewise/admin/routes/zone/{zone_id}/count",
    params(("zone_id" = String, Path, description = "Zone identifier, e.g. Z001")),
    responses((status = 200, description = "Number of routes in the zone", body = CountResponse)),
    tag = "routes"
)]
pub async fn count_routes_by_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
) -> ApiResult<usize> {
    let count = state.route_service.count_routes_by_zone(&zone_id).await?;
    Ok(Json(ApiResponse::new("Routes counted successfully", count)))
}
