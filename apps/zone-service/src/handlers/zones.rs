//! Zone handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, warn};
use wastewise_common::ApiError;

use crate::dto::{ApiResponse, CreatedZone, ZoneDeleted, ZoneDto, ZoneRequest, ZoneSummaryDto};
use crate::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Create a zone
#[utoipa::path(
    post,
    path = "/wastewise/admin/zones/create",
    request_body = ZoneRequest,
    responses(
        (status = 201, description = "Zone created", body = CreatedZoneResponse),
        (status = 400, description = "Invalid zone details", body = ErrorResponse),
        (status = 409, description = "Zone name already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "zones"
)]
pub async fn create_zone(
    State(state): State<AppState>,
    Json(payload): Json<ZoneRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedZone>>), ApiError> {
    info!(zone_name = %payload.zone_name, "Received create zone request");

    let zone = state.zone_service.create_zone(payload.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "Zone created successfully",
            CreatedZone {
                zone_id: zone.id().to_string(),
            },
        )),
    ))
}

/// Replace a zone's name and area coverage
#[utoipa::path(
    put,
    path = "/wastewise/admin/zones/update/{zone_id}",
    params(("zone_id" = String, Path, description = "Zone identifier, e.g. Z001")),
    request_body = ZoneRequest,
    responses(
        (status = 200, description = "Zone updated", body = ZoneResponse),
        (status = 400, description = "Invalid zone details", body = ErrorResponse),
        (status = 404, description = "Zone not found", body = ErrorResponse),
        (status = 409, description = "No changes, or name already taken", body = ErrorResponse)
    ),
    tag = "zones"
)]
pub async fn update_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
    Json(payload): Json<ZoneRequest>,
) -> ApiResult<ZoneDto> {
    let zone = state
        .zone_service
        .update_zone(&zone_id, payload.into())
        .await?;
    Ok(Json(ApiResponse::new(
        "Zone updated successfully",
        ZoneDto::from(&zone),
    )))
}

/// Delete a zone that no route references
#[utoipa::path(
    delete,
    path = "/wastewise/admin/zones/delete/{zone_id}",
    params(("zone_id" = String, Path, description = "Zone identifier, e.g. Z001")),
    responses(
        (status = 200, description = "Zone deleted", body = ZoneDeletedResponse),
        (status = 400, description = "Routes still assigned; data lists them", body = ErrorResponse),
        (status = 404, description = "Zone not found", body = ErrorResponse),
        (status = 503, description = "Route service unreachable (fail-closed)", body = ErrorResponse)
    ),
    tag = "zones"
)]
pub async fn delete_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
) -> ApiResult<ZoneDeleted> {
    let check = state.zone_service.delete_zone(&zone_id).await?;
    let verified = check.is_verified();
    if !verified {
        warn!(zone_id = %zone_id, check = ?check, "Zone deleted without route verification");
    }

    Ok(Json(ApiResponse::new(
        "Zone deleted successfully",
        ZoneDeleted {
            references_verified: verified,
        },
    )))
}

/// All zones
#[utoipa::path(
    get,
    path = "/wastewise/admin/zones/list",
    responses((status = 200, description = "All zones", body = ZoneListResponse)),
    tag = "zones"
)]
pub async fn list_zones(State(state): State<AppState>) -> ApiResult<Vec<ZoneDto>> {
    let zones = state.zone_service.list_zones().await?;
    Ok(Json(ApiResponse::new(
        "Zones retrieved successfully",
        zones.iter().map(ZoneDto::from).collect(),
    )))
}

/// Id and name of every zone
#[utoipa::path(
    get,
    path = "/wastewise/admin/zones/names",
    responses((status = 200, description = "Zone ids and names", body = ZoneSummaryListResponse)),
    tag = "zones"
)]
pub async fn list_zone_names(State(state): State<AppState>) -> ApiResult<Vec<ZoneSummaryDto>> {
    let summaries = state.zone_service.list_zone_names_and_ids().await?;
    Ok(Json(ApiResponse::new(
        "Zone names retrieved successfully",
        summaries.into_iter().map(ZoneSummaryDto::from).collect(),
    )))
}

/// One zone by id
#[utoipa::path(
    get,
    path = "/wastewise/admin/zones/{zone_id}",
    params(("zone_id" = String, Path, description = "Zone identifier, e.g. Z001")),
    responses(
        (status = 200, description = "The zone", body = ZoneResponse),
        (status = 404, description = "Zone not found", body = ErrorResponse)
    ),
    tag = "zones"
)]
pub async fn get_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
) -> ApiResult<ZoneDto> {
    let zone = state.zone_service.get_zone(&zone_id).await?;
    Ok(Json(ApiResponse::new(
        "Zone retrieved successfully",
        ZoneDto::from(&zone),
    )))
}

/// Whether a zone exists
#[utoipa::path(
    get,
    path = "/wastewise/admin/zones/{zone_id}/exists",
    params(("zone_id" = String, Path, description = "Zone identifier, e.g. Z001")),
    responses((status = 200, description = "Existence flag", body = ExistsResponse)),
    tag = "zones"
)]
pub async fn zone_exists(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
) -> ApiResult<bool> {
    let exists = state.zone_service.zone_exists(&zone_id).await?;
    Ok(Json(ApiResponse::new("Zone existence checked", exists)))
}
