//! DTOs for the zone endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use wastewise_domain::zone::{NewZone, Zone, ZoneSummary, ZoneUpdate};

/// Response envelope shared by every endpoint
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    CreatedZoneResponse = ApiResponse<CreatedZone>,
    ZoneResponse = ApiResponse<ZoneDto>,
    ZoneListResponse = ApiResponse<Vec<ZoneDto>>,
    ZoneSummaryListResponse = ApiResponse<Vec<ZoneSummaryDto>>,
    ZoneDeletedResponse = ApiResponse<ZoneDeleted>,
    ExistsResponse = ApiResponse<bool>,
    ErrorResponse = ApiResponse<Vec<String>>
)]
pub struct ApiResponse<T> {
    #[schema(example = "Zone created successfully")]
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

/// Body of create and update requests
///
/// Missing fields deserialize to blank values and are rejected by validation.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ZoneRequest {
    #[schema(example = "North District")]
    pub zone_name: String,
    /// Covered area, at least 1
    #[schema(example = 120)]
    pub area_coverage: i64,
}

impl From<ZoneRequest> for NewZone {
    fn from(request: ZoneRequest) -> Self {
        NewZone::new(request.zone_name, request.area_coverage)
    }
}

impl From<ZoneRequest> for ZoneUpdate {
    fn from(request: ZoneRequest) -> Self {
        ZoneUpdate::new(request.zone_name, request.area_coverage)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDto {
    #[schema(example = "Z001")]
    pub zone_id: String,
    #[schema(example = "North District")]
    pub zone_name: String,
    #[schema(example = 120)]
    pub area_coverage: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Zone> for ZoneDto {
    fn from(zone: &Zone) -> Self {
        Self {
            zone_id: zone.id().to_string(),
            zone_name: zone.name().to_string(),
            area_coverage: zone.area_coverage(),
            created_at: *zone.created_at(),
            updated_at: *zone.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSummaryDto {
    #[schema(example = "Z001")]
    pub zone_id: String,
    #[schema(example = "North District")]
    pub zone_name: String,
}

impl From<ZoneSummary> for ZoneSummaryDto {
    fn from(summary: ZoneSummary) -> Self {
        Self {
            zone_id: summary.zone_id.to_string(),
            zone_name: summary.zone_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedZone {
    #[schema(example = "Z001")]
    pub zone_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDeleted {
    /// False when the route service could not be reached and the delete went
    /// ahead under the fail-open policy
    pub references_verified: bool,
}
