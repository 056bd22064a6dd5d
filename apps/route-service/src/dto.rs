//! DTOs for the route endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use wastewise_domain::route::{NewRoute, Route, RouteUpdate};
use wastewise_domain::{DomainError, EntityKind};

/// Response envelope shared by every endpoint
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    CreatedRouteResponse = ApiResponse<CreatedRoute>,
    RouteResponse = ApiResponse<RouteDto>,
    RouteListResponse = ApiResponse<Vec<RouteDto>>,
    RouteIdListResponse = ApiResponse<Vec<String>>,
    CountResponse = ApiResponse<usize>,
    MessageResponse = ApiResponse<bool>,
    ErrorResponse = ApiResponse<Vec<String>>
)]
pub struct ApiResponse<T> {
    #[schema(example = "Route created successfully")]
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

    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

/// Body of a create request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRouteRequest {
    #[schema(example = "Z001")]
    pub zone_id: String,
    #[schema(example = "Morning Loop")]
    pub route_name: String,
    /// Ordered, comma separated pickup points
    #[schema(example = "P1,P2,P3")]
    pub pickup_points: String,
    /// Minutes, zero or more
    #[schema(example = 45)]
    pub estimated_time: Option<i64>,
}

/// Body of an update request; the zone of a route never changes
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateRouteRequest {
    #[schema(example = "Morning Loop")]
    pub route_name: String,
    #[schema(example = "P1,P2,P3")]
    pub pickup_points: String,
    #[schema(example = 45)]
    pub estimated_time: Option<i64>,
}

fn required_time(estimated_time: Option<i64>) -> Result<i64, DomainError> {
    estimated_time
        .ok_or_else(|| DomainError::invalid(EntityKind::Route, "estimated time is required"))
}

impl TryFrom<CreateRouteRequest> for NewRoute {
    type Error = DomainError;

    fn try_from(request: CreateRouteRequest) -> Result<Self, Self::Error> {
        Ok(NewRoute::new(
            request.zone_id,
            request.route_name,
            request.pickup_points,
            required_time(request.estimated_time)?,
        ))
    }
}

impl TryFrom<UpdateRouteRequest> for RouteUpdate {
    type Error = DomainError;

    fn try_from(request: UpdateRouteRequest) -> Result<Self, Self::Error> {
        Ok(RouteUpdate::new(
            request.route_name,
            request.pickup_points,
            required_time(request.estimated_time)?,
        ))
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteDto {
    #[schema(example = "Z001-R001")]
    pub route_id: String,
    #[schema(example = "Z001")]
    pub zone_id: String,
    #[schema(example = "Morning Loop")]
    pub route_name: String,
    #[schema(example = "P1,P2,P3")]
    pub pickup_points: String,
    #[schema(example = 45)]
    pub estimated_time: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Route> for RouteDto {
    fn from(route: &Route) -> Self {
        Self {
            route_id: route.id().to_string(),
            zone_id: route.zone_id().to_string(),
            route_name: route.name().to_string(),
            pickup_points: route.pickup_points().to_string(),
            estimated_time: route.estimated_time(),
            created_at: *route.created_at(),
            updated_at: *route.updated_at(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRoute {
    #[schema(example = "Z001-R001")]
    pub route_id: String,
}
