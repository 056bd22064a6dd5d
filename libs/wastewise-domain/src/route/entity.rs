//! Route entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::RouteId;
use super::request::RouteUpdate;
use crate::zone::ZoneId;

/// A named path of pickup points belonging to exactly one zone
///
/// `pickup_points` is kept as the ordered textual list the caller supplied,
/// e.g. `"P1,P2,P3"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    route_id: RouteId,
    zone_id: ZoneId,
    route_name: String,
    pickup_points: String,
    estimated_time: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Route {
    /// Create a route that has not been persisted yet
    pub fn new(
        route_id: RouteId,
        route_name: String,
        pickup_points: String,
        estimated_time: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            route_id,
            zone_id: *route_id.zone(),
            route_name,
            pickup_points,
            estimated_time,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &RouteId {
        &self.route_id
    }

    pub fn zone_id(&self) -> &ZoneId {
        &self.zone_id
    }

    pub fn name(&self) -> &str {
        &self.route_name
    }

    pub fn pickup_points(&self) -> &str {
        &self.pickup_points
    }

    /// Estimated time in minutes
    pub fn estimated_time(&self) -> u32 {
        self.estimated_time
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn updated_at(&self) -> &DateTime<Utc> {
        &self.updated_at
    }

    /// Overwrite the mutable fields with a validated update
    pub fn apply(&mut self, update: &RouteUpdate) {
        self.route_name = update.route_name.clone();
        self.pickup_points = update.pickup_points.clone();
        self.estimated_time = update.estimated_time();
    }

    pub fn stamp_created(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
        self.updated_at = at;
    }

    pub fn stamp_updated(&mut self, created_at: DateTime<Utc>, at: DateTime<Utc>) {
        self.created_at = created_at;
        self.updated_at = at;
    }
}
