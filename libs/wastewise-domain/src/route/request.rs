//! Route create and update requests

use crate::change::{ChangeDetector, ChangeSet, Field};
use crate::error::{DomainError, EntityKind};
use crate::guard::UniquenessGuard;

use super::entity::Route;

/// Request to create a route inside a zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoute {
    pub zone_id: String,
    pub route_name: String,
    pub pickup_points: String,
    pub estimated_time: i64,
}

impl NewRoute {
    pub fn new(
        zone_id: impl Into<String>,
        route_name: impl Into<String>,
        pickup_points: impl Into<String>,
        estimated_time: i64,
    ) -> Self {
        Self {
            zone_id: zone_id.into(),
            route_name: route_name.into(),
            pickup_points: pickup_points.into(),
            estimated_time,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.zone_id.trim().is_empty() {
            return Err(DomainError::invalid(
                EntityKind::Route,
                "zone id must not be empty",
            ));
        }
        validate_fields(&self.route_name, &self.pickup_points, self.estimated_time)
    }

    /// Estimated time as stored; only meaningful once validated
    pub fn estimated_time(&self) -> u32 {
        u32::try_from(self.estimated_time).unwrap_or_default()
    }
}

/// Request to replace a route's mutable fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteUpdate {
    pub route_name: String,
    pub pickup_points: String,
    pub estimated_time: i64,
}

impl RouteUpdate {
    pub fn new(
        route_name: impl Into<String>,
        pickup_points: impl Into<String>,
        estimated_time: i64,
    ) -> Self {
        Self {
            route_name: route_name.into(),
            pickup_points: pickup_points.into(),
            estimated_time,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_fields(&self.route_name, &self.pickup_points, self.estimated_time)
    }

    /// Estimated time as stored; only meaningful once validated
    pub fn estimated_time(&self) -> u32 {
        u32::try_from(self.estimated_time).unwrap_or_default()
    }
}

impl ChangeDetector<Route> for RouteUpdate {
    fn diff(&self, existing: &Route) -> ChangeSet {
        let names = UniquenessGuard::ROUTES.matching();
        ChangeSet::new()
            .track(Field::Name, !names.same(existing.name(), &self.route_name))
            .track(
                Field::PickupPoints,
                existing.pickup_points() != self.pickup_points,
            )
            .track(
                Field::EstimatedTime,
                existing.estimated_time() != self.estimated_time(),
            )
    }
}

fn validate_fields(
    route_name: &str,
    pickup_points: &str,
    estimated_time: i64,
) -> Result<(), DomainError> {
    if route_name.trim().is_empty() {
        return Err(DomainError::invalid(
            EntityKind::Route,
            "route name must not be empty",
        ));
    }
    if pickup_points.trim().is_empty() {
        return Err(DomainError::invalid(
            EntityKind::Route,
            "pickup points must not be empty",
        ));
    }
    if u32::try_from(estimated_time).is_err() {
        return Err(DomainError::invalid(
            EntityKind::Route,
            format!(
                "estimated time must be a non-negative number of minutes, got {}",
                estimated_time
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteId;
    use crate::zone::ZoneId;

    fn existing() -> Route {
        Route::new(
            RouteId::new(ZoneId::from_sequence(1), 1),
            "RouteA".to_string(),
            "P1,P2".to_string(),
            30,
        )
    }

    #[test]
    fn test_identical_update_has_no_changes() {
        assert!(!RouteUpdate::new("RouteA", "P1,P2", 30)
            .diff(&existing())
            .is_changed());
    }

    #[test]
    fn test_route_name_comparison_ignores_case() {
        assert!(!RouteUpdate::new("ROUTEA", "P1,P2", 30)
            .diff(&existing())
            .is_changed());
    }

    #[test]
    fn test_each_field_detected() {
        let changes = RouteUpdate::new("RouteB", "P2,P1", 31).diff(&existing());
        assert!(changes.contains(Field::Name));
        assert!(changes.contains(Field::PickupPoints));
        assert!(changes.contains(Field::EstimatedTime));
    }

    #[test]
    fn test_validation() {
        assert!(NewRoute::new("Z001", "RouteA", "P1", 0).validate().is_ok());
        assert!(NewRoute::new("", "RouteA", "P1", 0).validate().is_err());
        assert!(NewRoute::new("Z001", " ", "P1", 0).validate().is_err());
        assert!(NewRoute::new("Z001", "RouteA", "", 0).validate().is_err());
        assert!(matches!(
            RouteUpdate::new("RouteA", "P1", -1).validate(),
            Err(DomainError::InvalidDetails { .. })
        ));
    }
}
