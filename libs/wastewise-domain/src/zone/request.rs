//! Zone create and update requests

use crate::change::{ChangeDetector, ChangeSet, Field};
use crate::error::{DomainError, EntityKind};
use crate::guard::UniquenessGuard;

use super::entity::Zone;

/// Request to create a zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewZone {
    pub zone_name: String,
    pub area_coverage: i64,
}

impl NewZone {
    pub fn new(zone_name: impl Into<String>, area_coverage: i64) -> Self {
        Self {
            zone_name: zone_name.into(),
            area_coverage,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_fields(&self.zone_name, self.area_coverage)
    }

    /// Area coverage as stored; only meaningful once validated
    pub fn area_coverage(&self) -> u64 {
        u64::try_from(self.area_coverage).unwrap_or_default()
    }
}

/// Request to replace a zone's mutable fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneUpdate {
    pub zone_name: String,
    pub area_coverage: i64,
}

impl ZoneUpdate {
    pub fn new(zone_name: impl Into<String>, area_coverage: i64) -> Self {
        Self {
            zone_name: zone_name.into(),
            area_coverage,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_fields(&self.zone_name, self.area_coverage)
    }

    /// Area coverage as stored; only meaningful once validated
    pub fn area_coverage(&self) -> u64 {
        u64::try_from(self.area_coverage).unwrap_or_default()
    }
}

impl ChangeDetector<Zone> for ZoneUpdate {
    fn diff(&self, existing: &Zone) -> ChangeSet {
        let names = UniquenessGuard::ZONES.matching();
        ChangeSet::new()
            .track(Field::Name, !names.same(existing.name(), &self.zone_name))
            .track(
                Field::AreaCoverage,
                existing.area_coverage() != self.area_coverage(),
            )
    }
}

fn validate_fields(zone_name: &str, area_coverage: i64) -> Result<(), DomainError> {
    if zone_name.trim().is_empty() {
        return Err(DomainError::invalid(
            EntityKind::Zone,
            "zone name must not be empty",
        ));
    }
    if area_coverage < 1 {
        return Err(DomainError::invalid(
            EntityKind::Zone,
            format!("area coverage must be at least 1, got {}", area_coverage),
        ));
    }
    Ok(())
}
