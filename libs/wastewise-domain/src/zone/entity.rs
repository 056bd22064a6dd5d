//! Zone entity
//!
//! A Zone is a named administrative area. Its id is allocated once and never
//! changes; the name and area coverage can be updated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::ZoneId;
use super::request::ZoneUpdate;

/// A named administrative area
///
/// Audit timestamps belong to the persistence layer: repositories set
/// `created_at` on insert and `updated_at` on every write.
///
/// # Example
///
/// ```rust
/// use wastewise_domain::zone::{Zone, ZoneId};
///
/// let zone = Zone::new(ZoneId::from_sequence(1), "North".to_string(), 120);
/// assert_eq!(zone.id().to_string(), "Z001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    zone_id: ZoneId,
    zone_name: String,
    area_coverage: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Zone {
    /// Create a zone that has not been persisted yet
    pub fn new(zone_id: ZoneId, zone_name: String, area_coverage: u64) -> Self {
        let now = Utc::now();
        Self {
            zone_id,
            zone_name,
            area_coverage,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a Zone with explicit values (used for reconstruction)
    pub fn from_parts(
        zone_id: ZoneId,
        zone_name: String,
        area_coverage: u64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            zone_id,
            zone_name,
            area_coverage,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &ZoneId {
        &self.zone_id
    }

    pub fn name(&self) -> &str {
        &self.zone_name
    }

    pub fn area_coverage(&self) -> u64 {
        self.area_coverage
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn updated_at(&self) -> &DateTime<Utc> {
        &self.updated_at
    }

    /// Overwrite the mutable fields with a validated update
    pub fn apply(&mut self, update: &ZoneUpdate) {
        self.zone_name = update.zone_name.clone();
        self.area_coverage = update.area_coverage();
    }

    /// Stamp both audit timestamps for a first write
    pub fn stamp_created(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
        self.updated_at = at;
    }

    /// Stamp a later write, keeping the original creation time
    pub fn stamp_updated(&mut self, created_at: DateTime<Utc>, at: DateTime<Utc>) {
        self.created_at = created_at;
        self.updated_at = at;
    }

    /// The `(id, name)` projection
    pub fn summary(&self) -> ZoneSummary {
        ZoneSummary {
            zone_id: self.zone_id,
            zone_name: self.zone_name.clone(),
        }
    }
}

/// Zone id and name only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSummary {
    pub zone_id: ZoneId,
    pub zone_name: String,
}
