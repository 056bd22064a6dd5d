use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use super::poisoned;
use crate::error::{DomainError, EntityKind};
use crate::guard::UniquenessGuard;
use crate::zone::{Zone, ZoneId, ZoneRepository};

/// Zone repository backed by a shared map
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryZoneRepository {
    zones: Arc<RwLock<BTreeMap<ZoneId, Zone>>>,
}

impl InMemoryZoneRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn name_holder<'a>(
        zones: &'a BTreeMap<ZoneId, Zone>,
        name: &str,
    ) -> Option<&'a Zone> {
        let names = UniquenessGuard::ZONES.matching();
        zones.values().find(|zone| names.same(zone.name(), name))
    }

    fn write(&self, mut zone: Zone, is_insert: bool) -> Result<Zone, DomainError> {
        let mut zones = self.zones.write().map_err(poisoned)?;
        let now = Utc::now();

        let created_at = match (zones.get(zone.id()), is_insert) {
            (Some(_), true) => {
                return Err(DomainError::identifier_taken(
                    EntityKind::Zone,
                    zone.id().to_string(),
                ))
            }
            (None, false) => {
                return Err(DomainError::not_found(EntityKind::Zone, zone.id().to_string()))
            }
            (Some(existing), false) => Some(*existing.created_at()),
            (None, true) => None,
        };

        if let Some(holder) = Self::name_holder(&zones, zone.name()) {
            if holder.id() != zone.id() {
                return Err(UniquenessGuard::ZONES.conflict(None, zone.name()));
            }
        }

        match created_at {
            Some(created_at) => zone.stamp_updated(created_at, now),
            None => zone.stamp_created(now),
        }
        zones.insert(*zone.id(), zone.clone());
        Ok(zone)
    }
}

impl ZoneRepository for InMemoryZoneRepository {
    fn insert(&self, zone: Zone) -> impl Future<Output = Result<Zone, DomainError>> + Send {
        std::future::ready(self.write(zone, true))
    }

    fn update(&self, zone: Zone) -> impl Future<Output = Result<Zone, DomainError>> + Send {
        std::future::ready(self.write(zone, false))
    }

    fn find_by_id(
        &self,
        zone_id: &ZoneId,
    ) -> impl Future<Output = Result<Option<Zone>, DomainError>> + Send {
        let result = self
            .zones
            .read()
            .map_err(poisoned)
            .map(|zones| zones.get(zone_id).cloned());
        std::future::ready(result)
    }

    fn find_by_name(
        &self,
        zone_name: &str,
    ) -> impl Future<Output = Result<Option<Zone>, DomainError>> + Send {
        let result = self
            .zones
            .read()
            .map_err(poisoned)
            .map(|zones| Self::name_holder(&zones, zone_name).cloned());
        std::future::ready(result)
    }

    fn exists(&self, zone_id: &ZoneId) -> impl Future<Output = Result<bool, DomainError>> + Send {
        let result = self
            .zones
            .read()
            .map_err(poisoned)
            .map(|zones| zones.contains_key(zone_id));
        std::future::ready(result)
    }

    fn delete(&self, zone_id: &ZoneId) -> impl Future<Output = Result<(), DomainError>> + Send {
        let result = self.zones.write().map_err(poisoned).map(|mut zones| {
            zones.remove(zone_id);
        });
        std::future::ready(result)
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Zone>, DomainError>> + Send {
        let result = self
            .zones
            .read()
            .map_err(poisoned)
            .map(|zones| zones.values().cloned().collect());
        std::future::ready(result)
    }
}
