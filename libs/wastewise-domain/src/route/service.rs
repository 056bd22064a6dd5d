//! Route service - lifecycle orchestration
//!
//! Routes are partitioned by zone: ids come from one sequence per zone and
//! names only need to be unique inside their zone.

use std::time::Duration;

use tracing::{info, instrument, warn};

use super::entity::Route;
use super::ids::RouteId;
use super::ports::{RouteRepository, ZoneDirectory};
use super::request::{NewRoute, RouteUpdate};
use crate::change::{ChangeDetector, Field};
use crate::error::{DomainError, EntityKind};
use crate::guard::{UniquenessGuard, DEFAULT_LOOKUP_TIMEOUT};
use crate::sequence::{Partition, PartitionedSequence, SequenceStore};
use crate::zone::ZoneId;

/// Service for managing routes
pub struct RouteService<R, S, Z> {
    repository: R,
    sequence: S,
    zones: Z,
    zone_lookup_timeout: Duration,
    names: UniquenessGuard,
}

impl<R, S, Z> RouteService<R, S, Z>
where
    R: RouteRepository,
    S: SequenceStore,
    Z: ZoneDirectory,
{
    pub fn new(repository: R, sequence: S, zones: Z) -> Self {
        Self::with_timeout(repository, sequence, zones, DEFAULT_LOOKUP_TIMEOUT)
    }

    pub fn with_timeout(
        repository: R,
        sequence: S,
        zones: Z,
        zone_lookup_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            sequence,
            zones,
            zone_lookup_timeout,
            names: UniquenessGuard::ROUTES,
        }
    }

    /// Create a route in an existing zone and allocate its id
    ///
    /// # Errors
    ///
    /// - `DomainError::InvalidDetails` for malformed fields
    /// - `DomainError::NotFound` (zone) when the zone service does not confirm
    ///   the zone, including when it cannot be reached
    /// - `DomainError::DuplicateName` if the zone already has a route with this
    ///   name, ignoring case
    #[instrument(skip(self, request), fields(zone_id = %request.zone_id, route_name = %request.route_name))]
    pub async fn create_route(&self, request: NewRoute) -> Result<Route, DomainError> {
        request.validate()?;

        let zone_id = self.confirm_zone(&request.zone_id).await?;
        let scope = zone_id.to_string();

        self.names
            .ensure_available(
                Some(&scope),
                &request.route_name,
                self.repository
                    .find_by_name_in_zone(&zone_id, &request.route_name),
            )
            .await?;

        let sequence = self
            .sequence
            .next_value(&Partition::Routes(zone_id))
            .await?;
        let route = Route::new(
            RouteId::new(zone_id, sequence),
            request.route_name.clone(),
            request.pickup_points.clone(),
            request.estimated_time(),
        );

        let created = self.repository.insert(route).await?;
        info!(route_id = %created.id(), "Route created");
        Ok(created)
    }

    /// Replace a route's name, pickup points and estimated time
    ///
    /// # Errors
    ///
    /// - `DomainError::NotFound` for an unknown id
    /// - `DomainError::NoChangesDetected` when the payload equals the stored
    ///   route (name compared ignoring case)
    /// - `DomainError::DuplicateName` when renaming onto a name taken in the zone
    #[instrument(skip(self, update))]
    pub async fn update_route(
        &self,
        route_id: &str,
        update: RouteUpdate,
    ) -> Result<Route, DomainError> {
        update.validate()?;

        let mut route = self.load(route_id).await?;
        let changes = update.diff(&route);
        if !changes.is_changed() {
            warn!(route_id = %route.id(), "No changes detected during route update");
            return Err(DomainError::no_changes(EntityKind::Route, route.id().to_string()));
        }

        if changes.contains(Field::Name) {
            let zone_id = *route.zone_id();
            self.names
                .ensure_available(
                    Some(&zone_id.to_string()),
                    &update.route_name,
                    self.repository
                        .find_by_name_in_zone(&zone_id, &update.route_name),
                )
                .await?;
        }

        route.apply(&update);
        let updated = self.repository.update(route).await?;
        info!(route_id = %updated.id(), changed = %changes, "Route updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_route(&self, route_id: &str) -> Result<(), DomainError> {
        let route = self.load(route_id).await?;
        self.repository.delete(route.id()).await?;
        info!(route_id = %route.id(), "Route deleted");
        Ok(())
    }

    pub async fn get_route(&self, route_id: &str) -> Result<Route, DomainError> {
        self.load(route_id).await
    }

    pub async fn list_routes(&self) -> Result<Vec<Route>, DomainError> {
        self.repository.list().await
    }

    /// Ids of the routes assigned to a zone; unknown zones have none
    pub async fn list_route_ids_by_zone(&self, zone_id: &str) -> Result<Vec<String>, DomainError> {
        let Some(zone_id) = ZoneId::parse(zone_id) else {
            return Ok(Vec::new());
        };
        let routes = self.repository.find_by_zone(&zone_id).await?;
        Ok(routes.iter().map(|route| route.id().to_string()).collect())
    }

    pub async fn count_routes_by_zone(&self, zone_id: &str) -> Result<usize, DomainError> {
        match ZoneId::parse(zone_id) {
            Some(zone_id) => self.repository.count_by_zone(&zone_id).await,
            None => Ok(0),
        }
    }

    async fn load(&self, route_id: &str) -> Result<Route, DomainError> {
        let not_found = || DomainError::not_found(EntityKind::Route, route_id);
        let id = RouteId::parse(route_id).ok_or_else(not_found)?;
        self.repository.find_by_id(&id).await?.ok_or_else(not_found)
    }

    /// Ask the zone service whether the zone exists; any failure counts as no
    async fn confirm_zone(&self, raw: &str) -> Result<ZoneId, DomainError> {
        let missing = || DomainError::not_found(EntityKind::Zone, raw);
        let zone_id = ZoneId::parse(raw).ok_or_else(missing)?;

        let lookup = tokio::time::timeout(self.zone_lookup_timeout, self.zones.zone_exists(&zone_id));
        let exists = match lookup.await {
            Ok(Ok(exists)) => exists,
            Ok(Err(err)) => {
                warn!(zone_id = %zone_id, error = %err, "Zone existence check failed, treating zone as missing");
                false
            }
            Err(_) => {
                warn!(
                    zone_id = %zone_id,
                    timeout_ms = self.zone_lookup_timeout.as_millis() as u64,
                    "Zone existence check timed out, treating zone as missing"
                );
                false
            }
        };

        if exists {
            Ok(zone_id)
        } else {
            Err(missing())
        }
    }
}

/// Rebuild the per-zone route sequences from the routes already in storage
pub async fn seed_sequence<R>(repository: &R) -> Result<PartitionedSequence, DomainError>
where
    R: RouteRepository,
{
    let routes = repository.list().await?;
    info!(routes = routes.len(), "Rescanning route identifiers");
    Ok(PartitionedSequence::seeded(routes.iter().map(|route| {
        (
            Partition::Routes(*route.zone_id()),
            route.id().sequence(),
        )
    })))
}
