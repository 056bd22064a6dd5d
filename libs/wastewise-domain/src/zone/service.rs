//! Zone service - lifecycle orchestration
//!
//! Composes the uniqueness guard, the identifier sequence, the change detector
//! and the referential guard around the zone repository. Every rejected
//! operation returns before the repository is written, so a failure never
//! leaves a partial update behind.

use tracing::{info, instrument, warn};

use super::entity::{Zone, ZoneSummary};
use super::ids::ZoneId;
use super::ports::{RouteDirectory, ZoneRepository};
use super::request::{NewZone, ZoneUpdate};
use crate::change::{ChangeDetector, Field};
use crate::error::{DomainError, EntityKind};
use crate::guard::{ReferenceCheck, ReferentialGuard, UniquenessGuard};
use crate::sequence::{Partition, PartitionedSequence, SequenceStore};

/// Service for managing zones
///
/// Generic over the storage adapter `R`, the identifier sequence `S` and the
/// remote route directory `D`.
pub struct ZoneService<R, S, D> {
    repository: R,
    sequence: S,
    references: ReferentialGuard<D>,
    names: UniquenessGuard,
}

impl<R, S, D> ZoneService<R, S, D>
where
    R: ZoneRepository,
    S: SequenceStore,
    D: RouteDirectory,
{
    pub fn new(repository: R, sequence: S, references: ReferentialGuard<D>) -> Self {
        Self {
            repository,
            sequence,
            references,
            names: UniquenessGuard::ZONES,
        }
    }

    /// Create a zone and allocate its id
    ///
    /// # Errors
    ///
    /// - `DomainError::InvalidDetails` for a blank name or non-positive area
    /// - `DomainError::DuplicateName` if the name is taken
    #[instrument(skip(self, request), fields(zone_name = %request.zone_name))]
    pub async fn create_zone(&self, request: NewZone) -> Result<Zone, DomainError> {
        request.validate()?;

        self.names
            .ensure_available(
                None,
                &request.zone_name,
                self.repository.find_by_name(&request.zone_name),
            )
            .await?;

        let sequence = self.sequence.next_value(&Partition::Zones).await?;
        let zone = Zone::new(
            ZoneId::from_sequence(sequence),
            request.zone_name.clone(),
            request.area_coverage(),
        );

        let created = self.repository.insert(zone).await?;
        info!(zone_id = %created.id(), "Zone created");
        Ok(created)
    }

    /// Replace a zone's name and area coverage
    ///
    /// # Errors
    ///
    /// - `DomainError::NotFound` for an unknown id
    /// - `DomainError::NoChangesDetected` when the payload equals the stored zone
    /// - `DomainError::DuplicateName` when renaming onto a taken name
    #[instrument(skip(self, update))]
    pub async fn update_zone(&self, zone_id: &str, update: ZoneUpdate) -> Result<Zone, DomainError> {
        update.validate()?;

        let mut zone = self.load(zone_id).await?;
        let changes = update.diff(&zone);
        if !changes.is_changed() {
            warn!(zone_id = %zone.id(), "No changes detected during zone update");
            return Err(DomainError::no_changes(EntityKind::Zone, zone.id().to_string()));
        }

        if changes.contains(Field::Name) {
            self.names
                .ensure_available(
                    None,
                    &update.zone_name,
                    self.repository.find_by_name(&update.zone_name),
                )
                .await?;
        }

        zone.apply(&update);
        let updated = self.repository.update(zone).await?;
        info!(zone_id = %updated.id(), changed = %changes, "Zone updated");
        Ok(updated)
    }

    /// Delete a zone unless routes still reference it
    ///
    /// The returned [`ReferenceCheck`] tells whether the route service
    /// confirmed the zone was unreferenced or the fail-open fallback applied.
    ///
    /// # Errors
    ///
    /// - `DomainError::NotFound` for an unknown id
    /// - `DomainError::Blocked` with the ids of the assigned routes
    /// - `DomainError::UpstreamUnavailable` under the fail-closed policy
    #[instrument(skip(self))]
    pub async fn delete_zone(&self, zone_id: &str) -> Result<ReferenceCheck, DomainError> {
        let zone = self.load(zone_id).await?;

        let check = self.references.check_deletable(zone.id()).await?;

        self.repository.delete(zone.id()).await?;
        info!(
            zone_id = %zone.id(),
            verified = check.is_verified(),
            policy = %self.references.policy(),
            "Zone deleted"
        );
        Ok(check)
    }

    pub async fn get_zone(&self, zone_id: &str) -> Result<Zone, DomainError> {
        self.load(zone_id).await
    }

    pub async fn list_zones(&self) -> Result<Vec<Zone>, DomainError> {
        self.repository.list().await
    }

    /// Check if a zone exists; malformed ids simply do not exist
    pub async fn zone_exists(&self, zone_id: &str) -> Result<bool, DomainError> {
        match ZoneId::parse(zone_id) {
            Some(id) => self.repository.exists(&id).await,
            None => Ok(false),
        }
    }

    pub async fn list_zone_names_and_ids(&self) -> Result<Vec<ZoneSummary>, DomainError> {
        let zones = self.repository.list().await?;
        Ok(zones.iter().map(Zone::summary).collect())
    }

    async fn load(&self, zone_id: &str) -> Result<Zone, DomainError> {
        let not_found = || DomainError::not_found(EntityKind::Zone, zone_id);
        let id = ZoneId::parse(zone_id).ok_or_else(not_found)?;
        self.repository.find_by_id(&id).await?.ok_or_else(not_found)
    }
}

/// Rebuild the zone sequence from the zones already in storage
pub async fn seed_sequence<R>(repository: &R) -> Result<PartitionedSequence, DomainError>
where
    R: ZoneRepository,
{
    let zones = repository.list().await?;
    info!(zones = zones.len(), "Rescanning zone identifiers");
    Ok(PartitionedSequence::seeded(
        zones
            .iter()
            .map(|zone| (Partition::Zones, zone.id().sequence())),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::FallbackPolicy;
    use crate::memory::InMemoryZoneRepository;
    use crate::zone::MockRouteDirectory;
    use std::time::Duration;

    type TestService = ZoneService<InMemoryZoneRepository, PartitionedSequence, MockRouteDirectory>;

    fn service_with(directory: MockRouteDirectory) -> TestService {
        ZoneService::new(
            InMemoryZoneRepository::new(),
            PartitionedSequence::new(),
            ReferentialGuard::new(directory, FallbackPolicy::FailOpen, Duration::from_secs(1)),
        )
    }

    fn service() -> TestService {
        service_with(MockRouteDirectory::new())
    }

    fn directory_returning(result: Result<Vec<String>, DomainError>) -> MockRouteDirectory {
        let mut directory = MockRouteDirectory::new();
        directory
            .expect_route_ids_for_zone()
            .times(1)
            .return_once(move |_| result);
        directory
    }

    #[tokio::test]
    async fn test_create_zone_allocates_sequential_ids() {
        let service = service();

        let a = service.create_zone(NewZone::new("ZoneA", 100)).await.unwrap();
        let b = service.create_zone(NewZone::new("ZoneB", 50)).await.unwrap();

        assert_eq!(a.id().to_string(), "Z001");
        assert_eq!(b.id().to_string(), "Z002");
    }

    #[tokio::test]
    async fn test_duplicate_zone_name_rejected() {
        let service = service();
        service.create_zone(NewZone::new("ZoneA", 100)).await.unwrap();
        service.create_zone(NewZone::new("ZoneB", 50)).await.unwrap();

        let err = service.create_zone(NewZone::new("ZoneA", 10)).await.unwrap_err();

        assert_eq!(err, DomainError::duplicate_name(EntityKind::Zone, "ZoneA"));
        assert_eq!(service.list_zones().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_zone_consumes_no_identifier() {
        let service = service();

        let err = service.create_zone(NewZone::new("", 100)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidDetails { .. }));

        let zone = service.create_zone(NewZone::new("ZoneA", 100)).await.unwrap();
        assert_eq!(zone.id().to_string(), "Z001");
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips() {
        let service = service();
        let created = service.create_zone(NewZone::new("ZoneA", 100)).await.unwrap();

        let fetched = service.get_zone("Z001").await.unwrap();
        assert_eq!(fetched.name(), "ZoneA");
        assert_eq!(fetched.area_coverage(), 100);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_unknown_or_malformed_zone() {
        let service = service();

        for id in ["Z404", "not-a-zone"] {
            let err = service.get_zone(id).await.unwrap_err();
            assert_eq!(err, DomainError::not_found(EntityKind::Zone, id));
        }
    }

    #[tokio::test]
    async fn test_identical_update_is_rejected() {
        let service = service();
        service.create_zone(NewZone::new("ZoneA", 100)).await.unwrap();

        for _ in 0..2 {
            let err = service
                .update_zone("Z001", ZoneUpdate::new("ZoneA", 100))
                .await
                .unwrap_err();
            assert_eq!(err, DomainError::no_changes(EntityKind::Zone, "Z001"));
        }
    }

    #[tokio::test]
    async fn test_update_applies_changes() {
        let service = service();
        service.create_zone(NewZone::new("ZoneA", 100)).await.unwrap();

        let updated = service
            .update_zone("Z001", ZoneUpdate::new("zonea", 150))
            .await
            .unwrap();

        assert_eq!(updated.name(), "zonea");
        assert_eq!(updated.area_coverage(), 150);
        assert!(updated.updated_at() >= updated.created_at());
    }

    #[tokio::test]
    async fn test_rename_onto_taken_name_changes_nothing() {
        let service = service();
        service.create_zone(NewZone::new("ZoneA", 100)).await.unwrap();
        service.create_zone(NewZone::new("ZoneB", 50)).await.unwrap();

        let err = service
            .update_zone("Z002", ZoneUpdate::new("ZoneA", 75))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateName { .. }));

        let untouched = service.get_zone("Z002").await.unwrap();
        assert_eq!(untouched.name(), "ZoneB");
        assert_eq!(untouched.area_coverage(), 50);
    }

    #[tokio::test]
    async fn test_delete_blocked_by_assigned_routes() {
        let service = service_with(directory_returning(Ok(vec!["Z001-R001".to_string()])));
        service.create_zone(NewZone::new("ZoneA", 100)).await.unwrap();

        let err = service.delete_zone("Z001").await.unwrap_err();

        assert_eq!(err, DomainError::blocked("Z001", vec!["Z001-R001".to_string()]));
        assert!(service.zone_exists("Z001").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_verified_when_no_routes() {
        let service = service_with(directory_returning(Ok(vec![])));
        service.create_zone(NewZone::new("ZoneA", 100)).await.unwrap();

        let check = service.delete_zone("Z001").await.unwrap();

        assert!(check.is_verified());
        assert!(!service.zone_exists("Z001").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_fails_open_when_route_service_down() {
        let service = service_with(directory_returning(Err(
            DomainError::upstream_unavailable("connection refused"),
        )));
        service.create_zone(NewZone::new("ZoneA", 100)).await.unwrap();

        let check = service.delete_zone("Z001").await.unwrap();

        assert!(!check.is_verified());
        assert!(!service.zone_exists("Z001").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_unknown_zone_skips_remote_check() {
        // No expectation set: any call to the directory would panic.
        let service = service();
        let err = service.delete_zone("Z001").await.unwrap_err();
        assert_eq!(err, DomainError::not_found(EntityKind::Zone, "Z001"));
    }

    #[tokio::test]
    async fn test_deleted_id_is_not_reused_while_running() {
        let service = service_with(directory_returning(Ok(vec![])));
        service.create_zone(NewZone::new("ZoneA", 100)).await.unwrap();
        service.delete_zone("Z001").await.unwrap();

        let next = service.create_zone(NewZone::new("ZoneB", 10)).await.unwrap();
        assert_eq!(next.id().to_string(), "Z002");
    }

    #[tokio::test]
    async fn test_zone_names_and_ids() {
        let service = service();
        service.create_zone(NewZone::new("ZoneA", 100)).await.unwrap();
        service.create_zone(NewZone::new("ZoneB", 50)).await.unwrap();

        let summaries = service.list_zone_names_and_ids().await.unwrap();
        let pairs: Vec<(String, String)> = summaries
            .into_iter()
            .map(|s| (s.zone_id.to_string(), s.zone_name))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("Z001".to_string(), "ZoneA".to_string()),
                ("Z002".to_string(), "ZoneB".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_seed_sequence_resumes_after_existing_zones() {
        let repository = InMemoryZoneRepository::new();
        for n in [1, 2, 5] {
            repository
                .insert(Zone::new(ZoneId::from_sequence(n), format!("Zone{n}"), 10))
                .await
                .unwrap();
        }

        let sequence = seed_sequence(&repository).await.unwrap();
        let service = ZoneService::new(
            repository,
            sequence,
            ReferentialGuard::fail_open(MockRouteDirectory::new()),
        );

        let zone = service.create_zone(NewZone::new("Fresh", 10)).await.unwrap();
        assert_eq!(zone.id().to_string(), "Z006");
    }
}
