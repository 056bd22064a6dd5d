//! Ports (trait definitions) the zone service depends on
//!
//! ## Static Dispatch
//!
//! The repository uses native `impl Future` return types so the service is
//! monomorphized over the concrete storage adapter. The route directory is a
//! remote call that gets swapped and scripted in tests, so it goes through
//! `async_trait` instead.

use std::future::Future;

use async_trait::async_trait;

use super::entity::Zone;
use super::ids::ZoneId;
use crate::error::DomainError;

/// Port for zone persistence
///
/// Implementations are the final authority on uniqueness:
/// - `insert` must fail with `DomainError::IdentifierTaken` when the id is live
/// - `insert` and `update` must fail with `DomainError::DuplicateName` when
///   another zone already holds the exact same name
/// - both set the audit timestamps and return the stored zone
pub trait ZoneRepository: Send + Sync {
    /// Persist a new zone
    fn insert(&self, zone: Zone) -> impl Future<Output = Result<Zone, DomainError>> + Send;

    /// Replace an existing zone, keeping its creation time
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the zone vanished in the meantime
    fn update(&self, zone: Zone) -> impl Future<Output = Result<Zone, DomainError>> + Send;

    /// Look a zone up by id
    fn find_by_id(
        &self,
        zone_id: &ZoneId,
    ) -> impl Future<Output = Result<Option<Zone>, DomainError>> + Send;

    /// Look a zone up by its exact name
    fn find_by_name(
        &self,
        zone_name: &str,
    ) -> impl Future<Output = Result<Option<Zone>, DomainError>> + Send;

    /// Check if a zone exists
    fn exists(&self, zone_id: &ZoneId) -> impl Future<Output = Result<bool, DomainError>> + Send;

    /// Remove a zone; removing a missing zone is not an error
    fn delete(&self, zone_id: &ZoneId) -> impl Future<Output = Result<(), DomainError>> + Send;

    /// All zones, ordered by id
    fn list(&self) -> impl Future<Output = Result<Vec<Zone>, DomainError>> + Send;
}

/// Port for the remote route service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RouteDirectory: Send + Sync {
    /// Ids of the routes currently assigned to `zone_id`
    ///
    /// Any transport failure must be reported as
    /// `DomainError::UpstreamUnavailable`.
    async fn route_ids_for_zone(&self, zone_id: &ZoneId) -> Result<Vec<String>, DomainError>;
}
