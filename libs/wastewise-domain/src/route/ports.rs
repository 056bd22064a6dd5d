//! Ports the route service depends on

use std::future::Future;

use async_trait::async_trait;

use super::entity::Route;
use super::ids::RouteId;
use crate::error::DomainError;
use crate::zone::ZoneId;

/// Port for route persistence
///
/// Implementations are the final authority on uniqueness:
/// - `insert` must fail with `DomainError::IdentifierTaken` when the id is live
/// - `insert` and `update` must fail with `DomainError::DuplicateName` when
///   another route of the same zone holds the name, ignoring case
/// - both set the audit timestamps and return the stored route
pub trait RouteRepository: Send + Sync {
    /// Persist a new route
    fn insert(&self, route: Route) -> impl Future<Output = Result<Route, DomainError>> + Send;

    /// Replace an existing route, keeping its creation time
    fn update(&self, route: Route) -> impl Future<Output = Result<Route, DomainError>> + Send;

    fn find_by_id(
        &self,
        route_id: &RouteId,
    ) -> impl Future<Output = Result<Option<Route>, DomainError>> + Send;

    /// Look a route up by name inside one zone, ignoring case
    fn find_by_name_in_zone(
        &self,
        zone_id: &ZoneId,
        route_name: &str,
    ) -> impl Future<Output = Result<Option<Route>, DomainError>> + Send;

    /// Routes assigned to a zone, ordered by id
    fn find_by_zone(
        &self,
        zone_id: &ZoneId,
    ) -> impl Future<Output = Result<Vec<Route>, DomainError>> + Send;

    fn count_by_zone(
        &self,
        zone_id: &ZoneId,
    ) -> impl Future<Output = Result<usize, DomainError>> + Send;

    /// Remove a route; removing a missing route is not an error
    fn delete(&self, route_id: &RouteId) -> impl Future<Output = Result<(), DomainError>> + Send;

    /// All routes, ordered by id
    fn list(&self) -> impl Future<Output = Result<Vec<Route>, DomainError>> + Send;
}

/// Port for the remote zone service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ZoneDirectory: Send + Sync {
    /// Whether `zone_id` currently exists
    async fn zone_exists(&self, zone_id: &ZoneId) -> Result<bool, DomainError>;
}
