use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use super::poisoned;
use crate::error::{DomainError, EntityKind};
use crate::guard::UniquenessGuard;
use crate::route::{Route, RouteId, RouteRepository};
use crate::zone::ZoneId;

/// Route repository backed by a shared map
#[derive(Debug, Clone, Default)]
pub struct InMemoryRouteRepository {
    routes: Arc<RwLock<BTreeMap<RouteId, Route>>>,
}

impl InMemoryRouteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn name_holder<'a>(
        routes: &'a BTreeMap<RouteId, Route>,
        zone_id: &ZoneId,
        name: &str,
    ) -> Option<&'a Route> {
        let names = UniquenessGuard::ROUTES.matching();
        routes
            .values()
            .find(|route| route.zone_id() == zone_id && names.same(route.name(), name))
    }

    fn write(&self, mut route: Route, is_insert: bool) -> Result<Route, DomainError> {
        let mut routes = self.routes.write().map_err(poisoned)?;
        let now = Utc::now();

        let created_at = match (routes.get(route.id()), is_insert) {
            (Some(_), true) => {
                return Err(DomainError::identifier_taken(
                    EntityKind::Route,
                    route.id().to_string(),
                ))
            }
            (None, false) => {
                return Err(DomainError::not_found(
                    EntityKind::Route,
                    route.id().to_string(),
                ))
            }
            (Some(existing), false) => Some(*existing.created_at()),
            (None, true) => None,
        };

        if let Some(holder) = Self::name_holder(&routes, route.zone_id(), route.name()) {
            if holder.id() != route.id() {
                let scope = route.zone_id().to_string();
                return Err(UniquenessGuard::ROUTES.conflict(Some(&scope), route.name()));
            }
        }

        match created_at {
            Some(created_at) => route.stamp_updated(created_at, now),
            None => route.stamp_created(now),
        }
        routes.insert(*route.id(), route.clone());
        Ok(route)
    }

    fn in_zone(&self, zone_id: &ZoneId) -> Result<Vec<Route>, DomainError> {
        let routes = self.routes.read().map_err(poisoned)?;
        Ok(routes
            .values()
            .filter(|route| route.zone_id() == zone_id)
            .cloned()
            .collect())
    }
}

impl RouteRepository for InMemoryRouteRepository {
    fn insert(&self, route: Route) -> impl Future<Output = Result<Route, DomainError>> + Send {
        std::future::ready(self.write(route, true))
    }

    fn update(&self, route: Route) -> impl Future<Output = Result<Route, DomainError>> + Send {
        std::future::ready(self.write(route, false))
    }

    fn find_by_id(
        &self,
        route_id: &RouteId,
    ) -> impl Future<Output = Result<Option<Route>, DomainError>> + Send {
        let result = self
            .routes
            .read()
            .map_err(poisoned)
            .map(|routes| routes.get(route_id).cloned());
        std::future::ready(result)
    }

    fn find_by_name_in_zone(
        &self,
        zone_id: &ZoneId,
        route_name: &str,
    ) -> impl Future<Output = Result<Option<Route>, DomainError>> + Send {
        let result = self
            .routes
            .read()
            .map_err(poisoned)
            .map(|routes| Self::name_holder(&routes, zone_id, route_name).cloned());
        std::future::ready(result)
    }

    fn find_by_zone(
        &self,
        zone_id: &ZoneId,
    ) -> impl Future<Output = Result<Vec<Route>, DomainError>> + Send {
        std::future::ready(self.in_zone(zone_id))
    }

    fn count_by_zone(
        &self,
        zone_id: &ZoneId,
    ) -> impl Future<Output = Result<usize, DomainError>> + Send {
        std::future::ready(self.in_zone(zone_id).map(|routes| routes.len()))
    }

    fn delete(&self, route_id: &RouteId) -> impl Future<Output = Result<(), DomainError>> + Send {
        let result = self.routes.write().map_err(poisoned).map(|mut routes| {
            routes.remove(route_id);
        });
        std::future::ready(result)
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Route>, DomainError>> + Send {
        let result = self
            .routes
            .read()
            .map_err(poisoned)
            .map(|routes| routes.values().cloned().collect());
        std::future::ready(result)
    }
}
