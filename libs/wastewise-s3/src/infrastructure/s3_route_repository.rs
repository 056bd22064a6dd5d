//! S3 Route Repository Implementation
//!
//! Route documents are grouped under a per-zone prefix so the routes of one
//! zone are a single listing. Name claims are scoped the same way and keyed on
//! the lowercased name.

use std::future::Future;

use aws_sdk_s3::Client;
use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use wastewise_domain::guard::UniquenessGuard;
use wastewise_domain::route::{Route, RouteId, RouteRepository};
use wastewise_domain::zone::ZoneId;
use wastewise_domain::{DomainError, EntityKind};

use super::objects::{encode_segment, Claim, Condition, JsonObjects, NameClaim, Put};

const ROUTE_PREFIX: &str = "routes/";
const NAME_PREFIX: &str = "route-names/";

fn zone_prefix(zone_id: &ZoneId) -> String {
    format!("{}{}/", ROUTE_PREFIX, zone_id)
}

fn route_key(route_id: &RouteId) -> String {
    format!("{}{}.json", zone_prefix(route_id.zone()), route_id)
}

fn name_key(zone_id: &ZoneId, route_name: &str) -> String {
    let normalized = UniquenessGuard::ROUTES.matching().normalize(route_name);
    format!("{}{}/{}", NAME_PREFIX, zone_id, encode_segment(&normalized))
}

/// S3-based implementation of the [`RouteRepository`] port
#[derive(Clone)]
pub struct S3RouteRepository {
    objects: JsonObjects,
}

impl S3RouteRepository {
    pub fn new(client: Client, bucket: String) -> Self {
        info!(bucket = %bucket, "Initializing S3RouteRepository");
        Self {
            objects: JsonObjects::new(client, bucket),
        }
    }

    async fn holds_name(
        objects: &JsonObjects,
        owner: &str,
        route_name: &str,
    ) -> Result<bool, DomainError> {
        let Some(route_id) = RouteId::parse(owner) else {
            return Ok(false);
        };
        let matching = UniquenessGuard::ROUTES.matching();
        Ok(objects
            .get::<Route>(&route_key(&route_id))
            .await?
            .map(|doc| matching.same(doc.value.name(), route_name))
            .unwrap_or(false))
    }

    async fn claim_name(objects: &JsonObjects, route: &Route) -> Result<Claim, DomainError> {
        let name = route.name().to_string();
        let claim = objects
            .claim(
                &name_key(route.zone_id(), &name),
                &route.id().to_string(),
                |holder| async move { Self::holds_name(objects, &holder, &name).await },
            )
            .await?;

        if let Claim::Held(holder) = &claim {
            warn!(route_name = %route.name(), holder = %holder, "Route name already claimed");
            let scope = route.zone_id().to_string();
            return Err(UniquenessGuard::ROUTES.conflict(Some(&scope), route.name()));
        }
        Ok(claim)
    }

    async fn release_name(objects: &JsonObjects, route: &Route) {
        let key = name_key(route.zone_id(), route.name());
        if let Err(err) = objects.release(&key, &route.id().to_string()).await {
            // A leftover claim is stale and gets taken over by the next writer
            warn!(route_id = %route.id(), error = %err, "Failed to release route name");
        }
    }

    async fn insert_route(objects: JsonObjects, mut route: Route) -> Result<Route, DomainError> {
        let claim = Self::claim_name(&objects, &route).await?;
        route.stamp_created(Utc::now());

        let written = objects
            .put(&route_key(route.id()), &route, Condition::Absent)
            .await;
        if claim == Claim::Acquired && !matches!(written, Ok(Put::Written)) {
            Self::release_name(&objects, &route).await;
        }

        match written? {
            Put::Written => {
                info!(route_id = %route.id(), "Stored route in S3");
                Ok(route)
            }
            Put::Rejected => Err(DomainError::identifier_taken(
                EntityKind::Route,
                route.id().to_string(),
            )),
        }
    }

    async fn update_route(objects: JsonObjects, mut route: Route) -> Result<Route, DomainError> {
        let Some(stored) = objects.get::<Route>(&route_key(route.id())).await? else {
            return Err(DomainError::not_found(
                EntityKind::Route,
                route.id().to_string(),
            ));
        };

        let renamed = !UniquenessGuard::ROUTES
            .matching()
            .same(stored.value.name(), route.name());
        let claim = if renamed {
            Some(Self::claim_name(&objects, &route).await?)
        } else {
            None
        };

        route.stamp_updated(*stored.value.created_at(), Utc::now());

        match objects
            .put(&route_key(route.id()), &route, stored.unchanged())
            .await?
        {
            Put::Written => {
                if renamed {
                    Self::release_name(&objects, &stored.value).await;
                }
                info!(route_id = %route.id(), "Updated route in S3");
                Ok(route)
            }
            Put::Rejected => {
                if claim == Some(Claim::Acquired) {
                    Self::release_name(&objects, &route).await;
                }
                Err(DomainError::storage_failure(format!(
                    "Route '{}' was modified concurrently",
                    route.id()
                )))
            }
        }
    }

    async fn routes_in(objects: &JsonObjects, zone_id: &ZoneId) -> Result<Vec<Route>, DomainError> {
        let mut routes = objects.load_all::<Route>(&zone_prefix(zone_id)).await?;
        routes.sort_by_key(|route| *route.id());
        Ok(routes)
    }
}

impl RouteRepository for S3RouteRepository {
    #[instrument(skip(self, route), fields(route_id = %route.id()))]
    fn insert(&self, route: Route) -> impl Future<Output = Result<Route, DomainError>> + Send {
        let objects = self.objects.clone();
        async move { Self::insert_route(objects, route).await }
    }

    #[instrument(skip(self, route), fields(route_id = %route.id()))]
    fn update(&self, route: Route) -> impl Future<Output = Result<Route, DomainError>> + Send {
        let objects = self.objects.clone();
        async move { Self::update_route(objects, route).await }
    }

    #[instrument(skip(self), fields(route_id = %route_id))]
    fn find_by_id(
        &self,
        route_id: &RouteId,
    ) -> impl Future<Output = Result<Option<Route>, DomainError>> + Send {
        let objects = self.objects.clone();
        let key = route_key(route_id);

        async move { Ok(objects.get::<Route>(&key).await?.map(|doc| doc.value)) }
    }

    #[instrument(skip(self), fields(zone_id = %zone_id))]
    fn find_by_name_in_zone(
        &self,
        zone_id: &ZoneId,
        route_name: &str,
    ) -> impl Future<Output = Result<Option<Route>, DomainError>> + Send {
        let objects = self.objects.clone();
        let key = name_key(zone_id, route_name);
        let route_name = route_name.to_string();

        async move {
            let Some(claim) = objects.get::<NameClaim>(&key).await? else {
                return Ok(None);
            };
            let Some(route_id) = RouteId::parse(&claim.value.owner) else {
                return Ok(None);
            };

            let matching = UniquenessGuard::ROUTES.matching();
            Ok(objects
                .get::<Route>(&route_key(&route_id))
                .await?
                .map(|doc| doc.value)
                .filter(|route| matching.same(route.name(), &route_name)))
        }
    }

    #[instrument(skip(self), fields(zone_id = %zone_id))]
    fn find_by_zone(
        &self,
        zone_id: &ZoneId,
    ) -> impl Future<Output = Result<Vec<Route>, DomainError>> + Send {
        let objects = self.objects.clone();
        let zone_id = *zone_id;

        async move { Self::routes_in(&objects, &zone_id).await }
    }

    #[instrument(skip(self), fields(zone_id = %zone_id))]
    fn count_by_zone(
        &self,
        zone_id: &ZoneId,
    ) -> impl Future<Output = Result<usize, DomainError>> + Send {
        let objects = self.objects.clone();
        let prefix = zone_prefix(zone_id);

        async move { Ok(objects.keys(&prefix).await?.len()) }
    }

    #[instrument(skip(self), fields(route_id = %route_id))]
    fn delete(&self, route_id: &RouteId) -> impl Future<Output = Result<(), DomainError>> + Send {
        let objects = self.objects.clone();
        let key = route_key(route_id);

        async move {
            let Some(stored) = objects.get::<Route>(&key).await? else {
                debug!("Route already absent");
                return Ok(());
            };

            objects.delete(&key).await?;
            Self::release_name(&objects, &stored.value).await;
            info!("Deleted route from S3");
            Ok(())
        }
    }

    #[instrument(skip(self))]
    fn list(&self) -> impl Future<Output = Result<Vec<Route>, DomainError>> + Send {
        let objects = self.objects.clone();

        async move {
            let mut routes = objects.load_all::<Route>(ROUTE_PREFIX).await?;
            routes.sort_by_key(|route| *route.id());
            debug!(count = routes.len(), "Listed routes");
            Ok(routes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::objects::NameClaim;
    use crate::infrastructure::s3_fake::{client_for, missing, on_create, on_replace, stored, BUCKET};
    use wiremock::MockServer;

    #[test]
    fn test_route_keys_are_grouped_by_zone() {
        let route_id = RouteId::new(ZoneId::from_sequence(2), 15);
        assert_eq!(route_key(&route_id), "routes/Z002/Z002-R015.json");
        assert!(route_key(&route_id).starts_with(&zone_prefix(&ZoneId::from_sequence(2))));
    }

    #[test]
    fn test_route_name_keys_ignore_case_within_zone() {
        let zone = ZoneId::from_sequence(1);
        assert_eq!(name_key(&zone, "RouteA"), name_key(&zone, "routea"));
        assert_eq!(name_key(&zone, "ab"), "route-names/Z001/6162");
        assert_ne!(
            name_key(&zone, "RouteA"),
            name_key(&ZoneId::from_sequence(2), "RouteA")
        );
    }

    #[test]
    fn test_zone_prefix_does_not_match_longer_ids() {
        // The trailing slash keeps Z100 from matching Z1000
        let short = zone_prefix(&ZoneId::from_sequence(100));
        let long = route_key(&RouteId::new(ZoneId::from_sequence(1000), 1));
        assert!(!long.starts_with(&short));
    }

    #[tokio::test]
    async fn test_insert_rejects_name_of_writer_in_flight_ignoring_case() {
        let server = MockServer::start().await;
        let zone = ZoneId::from_sequence(1);
        let claim = name_key(&zone, "routea");
        let pending = RouteId::new(zone, 1);
        stored(
            &server,
            &claim,
            serde_json::to_value(NameClaim::new(&pending.to_string(), Utc::now())).unwrap(),
            "\"c1\"",
        )
        .await;
        missing(&server, &route_key(&pending)).await;
        on_create(&server, &claim, 412, 1).await;
        on_replace(&server, &claim, 200, 0).await;
        on_create(&server, &route_key(&RouteId::new(zone, 2)), 200, 0).await;

        let route = Route::new(
            RouteId::new(zone, 2),
            "RouteA".to_string(),
            "P1,P2".to_string(),
            30,
        );
        let result = S3RouteRepository::new(client_for(&server), BUCKET.to_string())
            .insert(route)
            .await;

        match result {
            Err(DomainError::DuplicateName { scope, .. }) => {
                assert_eq!(scope.as_deref(), Some("Z001"))
            }
            other => panic!("expected duplicate name, got {:?}", other),
        }
    }
}
