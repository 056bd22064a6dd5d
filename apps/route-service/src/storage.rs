//! Storage selection
//!
//! Same shape as the zone service: one enum over the backends, chosen at
//! startup, plus the identifier sequence seeded from what is already stored.

use std::collections::HashMap;
use std::future::Future;

use anyhow::{Context, Result};
use tracing::info;
use wastewise_common::{SequenceMode, SharedConfig, StorageBackend};
use wastewise_domain::memory::InMemoryRouteRepository;
use wastewise_domain::route::{seed_sequence, Route, RouteId, RouteRepository};
use wastewise_domain::zone::ZoneId;
use wastewise_domain::{DomainError, Partition, PartitionedSequence};
use wastewise_s3::{build_client, IdSequence, S3RouteRepository, S3Sequence};

#[derive(Clone)]
pub enum RouteStore {
    Memory(InMemoryRouteRepository),
    S3(S3RouteRepository),
}

macro_rules! dispatch {
    ($store:expr, $repo:ident => $call:expr) => {
        match $store {
            RouteStore::Memory($repo) => $call.await,
            RouteStore::S3($repo) => $call.await,
        }
    };
}

impl RouteRepository for RouteStore {
    fn insert(&self, route: Route) -> impl Future<Output = Result<Route, DomainError>> + Send {
        async move { dispatch!(self, repo => repo.insert(route)) }
    }

    fn update(&self, route: Route) -> impl Future<Output = Result<Route, DomainError>> + Send {
        async move { dispatch!(self, repo => repo.update(route)) }
    }

    fn find_by_id(
        &self,
        route_id: &RouteId,
    ) -> impl Future<Output = Result<Option<Route>, DomainError>> + Send {
        let route_id = *route_id;
        async move { dispatch!(self, repo => repo.find_by_id(&route_id)) }
    }

    fn find_by_name_in_zone(
        &self,
        zone_id: &ZoneId,
        route_name: &str,
    ) -> impl Future<Output = Result<Option<Route>, DomainError>> + Send {
        let zone_id = *zone_id;
        let route_name = route_name.to_string();
        async move { dispatch!(self, repo => repo.find_by_name_in_zone(&zone_id, &route_name)) }
    }

    fn find_by_zone(
        &self,
        zone_id: &ZoneId,
    ) -> impl Future<Output = Result<Vec<Route>, DomainError>> + Send {
        let zone_id = *zone_id;
        async move { dispatch!(self, repo => repo.find_by_zone(&zone_id)) }
    }

    fn count_by_zone(
        &self,
        zone_id: &ZoneId,
    ) -> impl Future<Output = Result<usize, DomainError>> + Send {
        let zone_id = *zone_id;
        async move { dispatch!(self, repo => repo.count_by_zone(&zone_id)) }
    }

    fn delete(&self, route_id: &RouteId) -> impl Future<Output = Result<(), DomainError>> + Send {
        let route_id = *route_id;
        async move { dispatch!(self, repo => repo.delete(&route_id)) }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Route>, DomainError>> + Send {
        async move { dispatch!(self, repo => repo.list()) }
    }
}

/// Open the configured store and the matching identifier sequence
pub async fn open(config: &SharedConfig) -> Result<(RouteStore, IdSequence)> {
    if config.storage == StorageBackend::Memory {
        info!("Using in-memory route storage");
        return Ok((
            RouteStore::Memory(InMemoryRouteRepository::new()),
            IdSequence::Rescan(PartitionedSequence::new()),
        ));
    }

    info!(bucket = %config.bucket, sequence = ?config.id_sequence, "Using S3 route storage");
    let client = build_client().await;
    let store = RouteStore::S3(S3RouteRepository::new(client.clone(), config.bucket.clone()));

    let sequence = match config.id_sequence {
        SequenceMode::Rescan => IdSequence::Rescan(
            seed_sequence(&store)
                .await
                .context("failed to rescan stored route identifiers")?,
        ),
        SequenceMode::Durable => {
            let sequence = S3Sequence::new(client, config.bucket.clone());
            let routes = store.list().await.context("failed to list stored routes")?;

            let mut highest: HashMap<ZoneId, u32> = HashMap::new();
            for route in &routes {
                let entry = highest.entry(*route.zone_id()).or_default();
                *entry = (*entry).max(route.id().sequence());
            }
            for (zone_id, floor) in highest {
                sequence
                    .raise_floor(&Partition::Routes(zone_id), floor)
                    .await
                    .with_context(|| format!("failed to align the route sequence of {}", zone_id))?;
            }
            IdSequence::Durable(sequence)
        }
    };

    Ok((store, sequence))
}
