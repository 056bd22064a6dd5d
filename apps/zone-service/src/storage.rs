//! Storage selection
//!
//! The backend is picked once at startup from configuration; the service is
//! then monomorphized over [`ZoneStore`] and [`IdSequence`].

use std::future::Future;

use anyhow::{Context, Result};
use tracing::info;
use wastewise_common::{SequenceMode, SharedConfig, StorageBackend};
use wastewise_domain::memory::InMemoryZoneRepository;
use wastewise_domain::zone::{seed_sequence, Zone, ZoneId, ZoneRepository};
use wastewise_domain::{DomainError, Partition, PartitionedSequence};
use wastewise_s3::{build_client, IdSequence, S3Sequence, S3ZoneRepository};

#[derive(Clone)]
pub enum ZoneStore {
    Memory(InMemoryZoneRepository),
    S3(S3ZoneRepository),
}

macro_rules! dispatch {
    ($store:expr, $repo:ident => $call:expr) => {
        match $store {
            ZoneStore::Memory($repo) => $call.await,
            ZoneStore::S3($repo) => $call.await,
        }
    };
}

impl ZoneRepository for ZoneStore {
    fn insert(&self, zone: Zone) -> impl Future<Output = Result<Zone, DomainError>> + Send {
        async move { dispatch!(self, repo => repo.insert(zone)) }
    }

    fn update(&self, zone: Zone) -> impl Future<Output = Result<Zone, DomainError>> + Send {
        async move { dispatch!(self, repo => repo.update(zone)) }
    }

    fn find_by_id(
        &self,
        zone_id: &ZoneId,
    ) -> impl Future<Output = Result<Option<Zone>, DomainError>> + Send {
        let zone_id = *zone_id;
        async move { dispatch!(self, repo => repo.find_by_id(&zone_id)) }
    }

    fn find_by_name(
        &self,
        zone_name: &str,
    ) -> impl Future<Output = Result<Option<Zone>, DomainError>> + Send {
        let zone_name = zone_name.to_string();
        async move { dispatch!(self, repo => repo.find_by_name(&zone_name)) }
    }

    fn exists(&self, zone_id: &ZoneId) -> impl Future<Output = Result<bool, DomainError>> + Send {
        let zone_id = *zone_id;
        async move { dispatch!(self, repo => repo.exists(&zone_id)) }
    }

    fn delete(&self, zone_id: &ZoneId) -> impl Future<Output = Result<(), DomainError>> + Send {
        let zone_id = *zone_id;
        async move { dispatch!(self, repo => repo.delete(&zone_id)) }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<Zone>, DomainError>> + Send {
        async move { dispatch!(self, repo => repo.list()) }
    }
}

/// Open the configured store and the matching identifier sequence
pub async fn open(config: &SharedConfig) -> Result<(ZoneStore, IdSequence)> {
    if config.storage == StorageBackend::Memory {
        info!("Using in-memory zone storage");
        return Ok((
            ZoneStore::Memory(InMemoryZoneRepository::new()),
            IdSequence::Rescan(PartitionedSequence::new()),
        ));
    }

    info!(bucket = %config.bucket, sequence = ?config.id_sequence, "Using S3 zone storage");
    let client = build_client().await;
    let store = ZoneStore::S3(S3ZoneRepository::new(client.clone(), config.bucket.clone()));

    let sequence = match config.id_sequence {
        SequenceMode::Rescan => IdSequence::Rescan(
            seed_sequence(&store)
                .await
                .context("failed to rescan stored zone identifiers")?,
        ),
        SequenceMode::Durable => {
            let sequence = S3Sequence::new(client, config.bucket.clone());
            let highest = store
                .list()
                .await
                .context("failed to list stored zones")?
                .iter()
                .map(|zone| zone.id().sequence())
                .max();
            if let Some(highest) = highest {
                sequence
                    .raise_floor(&Partition::Zones, highest)
                    .await
                    .context("failed to align the zone sequence")?;
            }
            IdSequence::Durable(sequence)
        }
    };

    Ok((store, sequence))
}
