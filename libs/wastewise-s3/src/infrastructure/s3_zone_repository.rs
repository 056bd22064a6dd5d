//! S3 Zone Repository Implementation
//!
//! Zones are stored one JSON document per zone. Exact-name uniqueness is
//! enforced through a claim object per name, created with `If-None-Match: *`,
//! so two instances writing the same name concurrently cannot both succeed.

use std::future::Future;

use aws_sdk_s3::Client;
use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use wastewise_domain::guard::UniquenessGuard;
use wastewise_domain::zone::{Zone, ZoneId, ZoneRepository};
use wastewise_domain::{DomainError, EntityKind};

use super::objects::{encode_segment, Claim, Condition, JsonObjects, NameClaim, Put};

const ZONE_PREFIX: &str = "zones/";
const NAME_PREFIX: &str = "zone-names/";

fn zone_key(zone_id: &ZoneId) -> String {
    format!("{}{}.json", ZONE_PREFIX, zone_id)
}

fn name_key(zone_name: &str) -> String {
    let normalized = UniquenessGuard::ZONES.matching().normalize(zone_name);
    format!("{}{}", NAME_PREFIX, encode_segment(&normalized))
}

/// S3-based implementation of the [`ZoneRepository`] port
#[derive(Clone)]
pub struct S3ZoneRepository {
    objects: JsonObjects,
}

impl S3ZoneRepository {
    /// Create a zone repository over `bucket`
    ///
    /// ```rust,no_run
    /// use wastewise_s3::{build_client, S3ZoneRepository};
    ///
    /// # async fn example() {
    /// let client = build_client().await;
    /// let zones = S3ZoneRepository::new(client, "wastewise".to_string());
    /// # }
    /// ```
    pub fn new(client: Client, bucket: String) -> Self {
        info!(bucket = %bucket, "Initializing S3ZoneRepository");
        Self {
            objects: JsonObjects::new(client, bucket),
        }
    }

    /// Whether `owner` still holds `zone_name`
    async fn holds_name(
        objects: &JsonObjects,
        owner: &str,
        zone_name: &str,
    ) -> Result<bool, DomainError> {
        let Some(zone_id) = ZoneId::parse(owner) else {
            return Ok(false);
        };
        let matching = UniquenessGuard::ZONES.matching();
        Ok(objects
            .get::<Zone>(&zone_key(&zone_id))
            .await?
            .map(|doc| matching.same(doc.value.name(), zone_name))
            .unwrap_or(false))
    }

    async fn claim_name(objects: &JsonObjects, zone: &Zone) -> Result<Claim, DomainError> {
        let name = zone.name().to_string();
        let claim = objects
            .claim(&name_key(&name), &zone.id().to_string(), |holder| async move {
                Self::holds_name(objects, &holder, &name).await
            })
            .await?;

        if let Claim::Held(holder) = &claim {
            warn!(zone_name = %zone.name(), holder = %holder, "Zone name already claimed");
            return Err(UniquenessGuard::ZONES.conflict(None, zone.name()));
        }
        Ok(claim)
    }

    async fn release_name(objects: &JsonObjects, zone: &Zone) {
        if let Err(err) = objects
            .release(&name_key(zone.name()), &zone.id().to_string())
            .await
        {
            // A leftover claim is stale and gets taken over by the next writer
            warn!(zone_id = %zone.id(), error = %err, "Failed to release zone name");
        }
    }

    async fn insert_zone(objects: JsonObjects, mut zone: Zone) -> Result<Zone, DomainError> {
        let claim = Self::claim_name(&objects, &zone).await?;
        zone.stamp_created(Utc::now());

        let written = objects
            .put(&zone_key(zone.id()), &zone, Condition::Absent)
            .await;
        if claim == Claim::Acquired && !matches!(written, Ok(Put::Written)) {
            Self::release_name(&objects, &zone).await;
        }

        match written? {
            Put::Written => {
                info!(zone_id = %zone.id(), "Stored zone in S3");
                Ok(zone)
            }
            Put::Rejected => Err(DomainError::identifier_taken(
                EntityKind::Zone,
                zone.id().to_string(),
            )),
        }
    }

    async fn update_zone(objects: JsonObjects, mut zone: Zone) -> Result<Zone, DomainError> {
        let owner = zone.id().to_string();
        let Some(stored) = objects.get::<Zone>(&zone_key(zone.id())).await? else {
            return Err(DomainError::not_found(EntityKind::Zone, owner));
        };

        let renamed = !UniquenessGuard::ZONES
            .matching()
            .same(stored.value.name(), zone.name());
        let claim = if renamed {
            Some(Self::claim_name(&objects, &zone).await?)
        } else {
            None
        };

        zone.stamp_updated(*stored.value.created_at(), Utc::now());

        match objects
            .put(&zone_key(zone.id()), &zone, stored.unchanged())
            .await?
        {
            Put::Written => {
                if renamed {
                    Self::release_name(&objects, &stored.value).await;
                }
                info!(zone_id = %owner, "Updated zone in S3");
                Ok(zone)
            }
            Put::Rejected => {
                if claim == Some(Claim::Acquired) {
                    Self::release_name(&objects, &zone).await;
                }
                Err(DomainError::storage_failure(format!(
                    "Zone '{}' was modified concurrently",
                    owner
                )))
            }
        }
    }
}

impl ZoneRepository for S3ZoneRepository {
    #[instrument(skip(self, zone), fields(zone_id = %zone.id()))]
    fn insert(&self, zone: Zone) -> impl Future<Output = Result<Zone, DomainError>> + Send {
        let objects = self.objects.clone();
        async move { Self::insert_zone(objects, zone).await }
    }

    #[instrument(skip(self, zone), fields(zone_id = %zone.id()))]
    fn update(&self, zone: Zone) -> impl Future<Output = Result<Zone, DomainError>> + Send {
        let objects = self.objects.clone();
        async move { Self::update_zone(objects, zone).await }
    }

    #[instrument(skip(self), fields(zone_id = %zone_id))]
    fn find_by_id(
        &self,
        zone_id: &ZoneId,
    ) -> impl Future<Output = Result<Option<Zone>, DomainError>> + Send {
        let objects = self.objects.clone();
        let key = zone_key(zone_id);

        async move { Ok(objects.get::<Zone>(&key).await?.map(|doc| doc.value)) }
    }

    #[instrument(skip(self))]
    fn find_by_name(
        &self,
        zone_name: &str,
    ) -> impl Future<Output = Result<Option<Zone>, DomainError>> + Send {
        let objects = self.objects.clone();
        let zone_name = zone_name.to_string();

        async move {
            let Some(claim) = objects
                .get::<NameClaim>(&name_key(&zone_name))
                .await?
            else {
                return Ok(None);
            };
            let Some(zone_id) = ZoneId::parse(&claim.value.owner) else {
                return Ok(None);
            };

            let matching = UniquenessGuard::ZONES.matching();
            Ok(objects
                .get::<Zone>(&zone_key(&zone_id))
                .await?
                .map(|doc| doc.value)
                .filter(|zone| matching.same(zone.name(), &zone_name)))
        }
    }

    #[instrument(skip(self), fields(zone_id = %zone_id))]
    fn exists(&self, zone_id: &ZoneId) -> impl Future<Output = Result<bool, DomainError>> + Send {
        let objects = self.objects.clone();
        let key = zone_key(zone_id);

        async move { objects.exists(&key).await }
    }

    #[instrument(skip(self), fields(zone_id = %zone_id))]
    fn delete(&self, zone_id: &ZoneId) -> impl Future<Output = Result<(), DomainError>> + Send {
        let objects = self.objects.clone();
        let zone_id = *zone_id;

        async move {
            let Some(stored) = objects.get::<Zone>(&zone_key(&zone_id)).await? else {
                debug!("Zone already absent");
                return Ok(());
            };

            objects.delete(&zone_key(&zone_id)).await?;
            Self::release_name(&objects, &stored.value).await;
            info!("Deleted zone from S3");
            Ok(())
        }
    }

    #[instrument(skip(self))]
    fn list(&self) -> impl Future<Output = Result<Vec<Zone>, DomainError>> + Send {
        let objects = self.objects.clone();

        async move {
            let mut zones = objects.load_all::<Zone>(ZONE_PREFIX).await?;
            zones.sort_by_key(|zone| *zone.id());
            debug!(count = zones.len(), "Listed zones");
            Ok(zones)
        }
    }
}
