//! Durable identifier sequences stored in S3
//!
//! Each partition is one small counter object. An allocation reads the counter,
//! writes `value + 1` guarded by the ETag it read, and retries when another
//! writer got there first. Counters survive restarts and are shared by every
//! instance pointed at the same bucket, so a deleted highest id is never handed
//! out again.

use std::future::Future;
use std::time::Duration;

use aws_sdk_s3::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use wastewise_domain::{DomainError, Partition, SequenceStore};

use super::objects::{Condition, JsonObjects, Put};

const SEQUENCE_PREFIX: &str = "sequences/";
const MAX_ATTEMPTS: u32 = 16;
const BACKOFF_STEP: Duration = Duration::from_millis(10);

fn counter_key(partition: &Partition) -> String {
    format!("{}{}.json", SEQUENCE_PREFIX, partition.key())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Counter {
    value: u32,
}

/// S3-backed implementation of the [`SequenceStore`] port
#[derive(Clone)]
pub struct S3Sequence {
    objects: JsonObjects,
}

impl S3Sequence {
    pub fn new(client: Client, bucket: String) -> Self {
        info!(bucket = %bucket, "Initializing S3Sequence");
        Self {
            objects: JsonObjects::new(client, bucket),
        }
    }

    /// Move the counter of `partition` up to at least `floor`
    ///
    /// Used at startup to adopt identifiers written before the counter existed.
    /// A counter already at or above `floor` is left alone.
    #[instrument(skip(self), fields(partition = %partition))]
    pub async fn raise_floor(&self, partition: &Partition, floor: u32) -> Result<(), DomainError> {
        if let Some(value) = self
            .compare_and_swap(partition, |current| (current < floor).then_some(floor))
            .await?
        {
            info!(value, "Raised sequence to existing identifiers");
        }
        Ok(())
    }

    /// Read-modify-write loop on one counter
    ///
    /// `step` maps the current value to the new one, or `None` to leave the
    /// counter untouched. Returns the written value, or `None` when nothing was
    /// written.
    async fn compare_and_swap<F>(
        &self,
        partition: &Partition,
        step: F,
    ) -> Result<Option<u32>, DomainError>
    where
        F: Fn(u32) -> Option<u32>,
    {
        let key = counter_key(partition);

        for attempt in 1..=MAX_ATTEMPTS {
            let stored = self.objects.get::<Counter>(&key).await?;
            let (current, condition) = match &stored {
                Some(doc) => (doc.value.value, doc.unchanged()),
                None => (0, Condition::Absent),
            };

            let Some(next) = step(current) else {
                return Ok(None);
            };

            match self
                .objects
                .put(&key, &Counter { value: next }, condition)
                .await?
            {
                Put::Written => {
                    debug!(key = %key, value = next, attempt, "Advanced sequence");
                    return Ok(Some(next));
                }
                Put::Rejected => {
                    debug!(key = %key, attempt, "Lost sequence race, retrying");
                    tokio::time::sleep(BACKOFF_STEP * attempt).await;
                }
            }
        }

        warn!(key = %key, attempts = MAX_ATTEMPTS, "Sequence contention not resolved");
        Err(DomainError::storage_failure(format!(
            "Could not advance sequence '{}' after {} attempts",
            partition, MAX_ATTEMPTS
        )))
    }
}

impl SequenceStore for S3Sequence {
    #[instrument(skip(self), fields(partition = %partition))]
    fn next_value(
        &self,
        partition: &Partition,
    ) -> impl Future<Output = Result<u32, DomainError>> + Send {
        let sequence = self.clone();
        let partition = *partition;

        async move {
            let written = sequence
                .compare_and_swap(&partition, |current| current.checked_add(1))
                .await?;

            written.ok_or_else(|| {
                DomainError::internal(format!("Identifier sequence '{}' is exhausted", partition))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::s3_fake::{
        client_for, missing, object_path, on_create, on_replace, requests_to, stored, BUCKET,
    };
    use serde_json::json;
    use wastewise_domain::zone::ZoneId;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ZONES_KEY: &str = "sequences/zones.json";

    fn sequence_for(server: &MockServer) -> S3Sequence {
        S3Sequence::new(client_for(server), BUCKET.to_string())
    }

    #[test]
    fn test_counter_keys() {
        assert_eq!(counter_key(&Partition::Zones), "sequences/zones.json");
        assert_eq!(
            counter_key(&Partition::Routes(ZoneId::from_sequence(3))),
            "sequences/routes/Z003.json"
        );
    }

    #[test]
    fn test_counter_wire_format() {
        let counter: Counter = serde_json::from_str(r#"{"value":41}"#).unwrap();
        assert_eq!(counter, Counter { value: 41 });
    }

    #[tokio::test]
    async fn test_first_allocation_creates_counter() {
        let server = MockServer::start().await;
        missing(&server, ZONES_KEY).await;
        on_create(&server, ZONES_KEY, 200, 1).await;

        let value = sequence_for(&server)
            .next_value(&Partition::Zones)
            .await
            .unwrap();

        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn test_lost_race_retries_from_a_fresh_read() {
        let server = MockServer::start().await;
        stored(&server, ZONES_KEY, json!({ "value": 4 }), "\"v4\"").await;
        Mock::given(method("PUT"))
            .and(path(object_path(ZONES_KEY)))
            .and(header_exists("if-match"))
            .respond_with(ResponseTemplate::new(412))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        on_replace(&server, ZONES_KEY, 200, 1).await;

        let value = sequence_for(&server)
            .next_value(&Partition::Zones)
            .await
            .unwrap();

        assert_eq!(value, 5);
        assert_eq!(requests_to(&server, "GET", ZONES_KEY).await, 2);
        assert_eq!(requests_to(&server, "PUT", ZONES_KEY).await, 2);
    }

    #[tokio::test]
    async fn test_unresolved_contention_gives_up() {
        let server = MockServer::start().await;
        stored(&server, ZONES_KEY, json!({ "value": 4 }), "\"v4\"").await;
        on_replace(&server, ZONES_KEY, 412, MAX_ATTEMPTS as u64).await;

        let result = sequence_for(&server).next_value(&Partition::Zones).await;

        assert!(matches!(result, Err(DomainError::StorageFailure(_))));
    }

    #[tokio::test]
    async fn test_raise_floor_leaves_higher_counter_alone() {
        let server = MockServer::start().await;
        stored(&server, ZONES_KEY, json!({ "value": 10 }), "\"v10\"").await;
        on_replace(&server, ZONES_KEY, 200, 0).await;
        on_create(&server, ZONES_KEY, 200, 0).await;

        sequence_for(&server)
            .raise_floor(&Partition::Zones, 3)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_raise_floor_lifts_lower_counter() {
        let server = MockServer::start().await;
        stored(&server, ZONES_KEY, json!({ "value": 2 }), "\"v2\"").await;
        on_replace(&server, ZONES_KEY, 200, 1).await;

        sequence_for(&server)
            .raise_floor(&Partition::Zones, 9)
            .await
            .unwrap();
    }
}
