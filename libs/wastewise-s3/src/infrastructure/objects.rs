//! JSON objects in a bucket, with conditional writes
//!
//! Every adapter in this crate stores small JSON documents and relies on the
//! `If-None-Match` / `If-Match` preconditions of `PutObject` for its
//! consistency guarantees. This module owns the raw SDK calls and the mapping
//! of SDK errors to [`DomainError::StorageFailure`].

use std::future::Future;

use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use wastewise_domain::DomainError;

/// Precondition attached to a put
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Condition {
    /// Overwrite unconditionally
    Always,
    /// Only write if no object exists under the key
    Absent,
    /// Only write if the stored object still carries this ETag
    Matches(String),
}

/// Result of a conditional put
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Put {
    Written,
    /// The precondition did not hold; nothing was written
    Rejected,
}

/// A decoded object together with the ETag it was read at
#[derive(Debug, Clone)]
pub(crate) struct Versioned<T> {
    pub value: T,
    pub etag: Option<String>,
}

impl<T> Versioned<T> {
    /// Condition that only succeeds if nobody wrote the object since it was read
    pub fn unchanged(&self) -> Condition {
        match &self.etag {
            Some(etag) => Condition::Matches(etag.clone()),
            None => Condition::Always,
        }
    }
}

/// How long a claim is protected while its owner's document may not exist yet
pub(crate) const CLAIM_LEASE_SECS: i64 = 30;

/// Body of a name claim object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NameClaim {
    pub owner: String,
    pub claimed_at: DateTime<Utc>,
}

impl NameClaim {
    pub fn new(owner: &str, claimed_at: DateTime<Utc>) -> Self {
        Self {
            owner: owner.to_string(),
            claimed_at,
        }
    }

    /// Whether the claim is still inside its lease at `now`
    ///
    /// The insert and rename paths write the claim before the document, so a
    /// leased claim can look orphaned while its writer is still in flight.
    pub fn is_leased(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.claimed_at) < Duration::seconds(CLAIM_LEASE_SECS)
    }
}

/// Outcome of [`JsonObjects::claim`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Claim {
    /// The caller now owns the claim
    Acquired,
    /// The caller already owned it
    AlreadyOwned,
    /// A live owner holds it
    Held(String),
}

/// Hex-encode a name so any string is a safe key segment
pub(crate) fn encode_segment(name: &str) -> String {
    name.bytes().map(|b| format!("{:02x}", b)).collect()
}

#[derive(Clone)]
pub(crate) struct JsonObjects {
    client: Client,
    bucket: String,
}

impl JsonObjects {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<Versioned<T>>, DomainError> {
        debug!(key = %key, bucket = %self.bucket, "Reading object");

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|service| service.is_no_such_key())
                    .unwrap_or(false)
                    || status_of(&err) == Some(404)
                {
                    return Ok(None);
                }
                error!(key = %key, error = ?err, "Failed to read object from S3");
                return Err(DomainError::storage_failure(format!(
                    "S3 get_object failed for key '{}': {}",
                    key, err
                )));
            }
        };

        let etag = output.e_tag().map(str::to_string);
        let data = output.body.collect().await.map_err(|err| {
            error!(key = %key, error = ?err, "Failed to read S3 object body");
            DomainError::storage_failure(format!(
                "Failed to read S3 object body for key '{}': {}",
                key, err
            ))
        })?;

        let value = serde_json::from_slice(&data.into_bytes()).map_err(|err| {
            error!(key = %key, error = %err, "Stored object is not valid JSON");
            DomainError::storage_failure(format!("Corrupt object '{}': {}", key, err))
        })?;

        Ok(Some(Versioned { value, etag }))
    }

    pub async fn put<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        condition: Condition,
    ) -> Result<Put, DomainError> {
        let body = serde_json::to_vec(value).map_err(|err| {
            DomainError::internal(format!("Failed to encode object '{}': {}", key, err))
        })?;

        debug!(key = %key, condition = ?condition, size = body.len(), "Writing object");

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(Bytes::from(body)));
        request = match condition {
            Condition::Always => request,
            Condition::Absent => request.if_none_match("*"),
            Condition::Matches(etag) => request.if_match(etag),
        };

        match request.send().await {
            Ok(_) => Ok(Put::Written),
            // 409 is returned when another conditional write is in flight
            Err(err) if matches!(status_of(&err), Some(412) | Some(409)) => {
                debug!(key = %key, "Conditional write rejected");
                Ok(Put::Rejected)
            }
            Err(err) => {
                error!(key = %key, error = ?err, "Failed to write object to S3");
                Err(DomainError::storage_failure(format!(
                    "S3 put_object failed for key '{}': {}",
                    key, err
                )))
            }
        }
    }

    pub async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|service| service.is_not_found())
                    .unwrap_or(false)
                    || status_of(&err) == Some(404)
                {
                    Ok(false)
                } else {
                    error!(key = %key, error = ?err, "Failed to check object existence in S3");
                    Err(DomainError::storage_failure(format!(
                        "S3 head_object failed for key '{}': {}",
                        key, err
                    )))
                }
            }
        }
    }

    pub async fn delete(&self, key: &str) -> Result<(), DomainError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map(|_| debug!(key = %key, "Deleted object"))
            .map_err(|err| {
                error!(key = %key, error = ?err, "Failed to delete object from S3");
                DomainError::storage_failure(format!(
                    "S3 delete_object failed for key '{}': {}",
                    key, err
                ))
            })
    }

    /// Every key under `prefix`, following continuation tokens
    pub async fn keys(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| {
                error!(prefix = %prefix, error = ?err, "Failed to list objects in S3");
                DomainError::storage_failure(format!(
                    "S3 list_objects_v2 failed for prefix '{}': {}",
                    prefix, err
                ))
            })?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );
        }
        Ok(keys)
    }

    /// Read every JSON document under `prefix`
    ///
    /// Documents deleted between listing and reading are skipped.
    pub async fn load_all<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>, DomainError> {
        let mut documents = Vec::new();
        for key in self.keys(prefix).await? {
            if let Some(doc) = self.get::<T>(&key).await? {
                documents.push(doc.value);
            }
        }
        Ok(documents)
    }

    /// Take ownership of a name claim for `owner`
    ///
    /// A claim is only taken over once its lease has expired and its owner no
    /// longer holds the name (checked with `holder_is_live`). The takeover is
    /// guarded by the ETag the claim was read at.
    pub async fn claim<F, Fut>(
        &self,
        key: &str,
        owner: &str,
        holder_is_live: F,
    ) -> Result<Claim, DomainError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<bool, DomainError>>,
    {
        let claim = NameClaim::new(owner, Utc::now());
        if self.put(key, &claim, Condition::Absent).await? == Put::Written {
            return Ok(Claim::Acquired);
        }

        let Some(current) = self.get::<NameClaim>(key).await? else {
            // Released between our put and our read; one more attempt
            return match self.put(key, &claim, Condition::Absent).await? {
                Put::Written => Ok(Claim::Acquired),
                Put::Rejected => Ok(Claim::Held(String::new())),
            };
        };

        if current.value.owner == owner {
            return Ok(Claim::AlreadyOwned);
        }

        let holder = current.value.owner.clone();
        if current.value.is_leased(Utc::now()) || holder_is_live(holder.clone()).await? {
            return Ok(Claim::Held(holder));
        }

        warn!(key = %key, stale_owner = %holder, "Taking over stale name claim");
        match self.put(key, &claim, current.unchanged()).await? {
            Put::Written => Ok(Claim::Acquired),
            Put::Rejected => Ok(Claim::Held(holder)),
        }
    }

    /// Delete a claim if `owner` still holds it
    pub async fn release(&self, key: &str, owner: &str) -> Result<(), DomainError> {
        match self.get::<NameClaim>(key).await? {
            Some(current) if current.value.owner == owner => self.delete(key).await,
            _ => Ok(()),
        }
    }
}

fn status_of<E>(err: &SdkError<E>) -> Option<u16> {
    err.raw_response().map(|response| response.status().as_u16())
}
