// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! deckcast-objectstore: the only component that talks to the object
//! store (spec §4.2), backed by `aws-sdk-s3` against an S3-compatible
//! endpoint (MinIO in development, per §6).

pub mod error;

pub use error::ObjectStoreError;

use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use deckcast_core::CanonicalPath;
use futures_util::{Stream, StreamExt};

/// Result of [`ObjectStore::stat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStat {
    pub size: i64,
    pub content_type: Option<String>,
}

/// One entry from [`ObjectStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: i64,
}

#[derive(Clone)]
pub struct ObjectStore {
    client: Client,
}

impl ObjectStore {
    /// Build a client against a custom (MinIO-compatible) endpoint using
    /// static credentials, per spec §6's configuration table.
    pub async fn connect(endpoint_url: &str, access_key: &str, secret_key: &str) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "deckcast");
        let shared_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(endpoint_url)
            .credentials_provider(credentials)
            .load()
            .await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
            .force_path_style(true)
            .build();
        Self {
            client: Client::from_conf(s3_config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Returns the canonical `"/{bucket}/{key}"` path (spec §4.2).
    pub async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
    ) -> Result<CanonicalPath, ObjectStoreError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| ObjectStoreError::Put(e.to_string()))?;
        Ok(CanonicalPath::new(bucket, key))
    }

    pub async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, ObjectStoreError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(service_err) if service_err.is_no_such_key() => ObjectStoreError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                },
                _ => ObjectStoreError::Get(e.to_string()),
            })?;
        let aggregated = output
            .body
            .collect()
            .await
            .map_err(|e| ObjectStoreError::Get(e.to_string()))?;
        Ok(aggregated.into_bytes())
    }

    pub async fn stat(&self, bucket: &str, key: &str) -> Result<ObjectStat, ObjectStoreError> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(service_err) if service_err.is_not_found() => ObjectStoreError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                },
                _ => ObjectStoreError::Stat(e.to_string()),
            })?;
        Ok(ObjectStat {
            size: output.content_length().unwrap_or(0),
            content_type: output.content_type().map(str::to_string),
        })
    }

    /// Recursive listing under `prefix`, streamed via the SDK's paginator
    /// so `delete_prefix` never buffers an unbounded listing (spec §4.2).
    pub fn list(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> impl Stream<Item = Result<ObjectEntry, ObjectStoreError>> + '_ {
        let paginator = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .into_paginator()
            .send();
        paginator.flat_map(|page| {
            let entries: Vec<Result<ObjectEntry, ObjectStoreError>> = match page {
                Ok(page) => page
                    .contents()
                    .iter()
                    .map(|obj| {
                        Ok(ObjectEntry {
                            key: obj.key().unwrap_or_default().to_string(),
                            size: obj.size().unwrap_or(0),
                        })
                    })
                    .collect(),
                Err(e) => vec![Err(ObjectStoreError::List(e.to_string()))],
            };
            futures_util::stream::iter(entries)
        })
    }

    /// Not-found is not an error (spec §4.2).
    pub async fn delete(&self, bucket: &str, key: &str) -> Result<(), ObjectStoreError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Delete(e.to_string()))?;
        Ok(())
    }

    /// Deletes every object under `prefix`, returning the count deleted.
    /// An empty prefix returns `0` without error (spec §8 idempotence law).
    pub async fn delete_prefix(&self, bucket: &str, prefix: &str) -> Result<usize, ObjectStoreError> {
        let mut stream = Box::pin(self.list(bucket, prefix));
        let mut count = 0usize;
        while let Some(entry) = stream.next().await {
            let entry = entry?;
            self.delete(bucket, &entry.key).await?;
            count += 1;
        }
        Ok(count)
    }

    /// Parses a canonical `"/{bucket}/{key}"` path.
    pub fn parse_canonical(path: &str) -> Result<CanonicalPath, ObjectStoreError> {
        CanonicalPath::parse(path).ok_or_else(|| ObjectStoreError::MalformedPath(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_canonical_round_trips_through_core() {
        let parsed = ObjectStore::parse_canonical("/output/42.mp4").unwrap();
        assert_eq!(parsed.bucket, "output");
        assert_eq!(parsed.key, "42.mp4");
    }

    #[test]
    fn parse_canonical_rejects_bare_bucket() {
        assert!(ObjectStore::parse_canonical("/output").is_err());
    }
}
