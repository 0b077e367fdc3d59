// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capability traits the [`crate::service::RetentionService`] is generic
//! over, mirroring `deckcast-engine::ports` — the sweep's state machine is
//! exercised in tests against [`fakes`] rather than live Postgres/MinIO.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deckcast_core::{Job, JobId, JobStatus};

use crate::error::RetentionError;

#[async_trait]
pub trait JobStorePort: Send + Sync {
    async fn get_job(&self, id: JobId) -> Result<Option<Job>, RetentionError>;
    async fn list_jobs_older_than(
        &self,
        cutoff: DateTime<Utc>,
        statuses: &[JobStatus],
    ) -> Result<Vec<Job>, RetentionError>;
    async fn delete_job_cascade(&self, id: JobId) -> Result<(), RetentionError>;
}

#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), RetentionError>;
    async fn delete_prefix(&self, bucket: &str, prefix: &str) -> Result<usize, RetentionError>;
}

mod real {
    use super::*;

    #[async_trait]
    impl JobStorePort for deckcast_storage::JobStore {
        async fn get_job(&self, id: JobId) -> Result<Option<Job>, RetentionError> {
            Ok(deckcast_storage::JobStore::get_job(self, id).await?)
        }

        async fn list_jobs_older_than(
            &self,
            cutoff: DateTime<Utc>,
            statuses: &[JobStatus],
        ) -> Result<Vec<Job>, RetentionError> {
            Ok(deckcast_storage::JobStore::list_jobs_older_than(self, cutoff, statuses).await?)
        }

        async fn delete_job_cascade(&self, id: JobId) -> Result<(), RetentionError> {
            Ok(deckcast_storage::JobStore::delete_job_cascade(self, id).await?)
        }
    }

    #[async_trait]
    impl ObjectStorePort for deckcast_objectstore::ObjectStore {
        async fn delete(&self, bucket: &str, key: &str) -> Result<(), RetentionError> {
            Ok(deckcast_objectstore::ObjectStore::delete(self, bucket, key).await?)
        }

        async fn delete_prefix(&self, bucket: &str, prefix: &str) -> Result<usize, RetentionError> {
            Ok(deckcast_objectstore::ObjectStore::delete_prefix(self, bucket, prefix).await?)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fakes;
