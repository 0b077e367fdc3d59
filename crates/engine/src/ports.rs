// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capability traits ("ports") the dispatcher/barrier/synthesis workers are
//! generic over, so their state machines can be exercised against
//! in-memory fakes instead of a live Postgres/MinIO (spec §8.4). Real
//! implementations wrap the concrete `deckcast-storage`/`deckcast-objectstore`/
//! `deckcast-broker` types; see [`fakes`] for the test doubles.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use deckcast_core::{Job, JobId, JobStatus, Task, TaskId, TaskKind, TaskUpdate, VoiceReference, VoiceReferenceId};
use deckcast_storage::{JobPage, JobStatusUpdate, SetStatusOutcome, TaskRef};

use crate::error::EngineError;

#[async_trait]
pub trait JobStorePort: Send + Sync {
    async fn get_job(&self, id: JobId) -> Result<Option<Job>, EngineError>;
    async fn set_job_status(
        &self,
        id: JobId,
        status: JobStatus,
        update: JobStatusUpdate,
    ) -> Result<SetStatusOutcome, EngineError>;
    async fn list_jobs_older_than(
        &self,
        cutoff: DateTime<Utc>,
        statuses: &[JobStatus],
    ) -> Result<Vec<Job>, EngineError>;
    async fn list_all_jobs(&self, page: JobPage) -> Result<Vec<Job>, EngineError>;
    async fn delete_job_cascade(&self, id: JobId) -> Result<(), EngineError>;
}

#[async_trait]
pub trait VoiceReferencePort: Send + Sync {
    async fn get_voice_reference(
        &self,
        id: VoiceReferenceId,
    ) -> Result<Option<VoiceReference>, EngineError>;
}

#[async_trait]
pub trait TaskStorePort: Send + Sync {
    async fn create_task(
        &self,
        job_id: JobId,
        kind: TaskKind,
        slide_index: Option<i32>,
        external_id: Option<&str>,
    ) -> Result<Task, EngineError>;
    async fn update_task(&self, task_ref: TaskRef<'_>, update: TaskUpdate) -> Result<Task, EngineError>;
    async fn list_tasks(&self, job_id: JobId) -> Result<Vec<Task>, EngineError>;
    async fn is_cancellation_requested(&self, task_id: TaskId) -> Result<bool, EngineError>;
    async fn request_cancellation(&self, task_id: TaskId) -> Result<(), EngineError>;
}

#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    async fn put(&self, bucket: &str, key: &str, bytes: Bytes) -> Result<(), EngineError>;
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, EngineError>;
    async fn delete_prefix(&self, bucket: &str, prefix: &str) -> Result<usize, EngineError>;
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), EngineError>;
}

#[async_trait]
pub trait BrokerPort: Send + Sync {
    async fn enqueue(
        &self,
        queue: deckcast_broker::Queue,
        task_name: &str,
        args: serde_json::Value,
        task_id: Option<TaskId>,
    ) -> Result<String, EngineError>;

    /// Broadcasts a revoke across all queues for a task's broker handle
    /// (spec §5 "Cancellation": "the broker is expected to interrupt
    /// running tasks cooperatively"). `external_id` is `None` for tasks
    /// that were never enqueued (e.g. not yet dispatched).
    async fn revoke(&self, task_id: TaskId, external_id: Option<&str>) -> Result<(), EngineError>;
}

mod real {
    use super::*;

    #[async_trait]
    impl JobStorePort for deckcast_storage::JobStore {
        async fn get_job(&self, id: JobId) -> Result<Option<Job>, EngineError> {
            Ok(deckcast_storage::JobStore::get_job(self, id).await?)
        }

        async fn set_job_status(
            &self,
            id: JobId,
            status: JobStatus,
            update: JobStatusUpdate,
        ) -> Result<SetStatusOutcome, EngineError> {
            Ok(deckcast_storage::JobStore::set_job_status(self, id, status, update).await?)
        }

        async fn list_jobs_older_than(
            &self,
            cutoff: DateTime<Utc>,
            statuses: &[JobStatus],
        ) -> Result<Vec<Job>, EngineError> {
            Ok(deckcast_storage::JobStore::list_jobs_older_than(self, cutoff, statuses).await?)
        }

        async fn list_all_jobs(&self, page: JobPage) -> Result<Vec<Job>, EngineError> {
            Ok(deckcast_storage::JobStore::list_all_jobs(self, page).await?)
        }

        async fn delete_job_cascade(&self, id: JobId) -> Result<(), EngineError> {
            Ok(deckcast_storage::JobStore::delete_job_cascade(self, id).await?)
        }
    }

    #[async_trait]
    impl VoiceReferencePort for deckcast_storage::VoiceReferenceStore {
        async fn get_voice_reference(
            &self,
            id: VoiceReferenceId,
        ) -> Result<Option<VoiceReference>, EngineError> {
            Ok(deckcast_storage::VoiceReferenceStore::get(self, id).await?)
        }
    }

    #[async_trait]
    impl TaskStorePort for deckcast_storage::TaskStore {
        async fn create_task(
            &self,
            job_id: JobId,
            kind: TaskKind,
            slide_index: Option<i32>,
            external_id: Option<&str>,
        ) -> Result<Task, EngineError> {
            Ok(deckcast_storage::TaskStore::create_task(self, job_id, kind, slide_index, external_id)
                .await?)
        }

        async fn update_task(&self, task_ref: TaskRef<'_>, update: TaskUpdate) -> Result<Task, EngineError> {
            Ok(deckcast_storage::TaskStore::update_task(self, task_ref, update).await?)
        }

        async fn list_tasks(&self, job_id: JobId) -> Result<Vec<Task>, EngineError> {
            Ok(deckcast_storage::TaskStore::list_tasks(self, job_id).await?)
        }

        async fn is_cancellation_requested(&self, task_id: TaskId) -> Result<bool, EngineError> {
            Ok(deckcast_storage::TaskStore::is_cancellation_requested(self, task_id).await?)
        }

        async fn request_cancellation(&self, task_id: TaskId) -> Result<(), EngineError> {
            Ok(deckcast_storage::TaskStore::request_cancellation(self, task_id).await?)
        }
    }

    #[async_trait]
    impl ObjectStorePort for deckcast_objectstore::ObjectStore {
        async fn put(&self, bucket: &str, key: &str, bytes: Bytes) -> Result<(), EngineError> {
            deckcast_objectstore::ObjectStore::put(self, bucket, key, bytes).await?;
            Ok(())
        }

        async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, EngineError> {
            Ok(deckcast_objectstore::ObjectStore::get(self, bucket, key).await?)
        }

        async fn delete_prefix(&self, bucket: &str, prefix: &str) -> Result<usize, EngineError> {
            Ok(deckcast_objectstore::ObjectStore::delete_prefix(self, bucket, prefix).await?)
        }

        async fn delete(&self, bucket: &str, key: &str) -> Result<(), EngineError> {
            Ok(deckcast_objectstore::ObjectStore::delete(self, bucket, key).await?)
        }
    }

    #[async_trait]
    impl BrokerPort for deckcast_broker::Broker {
        async fn enqueue(
            &self,
            queue: deckcast_broker::Queue,
            task_name: &str,
            args: serde_json::Value,
            task_id: Option<TaskId>,
        ) -> Result<String, EngineError> {
            Ok(deckcast_broker::Broker::enqueue(self, queue, task_name, args, task_id).await?)
        }

        async fn revoke(&self, task_id: TaskId, external_id: Option<&str>) -> Result<(), EngineError> {
            let _ = task_id;
            Ok(deckcast_broker::Broker::revoke(self, external_id).await?)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fakes;
