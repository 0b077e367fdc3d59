// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fakes for [`crate::service::RetentionService`] tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deckcast_core::{Job, JobId, JobStatus};
use parking_lot::Mutex;

use crate::error::RetentionError;
use crate::ports::{JobStorePort, ObjectStorePort};

#[derive(Default)]
pub struct FakeJobStore {
    jobs: Mutex<HashMap<JobId, Job>>,
}

impl FakeJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Job) {
        self.jobs.lock().insert(job.id, job);
    }

    pub fn contains(&self, id: JobId) -> bool {
        self.jobs.lock().contains_key(&id)
    }
}

#[async_trait]
impl JobStorePort for FakeJobStore {
    async fn get_job(&self, id: JobId) -> Result<Option<Job>, RetentionError> {
        Ok(self.jobs.lock().get(&id).cloned())
    }

    async fn list_jobs_older_than(
        &self,
        cutoff: DateTime<Utc>,
        statuses: &[JobStatus],
    ) -> Result<Vec<Job>, RetentionError> {
        Ok(self
            .jobs
            .lock()
            .values()
            .filter(|j| j.created_at < cutoff && statuses.contains(&j.status))
            .cloned()
            .collect())
    }

    async fn delete_job_cascade(&self, id: JobId) -> Result<(), RetentionError> {
        self.jobs.lock().remove(&id);
        Ok(())
    }
}

/// Records every `(bucket, key)` deleted and every `(bucket, prefix)`
/// swept, so tests can assert on the exact ordering in spec §4.6 without
/// a live object store. A key present in `objects` is "deleted" when it
/// falls under a deleted prefix or an exact key delete.
#[derive(Default)]
pub struct FakeObjectStore {
    objects: Mutex<HashSet<(String, String)>>,
    deleted_exact: Mutex<Vec<(String, String)>>,
    deleted_prefixes: Mutex<Vec<(String, String)>>,
}

impl FakeObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, bucket: &str, key: &str) {
        self.objects
            .lock()
            .insert((bucket.to_string(), key.to_string()));
    }

    pub fn exists(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .lock()
            .contains(&(bucket.to_string(), key.to_string()))
    }

    pub fn deleted_prefixes(&self) -> Vec<(String, String)> {
        self.deleted_prefixes.lock().clone()
    }
}

#[async_trait]
impl ObjectStorePort for FakeObjectStore {
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), RetentionError> {
        self.objects
            .lock()
            .remove(&(bucket.to_string(), key.to_string()));
        self.deleted_exact
            .lock()
            .push((bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn delete_prefix(&self, bucket: &str, prefix: &str) -> Result<usize, RetentionError> {
        let mut objects = self.objects.lock();
        let matching: Vec<_> = objects
            .iter()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .cloned()
            .collect();
        for entry in &matching {
            objects.remove(entry);
        }
        self.deleted_prefixes
            .lock()
            .push((bucket.to_string(), prefix.to_string()));
        Ok(matching.len())
    }
}
