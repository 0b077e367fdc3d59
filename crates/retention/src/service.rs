// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retention Service (C6, spec §4.6): preview/delete jobs older than a
//! threshold, or an explicit id list, sweeping the job row and every
//! object-store artifact under its addressing prefixes (spec §6).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use deckcast_core::{ArtifactPaths, CanonicalPath, Clock, Job, JobId, JobStatus};

use crate::error::RetentionError;
use crate::ports::{JobStorePort, ObjectStorePort};

/// Default sweep scope (spec §4.6): "never `{pending, decomposing,
/// synthesizing, assembling}` — actively processing jobs must not be
/// swept."
pub const DEFAULT_STATUS_FILTER: [JobStatus; 2] = [JobStatus::Completed, JobStatus::Failed];

#[derive(Debug, Clone)]
pub struct PreviewResult {
    pub count: usize,
    pub cutoff: DateTime<Utc>,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Default)]
pub struct DeletionSummary {
    pub jobs_deleted: usize,
    pub artifacts_deleted: usize,
    pub errors: Vec<String>,
}

pub struct RetentionService<J, O, C> {
    job_store: Arc<J>,
    object_store: Arc<O>,
    clock: C,
}

impl<J, O, C> RetentionService<J, O, C>
where
    J: JobStorePort,
    O: ObjectStorePort,
    C: Clock,
{
    pub fn new(job_store: Arc<J>, object_store: Arc<O>, clock: C) -> Self {
        Self {
            job_store,
            object_store,
            clock,
        }
    }

    /// Pure read (spec §4.6): jobs whose `created_at` is older than
    /// `age_days` and whose status is in `status_filter`.
    pub async fn preview(
        &self,
        age_days: i64,
        status_filter: &[JobStatus],
    ) -> Result<PreviewResult, RetentionError> {
        let cutoff = self.clock.utc_now() - chrono::Duration::days(age_days);
        let jobs = self.job_store.list_jobs_older_than(cutoff, status_filter).await?;
        Ok(PreviewResult {
            count: jobs.len(),
            cutoff,
            jobs,
        })
    }

    /// Deletes every job older than `age_days` matching `status_filter`
    /// (spec §4.6).
    pub async fn delete_old(
        &self,
        age_days: i64,
        status_filter: &[JobStatus],
    ) -> Result<DeletionSummary, RetentionError> {
        let preview = self.preview(age_days, status_filter).await?;
        let ids: Vec<JobId> = preview.jobs.iter().map(|j| j.id).collect();
        Ok(self.delete_jobs(&ids).await)
    }

    /// Deletes exactly the named jobs, bypassing the age/status filter —
    /// an operator override (spec §4.6).
    pub async fn delete_specific(&self, ids: &[JobId]) -> Result<DeletionSummary, RetentionError> {
        Ok(self.delete_jobs(ids).await)
    }

    /// Loops [`Self::delete_old`] on `interval`, for deployments that want
    /// the sweep automated rather than operator-triggered. Additive; does
    /// not change `delete_old`'s contract.
    pub async fn run_periodic(
        &self,
        interval: Duration,
        age_days: i64,
        status_filter: Vec<JobStatus>,
    ) -> ! {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match self.delete_old(age_days, &status_filter).await {
                Ok(summary) => tracing::info!(
                    jobs_deleted = summary.jobs_deleted,
                    artifacts_deleted = summary.artifacts_deleted,
                    sweep_errors = summary.errors.len(),
                    "retention sweep complete"
                ),
                Err(error) => tracing::error!(%error, "retention sweep failed"),
            }
        }
    }

    /// Per-job deletion, in the exact order spec §4.6 lists. Every step's
    /// error is recorded and does not abort the remaining steps; the job
    /// row is only deleted once all four artifact steps have been
    /// attempted.
    async fn delete_jobs(&self, ids: &[JobId]) -> DeletionSummary {
        let mut summary = DeletionSummary::default();
        for &id in ids {
            let job = match self.job_store.get_job(id).await {
                Ok(Some(job)) => job,
                Ok(None) => continue,
                Err(error) => {
                    summary.errors.push(format!("job {id}: {error}"));
                    continue;
                }
            };
            self.delete_job_artifacts(&job, &mut summary).await;
            match self.job_store.delete_job_cascade(id).await {
                Ok(()) => summary.jobs_deleted += 1,
                Err(error) => summary.errors.push(format!("job {id} row: {error}")),
            }
        }
        summary
    }

    async fn delete_job_artifacts(&self, job: &Job, summary: &mut DeletionSummary) {
        // step 1: source artifact.
        if let Some(path) = CanonicalPath::parse(&job.source_artifact_key) {
            self.try_delete(&path.bucket, &path.key, summary).await;
        }

        // step 2: result artifact, if any.
        if let Some(result_key) = &job.result_artifact_key {
            if let Some(path) = CanonicalPath::parse(result_key) {
                self.try_delete(&path.bucket, &path.key, summary).await;
            }
        }

        // step 3: job-id-addressed prefixes.
        let (bucket, prefix) = ArtifactPaths::audio_prefix_by_job_id(job.id);
        self.try_delete_prefix(bucket, &prefix, summary).await;
        let (bucket, prefix) = ArtifactPaths::notes_prefix(job.id);
        self.try_delete_prefix(bucket, &prefix, summary).await;

        // step 4: job-uuid-addressed prefixes, ending in the catch-all.
        let job_uuid = job.source_uuid();
        let (bucket, prefix) = ArtifactPaths::images_prefix(job_uuid);
        self.try_delete_prefix(bucket, &prefix, summary).await;
        let (bucket, prefix) = ArtifactPaths::job_uuid_prefix(job_uuid);
        self.try_delete_prefix(bucket, &prefix, summary).await;
    }

    async fn try_delete(&self, bucket: &str, key: &str, summary: &mut DeletionSummary) {
        match self.object_store.delete(bucket, key).await {
            Ok(()) => summary.artifacts_deleted += 1,
            Err(error) => summary.errors.push(format!("{bucket}/{key}: {error}")),
        }
    }

    async fn try_delete_prefix(&self, bucket: &str, prefix: &str, summary: &mut DeletionSummary) {
        match self.object_store.delete_prefix(bucket, prefix).await {
            Ok(count) => summary.artifacts_deleted += count,
            Err(error) => summary.errors.push(format!("{bucket}/{prefix}: {error}")),
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
