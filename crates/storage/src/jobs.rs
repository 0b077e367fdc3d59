// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job Store (spec §4.1): durable persistence for `Job` rows.

use crate::error::StorageError;
use chrono::{DateTime, Utc};
use deckcast_core::{Job, JobId, JobStatus, UserId, VoiceReferenceId};
use sqlx::PgPool;

/// Fields accepted by [`JobStore::set_job_status`]. All are optional;
/// `None` leaves the existing column untouched.
#[derive(Debug, Clone, Default)]
pub struct JobStatusUpdate {
    pub stage: Option<String>,
    pub error: Option<String>,
    pub result_key: Option<String>,
    pub slide_count: Option<i32>,
}

/// Outcome of a status-transition attempt (spec §4.1: "rejects transitions
/// out of a terminal state by returning a signal, not an error").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetStatusOutcome {
    Applied,
    /// The transition was not legal under [`JobStatus::can_transition_to`];
    /// carries the status that was actually left in place.
    Rejected { current: JobStatus },
}

/// Keyset page cursor for [`JobStore::list_all_jobs`]: `(created_at, id)`,
/// per spec §4.1's dashboard pagination requirement.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobPage {
    pub after: Option<(DateTime<Utc>, JobId)>,
    pub limit: i64,
}

#[derive(Clone)]
pub struct JobStore {
    pool: PgPool,
}

impl JobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_job(
        &self,
        owner_id: UserId,
        voice_ref_id: VoiceReferenceId,
        source_artifact_key: &str,
    ) -> Result<Job, StorageError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (owner_id, voice_ref_id, source_artifact_key, status, stage)
            VALUES ($1, $2, $3, 'pending', 'pending')
            RETURNING id, owner_id, voice_ref_id, source_artifact_key, result_artifact_key,
                      status, stage, slide_count, error, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(voice_ref_id)
        .bind(source_artifact_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn get_job(&self, id: JobId) -> Result<Option<Job>, StorageError> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, owner_id, voice_ref_id, source_artifact_key, result_artifact_key,
                   status, stage, slide_count, error, created_at, updated_at
            FROM jobs WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    pub async fn list_jobs_by_status(
        &self,
        statuses: &[JobStatus],
    ) -> Result<Vec<Job>, StorageError> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, owner_id, voice_ref_id, source_artifact_key, result_artifact_key,
                   status, stage, slide_count, error, created_at, updated_at
            FROM jobs WHERE status = ANY($1) ORDER BY created_at, id
            "#,
        )
        .bind(statuses)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    pub async fn list_jobs_older_than(
        &self,
        cutoff: DateTime<Utc>,
        statuses: &[JobStatus],
    ) -> Result<Vec<Job>, StorageError> {
        let jobs = sqlx::query_as::<_, Job>(
            r#"
            SELECT id, owner_id, voice_ref_id, source_artifact_key, result_artifact_key,
                   status, stage, slide_count, error, created_at, updated_at
            FROM jobs
            WHERE created_at < $1 AND status = ANY($2)
            ORDER BY created_at, id
            "#,
        )
        .bind(cutoff)
        .bind(statuses)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    /// Paginated listing for dashboards, ordered by `(created_at, id)`.
    pub async fn list_all_jobs(&self, page: JobPage) -> Result<Vec<Job>, StorageError> {
        let limit = if page.limit <= 0 { 50 } else { page.limit };
        let jobs = match page.after {
            Some((created_at, id)) => {
                sqlx::query_as::<_, Job>(
                    r#"
                    SELECT id, owner_id, voice_ref_id, source_artifact_key, result_artifact_key,
                           status, stage, slide_count, error, created_at, updated_at
                    FROM jobs
                    WHERE (created_at, id) > ($1, $2)
                    ORDER BY created_at, id
                    LIMIT $3
                    "#,
                )
                .bind(created_at)
                .bind(id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Job>(
                    r#"
                    SELECT id, owner_id, voice_ref_id, source_artifact_key, result_artifact_key,
                           status, stage, slide_count, error, created_at, updated_at
                    FROM jobs
                    ORDER BY created_at, id
                    LIMIT $1
                    "#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(jobs)
    }

    /// Transactional status update (spec §4.1). Idempotent: a repeated
    /// write of the same status is a no-op `Applied`; a transition out of
    /// a terminal state, or one that skips the DAG in spec §3 invariant 1,
    /// returns `Rejected` rather than an error.
    pub async fn set_job_status(
        &self,
        id: JobId,
        status: JobStatus,
        update: JobStatusUpdate,
    ) -> Result<SetStatusOutcome, StorageError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<JobStatus> =
            sqlx::query_scalar("SELECT status FROM jobs WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let current = current.ok_or(StorageError::JobNotFound(id))?;

        if current != status && !current.can_transition_to(status) {
            return Ok(SetStatusOutcome::Rejected { current });
        }

        sqlx::query(
            r#"
            UPDATE jobs SET
                status = $2,
                stage = COALESCE($3, stage),
                error = COALESCE($4, error),
                result_artifact_key = COALESCE($5, result_artifact_key),
                slide_count = COALESCE($6, slide_count),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(update.stage)
        .bind(update.error)
        .bind(update.result_key)
        .bind(update.slide_count)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(SetStatusOutcome::Applied)
    }

    /// Deletes the job row; `ON DELETE CASCADE` on `tasks.job_id` and
    /// `task_cancellations.task_id` removes its children (spec §3 invariant
    /// 8's row-level half; artifact deletion is the caller's job — see
    /// `deckcast-retention`).
    pub async fn delete_job_cascade(&self, id: JobId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
