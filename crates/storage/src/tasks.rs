// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task persistence (spec §4.1): `create_task`, `update_task`, `list_tasks`.

use crate::error::StorageError;
use deckcast_core::{JobId, Task, TaskId, TaskKind, TaskUpdate};
use sqlx::PgPool;

/// Identifies the task row an update applies to — either the store's own
/// primary key or the broker-assigned `external_id` (spec §4.1:
/// "update_task(id_or_external_id, ...)").
#[derive(Debug, Clone, Copy)]
pub enum TaskRef<'a> {
    Id(TaskId),
    ExternalId(&'a str),
}

#[derive(Clone)]
pub struct TaskStore {
    pool: PgPool,
}

impl TaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_task(
        &self,
        job_id: JobId,
        kind: TaskKind,
        slide_index: Option<i32>,
        external_id: Option<&str>,
    ) -> Result<Task, StorageError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (job_id, kind, slide_index, external_id, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id, job_id, kind, slide_index, external_id, status, progress,
                      error, started_at, completed_at
            "#,
        )
        .bind(job_id)
        .bind(kind)
        .bind(slide_index)
        .bind(external_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    /// Applies `update` to the referenced task row. On a transition into
    /// `running`, stamps `started_at` if unset; on any terminal status,
    /// stamps `completed_at` (spec §4.1).
    pub async fn update_task(
        &self,
        task_ref: TaskRef<'_>,
        update: TaskUpdate,
    ) -> Result<Task, StorageError> {
        let mut tx = self.pool.begin().await?;

        let current: Task = match task_ref {
            TaskRef::Id(id) => sqlx::query_as(
                r#"
                SELECT id, job_id, kind, slide_index, external_id, status, progress,
                       error, started_at, completed_at
                FROM tasks WHERE id = $1 FOR UPDATE
                "#,
            )
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StorageError::TaskNotFound(id))?,
            TaskRef::ExternalId(external_id) => sqlx::query_as(
                r#"
                SELECT id, job_id, kind, slide_index, external_id, status, progress,
                       error, started_at, completed_at
                FROM tasks WHERE external_id = $1 FOR UPDATE
                "#,
            )
            .bind(external_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StorageError::TaskExternalIdNotFound(external_id.to_string()))?,
        };

        let next_status = update.status.unwrap_or(current.status);
        let starts_now = next_status == deckcast_core::TaskStatus::Running
            && current.started_at.is_none();
        let completes_now = next_status.is_settled() && current.completed_at.is_none();

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks SET
                status = $2,
                progress = COALESCE($3, progress),
                error = COALESCE($4, error),
                external_id = COALESCE($5, external_id),
                started_at = CASE WHEN $6 THEN now() ELSE started_at END,
                completed_at = CASE WHEN $7 THEN now() ELSE completed_at END
            WHERE id = $1
            RETURNING id, job_id, kind, slide_index, external_id, status, progress,
                      error, started_at, completed_at
            "#,
        )
        .bind(current.id)
        .bind(next_status)
        .bind(update.progress)
        .bind(update.error)
        .bind(update.external_id)
        .bind(starts_now)
        .bind(completes_now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(task)
    }

    /// Ordered `(kind, slide_index nulls last)`, per spec §4.1.
    pub async fn list_tasks(&self, job_id: JobId) -> Result<Vec<Task>, StorageError> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, job_id, kind, slide_index, external_id, status, progress,
                   error, started_at, completed_at
            FROM tasks
            WHERE job_id = $1
            ORDER BY kind, slide_index NULLS LAST
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    /// Raises the cooperative-cancellation flag polled by workers (spec
    /// §5's cancellation protocol; see `deckcast-broker::task_cancellations`).
    pub async fn request_cancellation(&self, task_id: TaskId) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO task_cancellations (task_id) VALUES ($1) ON CONFLICT DO NOTHING",
        )
        .bind(task_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn is_cancellation_requested(&self, task_id: TaskId) -> Result<bool, StorageError> {
        let row: Option<(TaskId,)> =
            sqlx::query_as("SELECT task_id FROM task_cancellations WHERE task_id = $1")
                .bind(task_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
