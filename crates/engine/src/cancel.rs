// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job cancellation (spec §5 "Cancellation"): a client may cancel a job in
//! any non-terminal state. Every non-terminal task with a broker handle is
//! revoked, every non-terminal task row is marked `cancelled`, and the job
//! itself transitions to `cancelled`. Already-terminal jobs are a no-op
//! (spec §3 invariant 2: terminal states are absorbing), surfaced the same
//! way [`deckcast_storage::jobs::SetStatusOutcome::Rejected`] does for every
//! other status write.

use std::sync::Arc;

use deckcast_core::{JobId, JobStatus, TaskId, TaskStatus, TaskUpdate};
use deckcast_storage::JobStatusUpdate;

use crate::error::EngineError;
use crate::ports::{BrokerPort, JobStorePort, TaskStorePort};

/// What [`Canceller::cancel_job`] did to a job's task set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelOutcome {
    /// Non-terminal tasks that were revoked and marked `cancelled`.
    pub tasks_cancelled: u32,
    /// `false` if the job was already terminal (no-op; spec §3 invariant 2).
    pub applied: bool,
}

/// Orchestrates job cancellation (spec §5). Generic over the same ports as
/// [`crate::dispatch::Dispatcher`] so it is exercised against
/// [`crate::ports::fakes`] in tests.
pub struct Canceller<J, T, B> {
    job_store: Arc<J>,
    task_store: Arc<T>,
    broker: Arc<B>,
}

impl<J, T, B> Canceller<J, T, B>
where
    J: JobStorePort,
    T: TaskStorePort,
    B: BrokerPort,
{
    pub fn new(job_store: Arc<J>, task_store: Arc<T>, broker: Arc<B>) -> Self {
        Self {
            job_store,
            task_store,
            broker,
        }
    }

    /// Cancels `job_id` (spec §5):
    ///
    /// 1. For every task with an `external_id` and non-terminal status,
    ///    broadcast a broker revoke across all queues and raise the
    ///    cooperative-cancellation flag a running worker polls.
    /// 2. Mark every such task `cancelled`.
    /// 3. Transition the job to `cancelled`.
    ///
    /// A job already in a terminal state is left untouched —
    /// `applied: false` on the returned outcome, never an error.
    pub async fn cancel_job(&self, job_id: JobId) -> Result<CancelOutcome, EngineError> {
        let job = self
            .job_store
            .get_job(job_id)
            .await?
            .ok_or(EngineError::JobNotFound(job_id))?;
        if job.status.is_terminal() {
            return Ok(CancelOutcome {
                tasks_cancelled: 0,
                applied: false,
            });
        }

        let tasks = self.task_store.list_tasks(job_id).await?;
        let mut tasks_cancelled = 0u32;
        for task in tasks.iter().filter(|t| !t.status.is_settled()) {
            self.broker.revoke(task.id, task.external_id.as_deref()).await?;
            self.task_store.request_cancellation(task.id).await?;
            self.task_store
                .update_task(
                    deckcast_storage::TaskRef::Id(task.id),
                    TaskUpdate::status(TaskStatus::Cancelled),
                )
                .await?;
            tasks_cancelled += 1;
        }

        let outcome = self
            .job_store
            .set_job_status(
                job_id,
                JobStatus::Cancelled,
                JobStatusUpdate {
                    stage: Some("cancelled".to_string()),
                    ..Default::default()
                },
            )
            .await?;

        Ok(CancelOutcome {
            tasks_cancelled,
            applied: matches!(outcome, deckcast_storage::SetStatusOutcome::Applied),
        })
    }
}

#[cfg(test)]
#[path = "cancel_tests.rs"]
mod tests;
