// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task identifier and state machine — a child unit of work owned by a job
//! (spec §3).

use crate::ids::{JobId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three task bodies the engine schedules (spec §2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Decompose,
    Synthesize,
    Assemble,
}

crate::simple_display! {
    TaskKind {
        Decompose => "decompose",
        Synthesize => "synthesize",
        Assemble => "assemble",
    }
}

/// Status of a [`Task`]. Unlike [`crate::job::JobStatus`] there is no
/// ordering beyond pending -> running -> {completed, failed, cancelled}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// "Settled" per the glossary: any terminal status, success or failure.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

crate::simple_display! {
    TaskStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// A child unit of work belonging to a [`crate::job::Job`] (spec §3).
///
/// Holds only `job_id`, not a back-reference to the parent — see §9's
/// re-architecture guidance against cyclic ORM associations. Callers that
/// need the parent look it up through the job store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: TaskId,
    pub job_id: JobId,
    pub kind: TaskKind,
    pub slide_index: Option<i32>,
    pub external_id: Option<String>,
    pub status: TaskStatus,
    pub progress: Option<String>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Fields accepted by a task status update (spec §4.1: `update_task`).
///
/// `started_at`/`completed_at` are not settable directly — the store
/// stamps them based on the transition, per spec invariant 7 and the
/// `running` / terminal stamping rules in §4.1.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
    pub progress: Option<String>,
    pub error: Option<String>,
    pub external_id: Option<String>,
}

impl TaskUpdate {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_progress(mut self, progress: impl Into<String>) -> Self {
        self.progress = Some(progress.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct TaskBuilder => Task {
        set { id: TaskId = TaskId::new(1) }
        set { job_id: JobId = JobId::new(1) }
        set { kind: TaskKind = TaskKind::Synthesize }
        option { slide_index: i32 = None }
        option { external_id: String = None }
        set { status: TaskStatus = TaskStatus::Pending }
        option { progress: String = None }
        option { error: String = None }
        option { started_at: DateTime<Utc> = None }
        option { completed_at: DateTime<Utc> = None }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
