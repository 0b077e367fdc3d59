// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier and lifecycle state machine (spec §3, invariant 1-2).

use crate::ids::{JobId, UserId, VoiceReferenceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a [`Job`]. Progresses monotonically along
/// `pending -> decomposing -> synthesizing -> assembling -> completed`,
/// with `failed`/`cancelled` reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Decomposing,
    Synthesizing,
    Assembling,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Terminal states are absorbing (spec §3 invariant 2).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// `true` if `self -> next` is a legal transition under the DAG in
    /// invariant 1. Terminal states accept no further transition.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Self::Failed || next == Self::Cancelled {
            return true;
        }
        matches!(
            (self, next),
            (Self::Pending, Self::Decomposing)
                | (Self::Decomposing, Self::Synthesizing)
                | (Self::Synthesizing, Self::Assembling)
                | (Self::Assembling, Self::Completed)
        )
    }
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Decomposing => "decomposing",
        Synthesizing => "synthesizing",
        Assembling => "assembling",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// A client-submitted narrated-deck conversion request (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: JobId,
    pub owner_id: UserId,
    pub voice_ref_id: VoiceReferenceId,
    pub source_artifact_key: String,
    pub result_artifact_key: Option<String>,
    pub status: JobStatus,
    pub stage: String,
    pub slide_count: Option<i32>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// The per-job nonce used for artifact addressing (spec §6): the
    /// basename of `source_artifact_key` with its extension stripped.
    /// Deliberately distinct from `id` — see [`crate::artifacts::ArtifactPaths`].
    pub fn source_uuid(&self) -> &str {
        let basename = self
            .source_artifact_key
            .rsplit('/')
            .next()
            .unwrap_or(&self.source_artifact_key);
        match basename.rfind('.') {
            Some(dot) => &basename[..dot],
            None => basename,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct JobBuilder => Job {
        set { id: JobId = JobId::new(1) }
        set { owner_id: UserId = UserId::new(1) }
        set { voice_ref_id: VoiceReferenceId = VoiceReferenceId::new(1) }
        into { source_artifact_key: String = "ingest/00000000-0000-0000-0000-000000000000.pptx" }
        option { result_artifact_key: String = None }
        set { status: JobStatus = JobStatus::Pending }
        into { stage: String = "pending" }
        option { slide_count: i32 = None }
        option { error: String = None }
        computed { created_at: DateTime<Utc> = Utc::now() }
        computed { updated_at: DateTime<Utc> = Utc::now() }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
