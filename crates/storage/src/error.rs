// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use deckcast_core::{Classify, FailureKind, JobId, TaskId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("job {0} not found")]
    JobNotFound(JobId),

    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("task with external id {0:?} not found")]
    TaskExternalIdNotFound(String),
}

impl Classify for StorageError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::Database(_) => FailureKind::TransientInfrastructure,
            Self::JobNotFound(_) | Self::TaskNotFound(_) | Self::TaskExternalIdNotFound(_) => {
                FailureKind::InputInvalid
            }
        }
    }
}
