// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use deckcast_core::{Classify, FailureKind};
use deckcast_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("queue error: {0}")]
    Queue(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl Classify for BrokerError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::Queue(_) => FailureKind::TransientInfrastructure,
            Self::Storage(e) => e.kind(),
        }
    }
}
