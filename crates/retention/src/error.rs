// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use deckcast_core::{Classify, FailureKind};
use deckcast_objectstore::ObjectStoreError;
use deckcast_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetentionError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    ObjectStore(#[from] ObjectStoreError),
}

impl Classify for RetentionError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::Storage(e) => e.kind(),
            Self::ObjectStore(e) => e.kind(),
        }
    }
}
