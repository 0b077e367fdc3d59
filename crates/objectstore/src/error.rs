// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use deckcast_core::{Classify, FailureKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("malformed canonical path: {0}")]
    MalformedPath(String),

    #[error("put failed: {0}")]
    Put(String),

    #[error("get failed: {0}")]
    Get(String),

    #[error("stat failed: {0}")]
    Stat(String),

    #[error("list failed: {0}")]
    List(String),

    #[error("delete failed: {0}")]
    Delete(String),
}

impl Classify for ObjectStoreError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound { .. } | Self::MalformedPath(_) => FailureKind::InputInvalid,
            Self::Put(_) | Self::Get(_) | Self::Stat(_) | Self::List(_) | Self::Delete(_) => {
                FailureKind::TransientInfrastructure
            }
        }
    }
}
