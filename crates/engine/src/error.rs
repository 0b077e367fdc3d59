// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker-body error boundary (spec §7): every crate's own
//! `thiserror::Error` enum composes upward into this one via `#[from]`,
//! mirroring the teacher's `ExecuteError` in `crates/engine/src/executor.rs`.

use deckcast_broker::BrokerError;
use deckcast_core::{Classify, FailureKind, JobId};
use deckcast_objectstore::ObjectStoreError;
use deckcast_storage::StorageError;
use thiserror::Error;

use crate::deck::DeckError;
use crate::muxer::MuxerError;
use crate::renderer::RendererError;
use crate::synthesize::SynthesizerError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Deck(#[from] DeckError),

    #[error(transparent)]
    ObjectStore(#[from] ObjectStoreError),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error(transparent)]
    Renderer(#[from] RendererError),

    #[error(transparent)]
    Synthesizer(#[from] SynthesizerError),

    #[error(transparent)]
    Muxer(#[from] MuxerError),

    #[error("job {0} not found")]
    JobNotFound(JobId),

    #[error("Mismatch: renderer returned {got} image paths for a {want}-slide deck")]
    SlideCountMismatch { want: usize, got: usize },

    #[error("missing audio for slide {0}")]
    MissingAudio(u32),

    #[error("synthesis timeout after {0}s")]
    SynthesisTimeout(u64),

    #[error("job was cancelled")]
    Cancelled,

    #[error("voice reference {0} not found")]
    VoiceReferenceNotFound(deckcast_core::VoiceReferenceId),

    #[error("voice reference {0} could not be resolved to a source")]
    MalformedVoiceReference(deckcast_core::VoiceReferenceId),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Classify for EngineError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::Storage(e) => e.kind(),
            Self::Deck(_) => FailureKind::InputInvalid,
            Self::ObjectStore(e) => e.kind(),
            Self::Broker(e) => e.kind(),
            Self::Renderer(e) => e.kind(),
            Self::Synthesizer(e) => e.kind(),
            Self::Muxer(e) => e.kind(),
            Self::JobNotFound(_)
            | Self::SlideCountMismatch { .. }
            | Self::MissingAudio(_)
            | Self::VoiceReferenceNotFound(_)
            | Self::MalformedVoiceReference(_) => FailureKind::InputInvalid,
            Self::SynthesisTimeout(_) => FailureKind::DeadlineExceeded,
            Self::Cancelled => FailureKind::Cancelled,
            Self::Io(_) => FailureKind::TransientInfrastructure,
        }
    }
}
