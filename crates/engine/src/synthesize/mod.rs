// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synthesis Worker (C5, spec §4.5): per-slide TTS with a tiered fallback
//! chain, soft/hard time limits, and cooperative cancellation.

mod chatterbox;
mod fishspeech;
mod melotts;
mod neuphonic;
mod trim;
mod wav;
mod worker;

pub use chatterbox::ChatterboxSynthesizer;
pub use fishspeech::FishSpeechSynthesizer;
pub use melotts::MeloTtsSynthesizer;
pub use neuphonic::NeuphonicSynthesizer;
pub use trim::trim_reference;
pub use worker::{SynthesisOutcome, SynthesisWorker};

use bytes::Bytes;
use deckcast_core::{Classify, FailureKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthesizerError {
    #[error("engine request failed: {0}")]
    Request(String),

    #[error("voice cloning is not supported by this engine")]
    CloningUnsupported,
}

impl Classify for SynthesizerError {
    fn kind(&self) -> FailureKind {
        match self {
            Self::Request(_) => FailureKind::DependencyDegraded,
            Self::CloningUnsupported => FailureKind::DependencyDegraded,
        }
    }
}

/// The abstract TTS capability (spec §6): concrete engines are selected by
/// `TTS_ENGINE`. Only [`MeloTtsSynthesizer`] guarantees
/// `synthesize_with_reference`; the others return
/// [`SynthesizerError::CloningUnsupported`], forcing the fallback chain to
/// the secondary tier (spec §4.5.2).
#[async_trait::async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize_with_reference(
        &self,
        text: &str,
        ref_bytes: &Bytes,
        ref_ext: &str,
        speed: f32,
        pitch: f32,
    ) -> Result<Bytes, SynthesizerError>;

    async fn synthesize_base(
        &self,
        text: &str,
        speed: f32,
        pitch: f32,
    ) -> Result<Bytes, SynthesizerError>;

    /// Tier 3 of the fallback chain (spec §4.5.2): "algebraic" silence that
    /// cannot fail absent a filesystem fault. The default is shared across
    /// every adapter; none need a model round-trip to produce it.
    async fn synthesize_silence(&self, seconds: f32) -> Result<Bytes, SynthesizerError> {
        Ok(wav::silence(seconds))
    }
}

/// Lets a worker be generic over `S: Synthesizer` while the concrete
/// engine is chosen at runtime from `TTS_ENGINE` (`deckcast-daemon`'s
/// wiring boxes whichever adapter it constructs into this).
#[async_trait::async_trait]
impl Synthesizer for Box<dyn Synthesizer> {
    async fn synthesize_with_reference(
        &self,
        text: &str,
        ref_bytes: &Bytes,
        ref_ext: &str,
        speed: f32,
        pitch: f32,
    ) -> Result<Bytes, SynthesizerError> {
        (**self).synthesize_with_reference(text, ref_bytes, ref_ext, speed, pitch).await
    }

    async fn synthesize_base(
        &self,
        text: &str,
        speed: f32,
        pitch: f32,
    ) -> Result<Bytes, SynthesizerError> {
        (**self).synthesize_base(text, speed, pitch).await
    }

    async fn synthesize_silence(&self, seconds: f32) -> Result<Bytes, SynthesizerError> {
        (**self).synthesize_silence(seconds).await
    }
}

/// Exposes the tier-3 silence writer to `ports::fakes` without making the
/// `wav` module itself public API.
#[cfg(any(test, feature = "test-support"))]
pub fn silence_wav(seconds: f32) -> Bytes {
    wav::silence(seconds)
}
