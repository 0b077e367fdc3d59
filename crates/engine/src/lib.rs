// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! deckcast-engine: the three worker bodies (C3 dispatcher, C4
//! barrier+assembler, C5 synthesis worker) plus the capability adapters
//! they're built from — slide-deck notes extraction, the slide-renderer
//! HTTP client, the TTS engines, and the video muxer.
//!
//! Every worker body is generic over the [`ports`] traits rather than the
//! concrete `deckcast-storage`/`deckcast-objectstore`/`deckcast-broker`
//! types, so the dispatcher/barrier/synthesis state machines are exercised
//! in tests against [`ports::fakes`] instead of live infrastructure.

pub mod assemble;
pub mod cancel;
pub mod deck;
pub mod dispatch;
pub mod error;
pub mod muxer;
pub mod ports;
pub mod renderer;
pub mod synthesize;

pub use assemble::{AssembleOutcome, Assembler};
pub use cancel::{CancelOutcome, Canceller};
pub use deck::{DeckError, DeckReader, PptxDeckReader};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::EngineError;
pub use muxer::{FfmpegMuxer, Muxer, SlidePair};
pub use renderer::{RendererClient, RendererError};
pub use synthesize::{Synthesizer, SynthesisOutcome, SynthesisWorker, SynthesizerError};
