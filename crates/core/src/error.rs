// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The failure taxonomy shared across crates (spec §7). Each downstream
//! crate defines its own `thiserror::Error` enum at its own boundary
//! (`StorageError`, `ObjectStoreError`, ...); this one classifies them so
//! worker bodies can decide retry vs. terminal-failure without matching on
//! every concrete variant.

/// Coarse failure kind, independent of which crate raised the error.
/// Mirrors spec §7's six-item taxonomy (kind 6, "programmer error", has no
/// variant here — it surfaces as an unmatched `Err` that the worker body's
/// catch-all converts directly to a task/job failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Broker unreachable, object-store 5xx, DB deadlock: recovered by
    /// bounded retry, surfaced only after exhaustion.
    TransientInfrastructure,
    /// Bad file type, slide/image count mismatch, missing notes file:
    /// non-retryable, job transitions to `failed`.
    InputInvalid,
    /// Primary synthesis engine error: recovered by the fallback chain,
    /// never fails the job on its own.
    DependencyDegraded,
    /// Synthesis hard limit or barrier deadline: terminal, no retry.
    DeadlineExceeded,
    /// Client-initiated cancellation: terminal, propagates to all live
    /// tasks.
    Cancelled,
}

/// Implemented by each crate's error enum so generic retry/propagation code
/// can ask "should I retry this" without depending on the concrete type.
pub trait Classify {
    fn kind(&self) -> FailureKind;

    fn is_retryable(&self) -> bool {
        self.kind() == FailureKind::TransientInfrastructure
    }
}
