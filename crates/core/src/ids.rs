// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Primary-key identifiers for the four data-model entities (spec §3).
//!
//! All four are monotonic integers assigned by the relational store, so
//! they share the same [`crate::define_id!`] shape rather than each hand
//! rolling `Display`/`sqlx` impls.

crate::define_id! {
    /// Primary key of a [`crate::job::Job`]. Visible to clients.
    pub struct JobId;
}

crate::define_id! {
    /// Primary key of a [`crate::task::Task`].
    pub struct TaskId;
}

crate::define_id! {
    /// Opaque foreign key to a user record owned outside the engine.
    pub struct UserId;
}

crate::define_id! {
    /// Primary key of a [`crate::voice::VoiceReference`].
    pub struct VoiceReferenceId;
}
