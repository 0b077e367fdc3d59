// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! deckcast-storage: relational persistence for jobs, tasks, and voice
//! references (spec §4.1's Job Store), backed by `sqlx`/PostgreSQL.

pub mod error;
pub mod jobs;
pub mod tasks;
pub mod voices;

pub use error::StorageError;
pub use jobs::{JobPage, JobStatusUpdate, JobStore, SetStatusOutcome};
pub use tasks::{TaskRef, TaskStore};
pub use voices::VoiceReferenceStore;

/// Embedded migrations, run with `MIGRATOR.run(&pool)` at daemon startup
/// (spec §3: "Migrations ... run with `sqlx::migrate!` at daemon startup").
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
