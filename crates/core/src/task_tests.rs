// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn settled_covers_success_and_failure_and_cancellation() {
    assert!(TaskStatus::Completed.is_settled());
    assert!(TaskStatus::Failed.is_settled());
    assert!(TaskStatus::Cancelled.is_settled());
    assert!(!TaskStatus::Pending.is_settled());
    assert!(!TaskStatus::Running.is_settled());
}

#[test]
fn task_update_builder_sets_requested_fields_only() {
    let update = TaskUpdate::status(TaskStatus::Completed)
        .with_progress("synthesized")
        .with_external_id("ext-1");
    assert_eq!(update.status, Some(TaskStatus::Completed));
    assert_eq!(update.progress.as_deref(), Some("synthesized"));
    assert_eq!(update.external_id.as_deref(), Some("ext-1"));
    assert!(update.error.is_none());
}

#[test]
fn builder_defaults_to_pending_synthesize_task() {
    let task = Task::builder().build();
    assert_eq!(task.kind, TaskKind::Synthesize);
    assert_eq!(task.status, TaskStatus::Pending);
    assert!(task.slide_index.is_none());
}
