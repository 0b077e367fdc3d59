// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use deckcast_core::{Job, JobId, JobStatus, Task, TaskId, TaskKind, TaskStatus};

use super::*;
use crate::ports::fakes::{FakeBroker, FakeJobStore, FakeTaskStore};

fn harness() -> (Arc<FakeJobStore>, Arc<FakeTaskStore>, Arc<FakeBroker>) {
    (Arc::new(FakeJobStore::new()), Arc::new(FakeTaskStore::new()), Arc::new(FakeBroker::new()))
}

fn insert_task(task_store: &FakeTaskStore, task: Task) -> TaskId {
    task_store.insert_for_test(task)
}

#[tokio::test]
async fn cancels_every_non_terminal_task_and_the_job() {
    let (job_store, task_store, broker) = harness();
    let job = Job::builder().id(JobId::new(1)).status(JobStatus::Synthesizing).build();
    job_store.insert(job.clone());

    let running = insert_task(
        &task_store,
        Task {
            id: TaskId::new(10),
            job_id: job.id,
            kind: TaskKind::Synthesize,
            slide_index: Some(1),
            external_id: Some("77".to_string()),
            status: TaskStatus::Running,
            progress: None,
            error: None,
            started_at: None,
            completed_at: None,
        },
    );
    let pending = insert_task(
        &task_store,
        Task {
            id: TaskId::new(11),
            job_id: job.id,
            kind: TaskKind::Synthesize,
            slide_index: Some(2),
            external_id: None,
            status: TaskStatus::Pending,
            progress: None,
            error: None,
            started_at: None,
            completed_at: None,
        },
    );
    let already_done = insert_task(
        &task_store,
        Task {
            id: TaskId::new(12),
            job_id: job.id,
            kind: TaskKind::Synthesize,
            slide_index: Some(3),
            external_id: Some("78".to_string()),
            status: TaskStatus::Completed,
            progress: Some("synthesized".to_string()),
            error: None,
            started_at: None,
            completed_at: None,
        },
    );

    let canceller = Canceller::new(job_store.clone(), task_store.clone(), broker.clone());
    let outcome = canceller.cancel_job(job.id).await.unwrap();

    assert!(outcome.applied);
    assert_eq!(outcome.tasks_cancelled, 2);

    assert_eq!(task_store.get(running).unwrap().status, TaskStatus::Cancelled);
    assert_eq!(task_store.get(pending).unwrap().status, TaskStatus::Cancelled);
    assert_eq!(task_store.get(already_done).unwrap().status, TaskStatus::Completed);

    let job = job_store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Cancelled);

    let revoked = broker.revoked.lock();
    assert_eq!(revoked.len(), 1);
    assert_eq!(revoked[0].0, running);
    assert_eq!(revoked[0].1.as_deref(), Some("77"));
}

#[tokio::test]
async fn cancelling_an_already_terminal_job_is_a_noop() {
    let (job_store, task_store, broker) = harness();
    let job = Job::builder().id(JobId::new(2)).status(JobStatus::Completed).build();
    job_store.insert(job.clone());

    let canceller = Canceller::new(job_store.clone(), task_store.clone(), broker.clone());
    let outcome = canceller.cancel_job(job.id).await.unwrap();

    assert!(!outcome.applied);
    assert_eq!(outcome.tasks_cancelled, 0);
    assert!(broker.revoked.lock().is_empty());

    let job = job_store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
}

#[tokio::test]
async fn cancelling_an_unknown_job_fails() {
    let (job_store, task_store, broker) = harness();
    let canceller = Canceller::new(job_store, task_store, broker);
    let err = canceller.cancel_job(JobId::new(999)).await.unwrap_err();
    assert!(matches!(err, EngineError::JobNotFound(_)));
}
