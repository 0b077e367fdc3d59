// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use deckcast_core::{Clock, FakeClock, Job, JobId, JobStatus};

use super::*;
use crate::ports::fakes::{FakeJobStore, FakeObjectStore};

fn seed_completed_job(jobs: &FakeJobStore, id: i64, age_days: i64, clock: &FakeClock) {
    let mut job = Job::builder()
        .id(JobId::new(id))
        .status(JobStatus::Completed)
        .source_artifact_key(format!("ingest/uuid-{id}.pptx"))
        .result_artifact_key(format!("/output/{id}.mp4"))
        .build();
    job.created_at = clock.utc_now() - Duration::days(age_days);
    jobs.insert(job);
}

#[tokio::test]
async fn preview_returns_only_jobs_older_than_cutoff_and_matching_status() {
    let clock = FakeClock::new();
    let jobs = Arc::new(FakeJobStore::new());
    seed_completed_job(&jobs, 1, 10, &clock);
    seed_completed_job(&jobs, 2, 3, &clock);
    let objects = Arc::new(FakeObjectStore::new());
    let service = RetentionService::new(jobs, objects, clock);

    let preview = service.preview(7, &DEFAULT_STATUS_FILTER).await.unwrap();

    assert_eq!(preview.count, 1);
    assert_eq!(preview.jobs[0].id, JobId::new(1));
}

#[tokio::test]
async fn preview_never_includes_active_jobs_even_if_old() {
    let clock = FakeClock::new();
    let jobs = Arc::new(FakeJobStore::new());
    let mut active = Job::builder().id(JobId::new(3)).status(JobStatus::Synthesizing).build();
    active.created_at = clock.utc_now() - Duration::days(999);
    jobs.insert(active);
    let objects = Arc::new(FakeObjectStore::new());
    let service = RetentionService::new(jobs, objects, clock);

    let preview = service.preview(7, &DEFAULT_STATUS_FILTER).await.unwrap();

    assert_eq!(preview.count, 0);
}

#[tokio::test]
async fn delete_old_removes_job_row_and_every_artifact_prefix() {
    let clock = FakeClock::new();
    let jobs = Arc::new(FakeJobStore::new());
    seed_completed_job(&jobs, 42, 10, &clock);
    let objects = Arc::new(FakeObjectStore::new());
    objects.put("ingest", "uuid-42.pptx");
    objects.put("output", "42.mp4");
    objects.put("presentations", "uuid-42/images/slide-1.png");
    objects.put("presentations", "uuid-42/audio/slide_1.wav");
    objects.put("presentations", "42/notes/slide_1.txt");

    let service = RetentionService::new(jobs.clone(), objects.clone(), clock);
    let summary = service.delete_old(7, &DEFAULT_STATUS_FILTER).await.unwrap();

    assert_eq!(summary.jobs_deleted, 1);
    assert!(summary.errors.is_empty());
    assert!(!jobs.contains(JobId::new(42)));
    assert!(!objects.exists("ingest", "uuid-42.pptx"));
    assert!(!objects.exists("output", "42.mp4"));
    assert!(!objects.exists("presentations", "uuid-42/images/slide-1.png"));
    assert!(!objects.exists("presentations", "uuid-42/audio/slide_1.wav"));
    assert!(!objects.exists("presentations", "42/notes/slide_1.txt"));
}

#[tokio::test]
async fn delete_old_sweeps_prefixes_in_spec_order() {
    let clock = FakeClock::new();
    let jobs = Arc::new(FakeJobStore::new());
    seed_completed_job(&jobs, 7, 10, &clock);
    let objects = Arc::new(FakeObjectStore::new());

    let service = RetentionService::new(jobs, objects.clone(), clock);
    service.delete_old(7, &DEFAULT_STATUS_FILTER).await.unwrap();

    let prefixes = objects.deleted_prefixes();
    assert_eq!(
        prefixes,
        vec![
            ("presentations".to_string(), "7/audio/".to_string()),
            ("presentations".to_string(), "7/notes/".to_string()),
            ("presentations".to_string(), "uuid-7/images/".to_string()),
            ("presentations".to_string(), "uuid-7/".to_string()),
        ]
    );
}

#[tokio::test]
async fn delete_specific_ignores_age_and_status() {
    let clock = FakeClock::new();
    let jobs = Arc::new(FakeJobStore::new());
    let job = Job::builder().id(JobId::new(5)).status(JobStatus::Synthesizing).build();
    jobs.insert(job);
    let objects = Arc::new(FakeObjectStore::new());

    let service = RetentionService::new(jobs.clone(), objects, clock);
    let summary = service.delete_specific(&[JobId::new(5)]).await.unwrap();

    assert_eq!(summary.jobs_deleted, 1);
    assert!(!jobs.contains(JobId::new(5)));
}

#[tokio::test]
async fn delete_specific_on_unknown_id_is_a_no_op_not_an_error() {
    let clock = FakeClock::new();
    let jobs = Arc::new(FakeJobStore::new());
    let objects = Arc::new(FakeObjectStore::new());
    let service = RetentionService::new(jobs, objects, clock);

    let summary = service.delete_specific(&[JobId::new(999)]).await.unwrap();

    assert_eq!(summary.jobs_deleted, 0);
    assert!(summary.errors.is_empty());
}

#[tokio::test]
async fn delete_old_on_empty_store_returns_zero_without_error() {
    let clock = FakeClock::new();
    let jobs = Arc::new(FakeJobStore::new());
    let objects = Arc::new(FakeObjectStore::new());
    let service = RetentionService::new(jobs, objects, clock);

    let summary = service.delete_old(7, &DEFAULT_STATUS_FILTER).await.unwrap();

    assert_eq!(summary.jobs_deleted, 0);
    assert_eq!(summary.artifacts_deleted, 0);
    assert!(summary.errors.is_empty());
}
