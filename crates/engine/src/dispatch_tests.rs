// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use deckcast_core::{Clock, FakeClock, Job, JobId, JobStatus};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::deck::{DeckError, DeckReader};
use crate::ports::fakes::{FakeBroker, FakeJobStore, FakeObjectStore, FakeTaskStore};

#[derive(Default)]
struct FakeDeckReader {
    notes: Vec<String>,
}

impl DeckReader for FakeDeckReader {
    fn extract_notes(&self, _bytes: &Bytes) -> Result<Vec<String>, DeckError> {
        Ok(self.notes.clone())
    }
}

fn harness() -> (
    Arc<FakeJobStore>,
    Arc<FakeTaskStore>,
    Arc<FakeObjectStore>,
    Arc<FakeBroker>,
    FakeClock,
) {
    (
        Arc::new(FakeJobStore::new()),
        Arc::new(FakeTaskStore::new()),
        Arc::new(FakeObjectStore::new()),
        Arc::new(FakeBroker::new()),
        FakeClock::new(),
    )
}

async fn mock_renderer(image_paths: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "image_paths": image_paths })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn happy_path_decomposes_and_enqueues_one_synth_task_per_slide() {
    let (job_store, task_store, object_store, broker, clock) = harness();
    let job = Job::builder()
        .id(JobId::new(1))
        .source_artifact_key("ingest/abc.pptx")
        .status(JobStatus::Pending)
        .build();
    job_store.insert(job.clone());
    object_store.insert("ingest", "abc.pptx", Bytes::from_static(b"pptx-bytes"));

    let server = mock_renderer(&["/presentations/abc/images/slide-1.png", "/presentations/abc/images/slide-2.png"]).await;
    let deck_reader = FakeDeckReader {
        notes: vec!["first slide".to_string(), "second slide".to_string()],
    };
    let dispatcher = Dispatcher::new(
        job_store.clone(),
        task_store.clone(),
        object_store.clone(),
        broker.clone(),
        deck_reader,
        RendererClient::new(server.uri()),
        Duration::from_secs(600),
    );

    let outcome = dispatcher.run(job.id, &clock).await.unwrap();
    assert_eq!(outcome.slide_count, 2);

    let updated = job_store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(updated.status, JobStatus::Synthesizing);
    assert_eq!(updated.slide_count, Some(2));

    assert!(object_store.get("presentations", "1/notes/slide_1.txt").await.is_ok());
    assert!(object_store.get("presentations", "1/notes/slide_2.txt").await.is_ok());

    let enqueued = broker.enqueued.lock();
    assert_eq!(enqueued.len(), 3);
    assert_eq!(enqueued[0].1, "synthesize_audio");
    assert_eq!(enqueued[1].1, "synthesize_audio");
    assert_eq!(enqueued[2].1, "assemble_video");
}

#[tokio::test]
async fn slide_count_mismatch_fails_the_job() {
    let (job_store, task_store, object_store, broker, clock) = harness();
    let job = Job::builder()
        .id(JobId::new(2))
        .source_artifact_key("ingest/mismatch.pptx")
        .status(JobStatus::Pending)
        .build();
    job_store.insert(job.clone());
    object_store.insert("ingest", "mismatch.pptx", Bytes::from_static(b"pptx-bytes"));

    // renderer only returns one image for two slides of notes.
    let server = mock_renderer(&["/presentations/mismatch/images/slide-1.png"]).await;
    let deck_reader = FakeDeckReader {
        notes: vec!["first".to_string(), "second".to_string()],
    };
    let dispatcher = Dispatcher::new(
        job_store.clone(),
        task_store,
        object_store,
        broker.clone(),
        deck_reader,
        RendererClient::new(server.uri()),
        Duration::from_secs(600),
    );

    let err = dispatcher.run(job.id, &clock).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::SlideCountMismatch { want: 2, got: 1 }
    ));

    let updated = job_store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(updated.status, JobStatus::Failed);
    assert!(updated.error.is_some());
    assert!(broker.enqueued.lock().is_empty());
}

#[tokio::test]
async fn a_job_already_in_a_terminal_state_is_a_no_op() {
    let (job_store, task_store, object_store, broker, clock) = harness();
    let job = Job::builder()
        .id(JobId::new(3))
        .source_artifact_key("ingest/done.pptx")
        .status(JobStatus::Completed)
        .build();
    job_store.insert(job.clone());

    let server = mock_renderer(&[]).await;
    let dispatcher = Dispatcher::new(
        job_store,
        task_store,
        object_store,
        broker.clone(),
        FakeDeckReader::default(),
        RendererClient::new(server.uri()),
        Duration::from_secs(600),
    );

    let outcome = dispatcher.run(job.id, &clock).await.unwrap();
    assert_eq!(outcome.slide_count, 0);
    assert!(broker.enqueued.lock().is_empty());
}

#[tokio::test]
async fn renderer_5xx_exhausts_retries_and_fails_the_job() {
    let (job_store, task_store, object_store, broker, clock) = harness();
    let job = Job::builder()
        .id(JobId::new(4))
        .source_artifact_key("ingest/down.pptx")
        .status(JobStatus::Pending)
        .build();
    job_store.insert(job.clone());
    object_store.insert("ingest", "down.pptx", Bytes::from_static(b"pptx-bytes"));

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let deck_reader = FakeDeckReader {
        notes: vec!["only slide".to_string()],
    };
    let dispatcher = Dispatcher::new(
        job_store.clone(),
        task_store,
        object_store,
        broker.clone(),
        deck_reader,
        RendererClient::new(server.uri()),
        Duration::from_secs(600),
    );

    let err = dispatcher.run(job.id, &clock).await.unwrap_err();
    assert!(matches!(err, EngineError::Renderer(_)));

    let updated = job_store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(updated.status, JobStatus::Failed);
    assert!(broker.enqueued.lock().is_empty());
}

#[tokio::test]
async fn cancellation_requested_mid_decompose_cancels_the_task_not_the_job() {
    let (job_store, task_store, object_store, broker, clock) = harness();
    let job = Job::builder()
        .id(JobId::new(5))
        .source_artifact_key("ingest/abc.pptx")
        .status(JobStatus::Pending)
        .build();
    job_store.insert(job.clone());
    object_store.insert("ingest", "abc.pptx", Bytes::from_static(b"pptx-bytes"));

    // `FakeTaskStore` hands out ids starting at 1; the decompose task
    // created by `run` below will be the first (and only) task, so its id
    // is known ahead of time.
    task_store.request_cancellation(deckcast_core::TaskId::new(1));

    let deck_reader = FakeDeckReader {
        notes: vec!["only slide".to_string()],
    };
    let dispatcher = Dispatcher::new(
        job_store.clone(),
        task_store.clone(),
        object_store,
        broker.clone(),
        deck_reader,
        RendererClient::new("http://unused.invalid".to_string()),
        Duration::from_secs(600),
    );

    let err = dispatcher.run(job.id, &clock).await.unwrap_err();
    assert!(matches!(err, EngineError::Cancelled));
    let task = task_store.get(deckcast_core::TaskId::new(1)).unwrap();
    assert_eq!(task.status, deckcast_core::TaskStatus::Cancelled);
}
