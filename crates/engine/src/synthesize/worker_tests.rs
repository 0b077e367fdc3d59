// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ports::fakes::{
    new_voice_reference, FakeJobStore, FakeObjectStore, FakeSynthesizer, FakeTaskStore,
    FakeVoiceReferenceStore,
};
use deckcast_core::{Job, JobId, TaskKind, TaskStatus, VoiceReferenceId};
use std::time::Duration;

fn harness() -> (
    Arc<FakeJobStore>,
    Arc<FakeTaskStore>,
    Arc<FakeObjectStore>,
    Arc<FakeVoiceReferenceStore>,
) {
    (
        Arc::new(FakeJobStore::new()),
        Arc::new(FakeTaskStore::new()),
        Arc::new(FakeObjectStore::new()),
        Arc::new(FakeVoiceReferenceStore::new()),
    )
}

fn worker<S: Synthesizer>(
    job_store: Arc<FakeJobStore>,
    task_store: Arc<FakeTaskStore>,
    object_store: Arc<FakeObjectStore>,
    voice_store: Arc<FakeVoiceReferenceStore>,
    synthesizer: S,
) -> SynthesisWorker<FakeJobStore, FakeTaskStore, FakeObjectStore, FakeVoiceReferenceStore, S> {
    SynthesisWorker::new(
        job_store,
        task_store,
        object_store,
        voice_store,
        synthesizer,
        Duration::from_secs(300),
        Duration::from_secs(360),
    )
}

#[tokio::test]
async fn primary_tier_succeeds_with_a_cloned_reference() {
    let (job_store, task_store, object_store, voice_store) = harness();
    let job = Job::builder()
        .id(JobId::new(1))
        .voice_ref_id(VoiceReferenceId::new(1))
        .source_artifact_key("ingest/abc.pptx")
        .build();
    job_store.insert(job.clone());
    voice_store.insert(new_voice_reference(VoiceReferenceId::new(1), "voice-clones/ref.wav"));
    object_store.insert("voice-clones", "ref.wav", Bytes::from_static(b"reference-audio"));
    object_store.insert("presentations", "1/notes/slide_1.txt", Bytes::from_static(b"Hello"));

    let task = task_store.create_task(job.id, TaskKind::Synthesize, Some(1), None).await.unwrap();
    let w = worker(job_store, task_store.clone(), object_store.clone(), voice_store, FakeSynthesizer::new());
    let outcome = w.run(task.id, job.id, 1).await.unwrap();
    assert_eq!(outcome, SynthesisOutcome::Primary);

    let updated = task_store.get(task.id).unwrap();
    assert_eq!(updated.status, TaskStatus::Completed);
    assert_eq!(updated.progress.as_deref(), Some("synthesized"));
    assert!(object_store.get("presentations", "abc/audio/slide_1.wav").await.is_ok());
}

#[tokio::test]
async fn primary_failure_falls_back_to_base_tier() {
    let (job_store, task_store, object_store, voice_store) = harness();
    let job = Job::builder()
        .id(JobId::new(2))
        .voice_ref_id(VoiceReferenceId::new(2))
        .source_artifact_key("ingest/xyz.pptx")
        .build();
    job_store.insert(job.clone());
    voice_store.insert(new_voice_reference(VoiceReferenceId::new(2), "voice-clones/ref.wav"));
    object_store.insert("voice-clones", "ref.wav", Bytes::from_static(b"reference-audio"));
    object_store.insert("presentations", "2/notes/slide_2.txt", Bytes::from_static(b"Goodbye"));

    let task = task_store.create_task(job.id, TaskKind::Synthesize, Some(2), None).await.unwrap();
    let synthesizer = FakeSynthesizer::new().failing_reference();
    let w = worker(job_store, task_store.clone(), object_store, voice_store, synthesizer);
    let outcome = w.run(task.id, job.id, 2).await.unwrap();
    assert_eq!(outcome, SynthesisOutcome::Fallback);

    let updated = task_store.get(task.id).unwrap();
    assert_eq!(updated.progress.as_deref(), Some("fallback: base"));
}

#[tokio::test]
async fn builtin_voice_reference_skips_cloning_tier() {
    let (job_store, task_store, object_store, voice_store) = harness();
    let job = Job::builder()
        .id(JobId::new(3))
        .voice_ref_id(VoiceReferenceId::new(3))
        .source_artifact_key("ingest/builtin.pptx")
        .build();
    job_store.insert(job.clone());
    voice_store.insert(new_voice_reference(VoiceReferenceId::new(3), "builtin://en-default"));
    object_store.insert("presentations", "3/notes/slide_1.txt", Bytes::from_static(b"Hi"));

    let task = task_store.create_task(job.id, TaskKind::Synthesize, Some(1), None).await.unwrap();
    let synthesizer = FakeSynthesizer::new();
    let w = worker(job_store, task_store, object_store, voice_store, synthesizer);
    let outcome = w.run(task.id, job.id, 1).await.unwrap();
    assert_eq!(outcome, SynthesisOutcome::Fallback);
}

#[tokio::test]
async fn empty_notes_substitute_silence_sentinel() {
    let (job_store, task_store, object_store, voice_store) = harness();
    let job = Job::builder()
        .id(JobId::new(4))
        .voice_ref_id(VoiceReferenceId::new(4))
        .source_artifact_key("ingest/quiet.pptx")
        .build();
    job_store.insert(job.clone());
    voice_store.insert(new_voice_reference(VoiceReferenceId::new(4), "builtin://en-default"));
    object_store.insert("presentations", "4/notes/slide_1.txt", Bytes::from_static(b"   "));

    let task = task_store.create_task(job.id, TaskKind::Synthesize, Some(1), None).await.unwrap();
    let synthesizer = FakeSynthesizer::new().failing_base();
    let w = worker(job_store, task_store.clone(), object_store, voice_store, synthesizer);
    let outcome = w.run(task.id, job.id, 1).await.unwrap();
    assert_eq!(outcome, SynthesisOutcome::Silence);
    let updated = task_store.get(task.id).unwrap();
    assert_eq!(updated.status, TaskStatus::Completed);
    assert_eq!(updated.progress.as_deref(), Some("fallback: silence"));
}

#[tokio::test]
async fn job_not_found_fails_the_task() {
    let (job_store, task_store, object_store, voice_store) = harness();
    let task = task_store
        .create_task(JobId::new(99), TaskKind::Synthesize, Some(1), None)
        .await
        .unwrap();
    let w = worker(job_store, task_store.clone(), object_store, voice_store, FakeSynthesizer::new());
    let err = w.run(task.id, JobId::new(99), 1).await.unwrap_err();
    assert!(matches!(err, EngineError::JobNotFound(_)));
    let updated = task_store.get(task.id).unwrap();
    assert_eq!(updated.status, TaskStatus::Failed);
}

#[tokio::test]
async fn cooperative_cancellation_is_observed_between_steps() {
    let (job_store, task_store, object_store, voice_store) = harness();
    let job = Job::builder()
        .id(JobId::new(5))
        .voice_ref_id(VoiceReferenceId::new(5))
        .source_artifact_key("ingest/cancel.pptx")
        .build();
    job_store.insert(job.clone());
    voice_store.insert(new_voice_reference(VoiceReferenceId::new(5), "builtin://en-default"));

    let task = task_store.create_task(job.id, TaskKind::Synthesize, Some(1), None).await.unwrap();
    task_store.request_cancellation(task.id);
    let w = worker(job_store, task_store.clone(), object_store, voice_store, FakeSynthesizer::new());
    let err = w.run(task.id, job.id, 1).await.unwrap_err();
    assert!(matches!(err, EngineError::Cancelled));
    let updated = task_store.get(task.id).unwrap();
    assert_eq!(updated.status, TaskStatus::Cancelled);
}
