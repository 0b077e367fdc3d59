// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher (C3, spec §4.3): decomposes a job's source deck into
//! per-slide synthesize tasks, then enqueues the assemble task that will
//! wait on them.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use deckcast_core::{ArtifactPaths, CanonicalPath, Clock, JobId, JobStatus, TaskId, TaskKind};
use deckcast_storage::JobStatusUpdate;
use serde_json::json;

use crate::deck::DeckReader;
use crate::error::EngineError;
use crate::ports::{BrokerPort, JobStorePort, ObjectStorePort, TaskStorePort};
use crate::renderer::RendererClient;

/// What [`Dispatcher::run`] accomplished. Errors are reported via `Err`
/// after the decompose task and job have already been marked failed
/// (spec §4.3 step "any exception ... causes: mark decompose task
/// failed ... transition J -> failed").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub slide_count: u32,
}

/// Decomposes job `J` (spec §4.3). Generic over the storage/broker ports
/// so the whole decompose->fan-out sequence is exercised against
/// in-memory fakes (`crate::ports::fakes`) rather than live infrastructure.
pub struct Dispatcher<J, T, O, B, D> {
    job_store: Arc<J>,
    task_store: Arc<T>,
    object_store: Arc<O>,
    broker: Arc<B>,
    deck_reader: D,
    renderer: RendererClient,
    assembly_barrier_deadline: Duration,
}

impl<J, T, O, B, D> Dispatcher<J, T, O, B, D>
where
    J: JobStorePort,
    T: TaskStorePort,
    O: ObjectStorePort,
    B: BrokerPort,
    D: DeckReader,
{
    pub fn new(
        job_store: Arc<J>,
        task_store: Arc<T>,
        object_store: Arc<O>,
        broker: Arc<B>,
        deck_reader: D,
        renderer: RendererClient,
        assembly_barrier_deadline: Duration,
    ) -> Self {
        Self {
            job_store,
            task_store,
            object_store,
            broker,
            deck_reader,
            renderer,
            assembly_barrier_deadline,
        }
    }

    /// Runs the decompose task body for `job_id` against a [`Clock`] used
    /// only to compute the assemble task's barrier deadline — the barrier
    /// itself lives in [`crate::assemble::Assembler`].
    pub async fn run<C: Clock>(
        &self,
        job_id: JobId,
        clock: &C,
    ) -> Result<DispatchOutcome, EngineError> {
        let task = self
            .task_store
            .create_task(job_id, TaskKind::Decompose, None, None)
            .await?;
        self.task_store
            .update_task(
                deckcast_storage::TaskRef::Id(task.id),
                deckcast_core::TaskUpdate::status(deckcast_core::TaskStatus::Running),
            )
            .await?;

        match self.run_inner(task.id, job_id, clock).await {
            Ok(outcome) => {
                self.task_store
                    .update_task(
                        deckcast_storage::TaskRef::Id(task.id),
                        deckcast_core::TaskUpdate::status(deckcast_core::TaskStatus::Completed)
                            .with_progress(format!("decomposed {} slides", outcome.slide_count)),
                    )
                    .await?;
                Ok(outcome)
            }
            Err(EngineError::Cancelled) => {
                // The job is already terminal by the time a cancellation
                // is observed here (spec §5's `Canceller` transitions it
                // before a running worker can next poll), so only this
                // task's own row needs to settle.
                let _ = self
                    .task_store
                    .update_task(
                        deckcast_storage::TaskRef::Id(task.id),
                        deckcast_core::TaskUpdate::status(deckcast_core::TaskStatus::Cancelled),
                    )
                    .await;
                Err(EngineError::Cancelled)
            }
            Err(e) => {
                let message = e.to_string();
                let _ = self
                    .task_store
                    .update_task(
                        deckcast_storage::TaskRef::Id(task.id),
                        deckcast_core::TaskUpdate::status(deckcast_core::TaskStatus::Failed)
                            .with_error(message.clone()),
                    )
                    .await;
                let _ = self
                    .job_store
                    .set_job_status(
                        job_id,
                        JobStatus::Failed,
                        JobStatusUpdate {
                            error: Some(message),
                            ..Default::default()
                        },
                    )
                    .await;
                Err(e)
            }
        }
    }

    async fn check_cancellation(&self, task_id: TaskId) -> Result<(), EngineError> {
        if self.task_store.is_cancellation_requested(task_id).await? {
            return Err(EngineError::Cancelled);
        }
        Ok(())
    }

    async fn run_inner<C: Clock>(
        &self,
        task_id: TaskId,
        job_id: JobId,
        clock: &C,
    ) -> Result<DispatchOutcome, EngineError> {
        let job = self
            .job_store
            .get_job(job_id)
            .await?
            .ok_or(EngineError::JobNotFound(job_id))?;
        if job.status.is_terminal() {
            return Ok(DispatchOutcome { slide_count: 0 });
        }

        self.job_store
            .set_job_status(
                job_id,
                JobStatus::Decomposing,
                JobStatusUpdate {
                    stage: Some("decomposing".to_string()),
                    ..Default::default()
                },
            )
            .await?;
        self.check_cancellation(task_id).await?;

        let source_path = CanonicalPath::parse(&job.source_artifact_key)
            .ok_or_else(|| EngineError::MissingAudio(0))?;
        let source_bytes = self
            .object_store
            .get(&source_path.bucket, &source_path.key)
            .await?;

        // one entry per slide, in presentation order, `""` for a slide
        // with no notes part (see `DeckReader::extract_notes`) — so this
        // is the deck's actual slide count, matching what the renderer is
        // about to report independently in `image_paths.len()` below.
        let notes = self.deck_reader.extract_notes(&source_bytes)?;
        let slide_count = notes.len() as u32;

        for (index, note) in notes.iter().enumerate() {
            let slide_index = index as u32 + 1;
            let path = ArtifactPaths::notes(job_id, slide_index);
            self.object_store
                .put(&path.bucket, &path.key, note.clone().into())
                .await?;
        }

        self.job_store
            .set_job_status(
                job_id,
                JobStatus::Decomposing,
                JobStatusUpdate {
                    slide_count: Some(slide_count as i32),
                    ..Default::default()
                },
            )
            .await?;

        let image_paths = self
            .renderer
            .convert(&source_path.bucket, &source_path.key)
            .await?;

        if image_paths.len() as u32 != slide_count {
            return Err(EngineError::SlideCountMismatch {
                want: slide_count as usize,
                got: image_paths.len(),
            });
        }
        self.check_cancellation(task_id).await?;

        let mut synth_external_ids = Vec::with_capacity(slide_count as usize);
        for slide_index in 1..=slide_count {
            let synth_task = self
                .task_store
                .create_task(job_id, TaskKind::Synthesize, Some(slide_index as i32), None)
                .await?;
            let external_id = self
                .broker
                .enqueue(
                    deckcast_broker::Queue::Gpu,
                    "synthesize_audio",
                    json!({ "job_id": job_id, "slide_index": slide_index }),
                    Some(synth_task.id),
                )
                .await?;
            self.task_store
                .update_task(
                    deckcast_storage::TaskRef::Id(synth_task.id),
                    deckcast_core::TaskUpdate::default().with_external_id(external_id.clone()),
                )
                .await?;
            synth_external_ids.push(external_id);
        }

        self.job_store
            .set_job_status(
                job_id,
                JobStatus::Synthesizing,
                JobStatusUpdate {
                    stage: Some("synthesizing".to_string()),
                    ..Default::default()
                },
            )
            .await?;

        let assemble_task = self
            .task_store
            .create_task(job_id, TaskKind::Assemble, None, None)
            .await?;
        let deadline = deadline_after(clock, self.assembly_barrier_deadline);
        let assemble_external_id = self
            .broker
            .enqueue(
                deckcast_broker::Queue::Cpu,
                "assemble_video",
                json!({
                    "job_id": job_id,
                    "task_id": assemble_task.id,
                    "image_paths": image_paths,
                    "expected_slides": slide_count,
                    "deadline": deadline,
                    "deadline_secs": self.assembly_barrier_deadline.as_secs(),
                }),
                Some(assemble_task.id),
            )
            .await?;
        self.task_store
            .update_task(
                deckcast_storage::TaskRef::Id(assemble_task.id),
                deckcast_core::TaskUpdate::default().with_external_id(assemble_external_id),
            )
            .await?;

        Ok(DispatchOutcome { slide_count })
    }
}

fn deadline_after<C: Clock>(clock: &C, ttl: Duration) -> DateTime<Utc> {
    clock.utc_now()
        + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(600))
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
