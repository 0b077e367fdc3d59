// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Barrier + Assembler (C4, spec §4.4): waits for the synthesis fan-out to
//! settle, then invokes the external muxer over the ordered slide
//! sequence.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use deckcast_core::{ArtifactPaths, CanonicalPath, Clock, JobId, JobStatus, TaskId, TaskKind};
use deckcast_storage::JobStatusUpdate;

use crate::error::EngineError;
use crate::muxer::{Muxer, SlidePair};
use crate::ports::{JobStorePort, ObjectStorePort, TaskStorePort};

/// Fixed barrier poll cadence (spec §4.4 Phase A).
const POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembleOutcome {
    pub slide_count: u32,
}

/// Runs the `assemble` task body (spec §4.4). Generic over the same ports
/// as [`crate::dispatch::Dispatcher`] plus a [`Muxer`].
pub struct Assembler<J, T, O, M, C> {
    job_store: Arc<J>,
    task_store: Arc<T>,
    object_store: Arc<O>,
    muxer: M,
    clock: C,
    work_dir: std::path::PathBuf,
}

impl<J, T, O, M, C> Assembler<J, T, O, M, C>
where
    J: JobStorePort,
    T: TaskStorePort,
    O: ObjectStorePort,
    M: Muxer,
    C: Clock,
{
    pub fn new(
        job_store: Arc<J>,
        task_store: Arc<T>,
        object_store: Arc<O>,
        muxer: M,
        clock: C,
    ) -> Self {
        Self {
            job_store,
            task_store,
            object_store,
            muxer,
            clock,
            work_dir: std::env::temp_dir(),
        }
    }

    pub fn with_work_dir(mut self, dir: std::path::PathBuf) -> Self {
        self.work_dir = dir;
        self
    }

    /// Runs Phase A (barrier) then Phase B (assembly) for `job_id`.
    /// `image_paths` is the renderer's ordered output carried on the
    /// assemble task's enqueue payload (spec §4.3 step 9); `expected_slides`
    /// is `J.slide_count` at dispatch time, used only to size the barrier
    /// poll; `deadline` is the absolute wall-clock cutoff computed by the
    /// dispatcher as `now + D`, and `deadline_secs` is that same `D` in
    /// seconds, carried alongside so the timeout error message can quote
    /// the configured limit verbatim (spec §8 scenario 3: `"synthesis
    /// timeout after 60"` for `ASSEMBLY_BARRIER_DEADLINE=60`).
    pub async fn run(
        &self,
        task_id: TaskId,
        job_id: JobId,
        image_paths: &[String],
        expected_slides: u32,
        deadline: DateTime<Utc>,
        deadline_secs: u64,
    ) -> Result<AssembleOutcome, EngineError> {
        self.task_store
            .update_task(
                deckcast_storage::TaskRef::Id(task_id),
                deckcast_core::TaskUpdate::status(deckcast_core::TaskStatus::Running),
            )
            .await?;

        match self
            .run_inner(task_id, job_id, image_paths, expected_slides, deadline, deadline_secs)
            .await
        {
            Ok(outcome) => {
                self.task_store
                    .update_task(
                        deckcast_storage::TaskRef::Id(task_id),
                        deckcast_core::TaskUpdate::status(deckcast_core::TaskStatus::Completed)
                            .with_progress("assembled"),
                    )
                    .await?;
                Ok(outcome)
            }
            Err(EngineError::Cancelled) => {
                let _ = self
                    .task_store
                    .update_task(
                        deckcast_storage::TaskRef::Id(task_id),
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
                        deckcast_storage::TaskRef::Id(task_id),
                        deckcast_core::TaskUpdate::status(deckcast_core::TaskStatus::Failed)
                            .with_error(message.clone()),
                    )
                    .await;
                // Phase A's deadline branch and Phase B's per-slide
                // failures each already write their own specific job error
                // (spec §4.4); this catches anything else (muxer/upload
                // failures) and fails the job generically, per §7's
                // propagation policy.
                if !matches!(e, EngineError::SynthesisTimeout(_) | EngineError::MissingAudio(_)) {
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
                }
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

    async fn run_inner(
        &self,
        task_id: TaskId,
        job_id: JobId,
        image_paths: &[String],
        expected_slides: u32,
        deadline: DateTime<Utc>,
        deadline_secs: u64,
    ) -> Result<AssembleOutcome, EngineError> {
        self.barrier(task_id, job_id, expected_slides, deadline, deadline_secs).await?;

        let job = self
            .job_store
            .get_job(job_id)
            .await?
            .ok_or(EngineError::JobNotFound(job_id))?;
        if job.status == JobStatus::Cancelled {
            return Err(EngineError::Cancelled);
        }
        if job.status.is_terminal() {
            return Ok(AssembleOutcome { slide_count: expected_slides });
        }
        self.check_cancellation(task_id).await?;

        self.job_store
            .set_job_status(
                job_id,
                JobStatus::Assembling,
                JobStatusUpdate {
                    stage: Some("assembling".to_string()),
                    ..Default::default()
                },
            )
            .await?;

        let job_uuid = job.source_uuid().to_string();
        let workspace = self.work_dir.join(format!("assemble-{job_id}"));
        tokio::fs::create_dir_all(&workspace).await?;

        let mut pairs = Vec::with_capacity(image_paths.len());
        for (index, image_path) in image_paths.iter().enumerate() {
            let slide_index = index as u32 + 1;

            let image_canonical = CanonicalPath::parse(image_path)
                .ok_or(EngineError::MissingAudio(slide_index))?;
            let image_bytes = self
                .object_store
                .get(&image_canonical.bucket, &image_canonical.key)
                .await?;
            let local_image = workspace.join(format!("slide-{slide_index}.png"));
            tokio::fs::write(&local_image, &image_bytes).await?;

            let audio_path = ArtifactPaths::audio(&job_uuid, slide_index);
            let audio_bytes = match self
                .object_store
                .get(&audio_path.bucket, &audio_path.key)
                .await
            {
                Ok(bytes) => bytes,
                Err(_) => {
                    let message = format!("missing audio for slide {slide_index}");
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
                    return Err(EngineError::MissingAudio(slide_index));
                }
            };
            let local_audio = workspace.join(format!("slide-{slide_index}.wav"));
            tokio::fs::write(&local_audio, &audio_bytes).await?;

            pairs.push(SlidePair {
                image_path: local_image,
                audio_path: local_audio,
            });
        }

        let local_output = workspace.join("output.mp4");
        self.muxer.mux(&pairs, &local_output).await?;

        let output_bytes = tokio::fs::read(&local_output).await?;
        let output_path = ArtifactPaths::output(job_id);
        self.object_store
            .put(&output_path.bucket, &output_path.key, output_bytes.into())
            .await?;

        let _ = tokio::fs::remove_dir_all(&workspace).await;

        self.job_store
            .set_job_status(
                job_id,
                JobStatus::Completed,
                JobStatusUpdate {
                    stage: Some("completed".to_string()),
                    result_key: Some(output_path.render()),
                    ..Default::default()
                },
            )
            .await?;

        Ok(AssembleOutcome { slide_count: expected_slides })
    }

    /// Phase A (spec §4.4): poll every [`POLL_INTERVAL`] until every
    /// `synthesize` task for `job_id` has settled or `deadline` passes.
    /// The deadline check is clock-based, never iteration-count based
    /// (spec §9).
    async fn barrier(
        &self,
        task_id: TaskId,
        job_id: JobId,
        expected_slides: u32,
        deadline: DateTime<Utc>,
        deadline_secs: u64,
    ) -> Result<(), EngineError> {
        loop {
            self.check_cancellation(task_id).await?;

            let tasks = self.task_store.list_tasks(job_id).await?;
            let synth_tasks: Vec<_> = tasks
                .iter()
                .filter(|t| t.kind == TaskKind::Synthesize)
                .collect();

            let all_settled = synth_tasks.len() as u32 >= expected_slides
                && synth_tasks.iter().all(|t| t.status.is_settled());
            if all_settled {
                return Ok(());
            }

            if self.clock.utc_now() > deadline {
                let message = format!("synthesis timeout after {deadline_secs}s");
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
                return Err(EngineError::SynthesisTimeout(deadline_secs));
            }

            self.clock.sleep(POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
#[path = "assemble_tests.rs"]
mod tests;
