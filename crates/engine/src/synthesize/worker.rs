// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synthesis Worker (C5, spec §4.5): per-slide TTS against the resolved
//! voice reference, with soft/hard time limits and the tiered fallback
//! chain {cloned, base, silence} (spec §4.5.2).

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use deckcast_core::{ArtifactPaths, JobId, TaskId, TaskStatus, TaskUpdate, VoiceSource};
use deckcast_storage::TaskRef;

use super::trim::trim_reference;
use super::{Synthesizer, SynthesizerError};
use crate::error::EngineError;
use crate::ports::{JobStorePort, ObjectStorePort, TaskStorePort, VoiceReferencePort};

/// Sentinel substituted for empty/whitespace-only notes (spec §4.5 step 3).
pub const SILENCE_SENTINEL: &str = "[SILENCE]";

/// Duration of the tier-3 fallback clip (spec §4.5.2 tier 3).
const FALLBACK_SILENCE_SECS: f32 = 3.0;

/// Which tier of the fallback chain produced the uploaded audio. Carried
/// into the task's `progress` column per spec §4.5.2's three literal
/// strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisOutcome {
    Primary,
    Fallback,
    Silence,
}

impl SynthesisOutcome {
    fn progress(self) -> &'static str {
        match self {
            Self::Primary => "synthesized",
            Self::Fallback => "fallback: base",
            Self::Silence => "fallback: silence",
        }
    }
}

pub struct SynthesisWorker<J, T, O, V, S> {
    job_store: Arc<J>,
    task_store: Arc<T>,
    object_store: Arc<O>,
    voice_store: Arc<V>,
    synthesizer: S,
    soft_time_limit: Duration,
    hard_time_limit: Duration,
}

impl<J, T, O, V, S> SynthesisWorker<J, T, O, V, S>
where
    J: JobStorePort,
    T: TaskStorePort,
    O: ObjectStorePort,
    V: VoiceReferencePort,
    S: Synthesizer,
{
    pub fn new(
        job_store: Arc<J>,
        task_store: Arc<T>,
        object_store: Arc<O>,
        voice_store: Arc<V>,
        synthesizer: S,
        soft_time_limit: Duration,
        hard_time_limit: Duration,
    ) -> Self {
        Self {
            job_store,
            task_store,
            object_store,
            voice_store,
            synthesizer,
            soft_time_limit,
            hard_time_limit,
        }
    }

    /// Runs the `synthesize` task body for `(job_id, slide_index)` (spec
    /// §4.5's numbered algorithm). `task_id` identifies the already-created
    /// task row this call reports status against.
    pub async fn run(
        &self,
        task_id: TaskId,
        job_id: JobId,
        slide_index: u32,
    ) -> Result<SynthesisOutcome, EngineError> {
        self.task_store
            .update_task(TaskRef::Id(task_id), TaskUpdate::status(TaskStatus::Running))
            .await?;

        match self.run_inner(task_id, job_id, slide_index).await {
            Ok(outcome) => {
                self.task_store
                    .update_task(
                        TaskRef::Id(task_id),
                        TaskUpdate::status(TaskStatus::Completed)
                            .with_progress(outcome.progress()),
                    )
                    .await?;
                Ok(outcome)
            }
            Err(EngineError::Cancelled) => {
                self.task_store
                    .update_task(TaskRef::Id(task_id), TaskUpdate::status(TaskStatus::Cancelled))
                    .await?;
                Err(EngineError::Cancelled)
            }
            Err(e) => {
                let message = e.to_string();
                self.task_store
                    .update_task(
                        TaskRef::Id(task_id),
                        TaskUpdate::status(TaskStatus::Failed).with_error(message),
                    )
                    .await?;
                Err(e)
            }
        }
    }

    async fn run_inner(
        &self,
        task_id: TaskId,
        job_id: JobId,
        slide_index: u32,
    ) -> Result<SynthesisOutcome, EngineError> {
        // step 1
        let job = self
            .job_store
            .get_job(job_id)
            .await?
            .ok_or(EngineError::JobNotFound(job_id))?;

        self.check_cancellation(task_id).await?;

        // step 2: resolve the voice reference.
        let voice_ref = self
            .voice_store
            .get_voice_reference(job.voice_ref_id)
            .await?
            .ok_or(EngineError::VoiceReferenceNotFound(job.voice_ref_id))?;
        let source = voice_ref
            .resolve()
            .ok_or(EngineError::MalformedVoiceReference(job.voice_ref_id))?;
        let reference = match source {
            VoiceSource::Builtin { .. } => None,
            VoiceSource::Uploaded { bucket, key } => {
                let bytes = self.object_store.get(bucket, key).await?;
                let ext = key.rsplit('.').next().unwrap_or("wav").to_string();
                Some((trim_reference(&bytes), ext))
            }
        };

        self.check_cancellation(task_id).await?;

        // step 3: load note text, substituting the silence sentinel.
        let notes_path = ArtifactPaths::notes(job_id, slide_index);
        let raw_text = match self
            .object_store
            .get(&notes_path.bucket, &notes_path.key)
            .await
        {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => String::new(),
        };
        let text = if raw_text.trim().is_empty() {
            SILENCE_SENTINEL.to_string()
        } else {
            raw_text
        };

        // step 4
        let parsed = deckcast_core::parse_note_text(&text);

        self.check_cancellation(task_id).await?;

        // step 5: the fallback chain, racing each tier against the
        // soft/hard time limits.
        let (wav, outcome) = self
            .synthesize_with_fallback(&parsed, reference.as_ref())
            .await?;

        self.check_cancellation(task_id).await?;

        // step 6
        let audio_path = ArtifactPaths::audio(job.source_uuid(), slide_index);
        self.object_store
            .put(&audio_path.bucket, &audio_path.key, wav)
            .await?;

        Ok(outcome)
    }

    async fn check_cancellation(&self, task_id: TaskId) -> Result<(), EngineError> {
        if self.task_store.is_cancellation_requested(task_id).await? {
            return Err(EngineError::Cancelled);
        }
        Ok(())
    }

    /// Attempts tier 1, then tier 2, then tier 3, advancing on any
    /// exception or soft-limit expiry (spec §4.5.2). Only a tier-3 failure
    /// propagates — tiers 1 and 2 failing just degrade audio quality.
    async fn synthesize_with_fallback(
        &self,
        note: &deckcast_core::ParsedNote,
        reference: Option<&(Bytes, String)>,
    ) -> Result<(Bytes, SynthesisOutcome), EngineError> {
        if let Some((ref_bytes, ref_ext)) = reference {
            let attempt = self.with_soft_limit(self.synthesizer.synthesize_with_reference(
                &note.clean_text,
                ref_bytes,
                ref_ext,
                note.speed,
                note.pitch,
            ));
            if let Some(Ok(wav)) = attempt.await {
                return Ok((wav, SynthesisOutcome::Primary));
            }
        }

        let attempt = self.with_soft_limit(self.synthesizer.synthesize_base(
            &note.clean_text,
            note.speed,
            note.pitch,
        ));
        if let Some(Ok(wav)) = attempt.await {
            return Ok((wav, SynthesisOutcome::Fallback));
        }

        // Tier 3 is algebraic and, per spec §4.5.2's rationale, "cannot
        // fail absent a filesystem fault" — still honor the hard limit so
        // a genuinely hung engine does not wedge the worker forever.
        let wav = tokio::time::timeout(
            self.hard_time_limit,
            self.synthesizer.synthesize_silence(FALLBACK_SILENCE_SECS),
        )
        .await
        .map_err(|_| EngineError::SynthesisTimeout(self.hard_time_limit.as_secs()))??;
        Ok((wav, SynthesisOutcome::Silence))
    }

    /// Races `fut` against the soft limit first (returning `None` on
    /// expiry, which the caller treats the same as a tier exception) and
    /// the hard limit overall (returning a deadline error that aborts the
    /// whole task, per spec §4.5's control contract).
    async fn with_soft_limit<F>(
        &self,
        fut: F,
    ) -> Option<Result<Bytes, SynthesizerError>>
    where
        F: std::future::Future<Output = Result<Bytes, SynthesizerError>>,
    {
        match tokio::time::timeout(self.hard_time_limit, async {
            tokio::time::timeout(self.soft_time_limit, fut).await
        })
        .await
        {
            Ok(Ok(result)) => Some(result),
            Ok(Err(_soft_elapsed)) => None,
            Err(_hard_elapsed) => None,
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
