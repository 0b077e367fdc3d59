// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fakes for the dispatcher/barrier/synthesis state machine
//! tests (spec §8.4), gated the same way `deckcast-core`'s test builders
//! are.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use deckcast_core::{Job, JobId, JobStatus, Task, TaskId, TaskKind, TaskStatus, TaskUpdate, VoiceReference, VoiceReferenceId};
use deckcast_storage::{JobPage, JobStatusUpdate, SetStatusOutcome, TaskRef};
use parking_lot::Mutex;

use crate::error::EngineError;
use crate::ports::{BrokerPort, JobStorePort, ObjectStorePort, TaskStorePort, VoiceReferencePort};

#[derive(Default)]
pub struct FakeJobStore {
    jobs: Mutex<HashMap<JobId, Job>>,
}

impl FakeJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Job) {
        self.jobs.lock().insert(job.id, job);
    }
}

#[async_trait]
impl JobStorePort for FakeJobStore {
    async fn get_job(&self, id: JobId) -> Result<Option<Job>, EngineError> {
        Ok(self.jobs.lock().get(&id).cloned())
    }

    async fn set_job_status(
        &self,
        id: JobId,
        status: JobStatus,
        update: JobStatusUpdate,
    ) -> Result<SetStatusOutcome, EngineError> {
        let mut jobs = self.jobs.lock();
        let job = jobs
            .get_mut(&id)
            .ok_or(EngineError::JobNotFound(id))?;
        if job.status != status && !job.status.can_transition_to(status) {
            return Ok(SetStatusOutcome::Rejected { current: job.status });
        }
        job.status = status;
        if let Some(stage) = update.stage {
            job.stage = stage;
        }
        if let Some(error) = update.error {
            job.error = Some(error);
        }
        if let Some(result_key) = update.result_key {
            job.result_artifact_key = Some(result_key);
        }
        if let Some(slide_count) = update.slide_count {
            job.slide_count = Some(slide_count);
        }
        job.updated_at = Utc::now();
        Ok(SetStatusOutcome::Applied)
    }

    async fn list_jobs_older_than(
        &self,
        cutoff: DateTime<Utc>,
        statuses: &[JobStatus],
    ) -> Result<Vec<Job>, EngineError> {
        Ok(self
            .jobs
            .lock()
            .values()
            .filter(|j| j.created_at < cutoff && statuses.contains(&j.status))
            .cloned()
            .collect())
    }

    async fn list_all_jobs(&self, _page: JobPage) -> Result<Vec<Job>, EngineError> {
        Ok(self.jobs.lock().values().cloned().collect())
    }

    async fn delete_job_cascade(&self, id: JobId) -> Result<(), EngineError> {
        self.jobs.lock().remove(&id);
        Ok(())
    }
}

pub struct FakeVoiceReferenceStore {
    refs: Mutex<HashMap<VoiceReferenceId, VoiceReference>>,
}

impl FakeVoiceReferenceStore {
    pub fn new() -> Self {
        Self {
            refs: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, reference: VoiceReference) {
        self.refs.lock().insert(reference.id, reference);
    }
}

#[async_trait]
impl VoiceReferencePort for FakeVoiceReferenceStore {
    async fn get_voice_reference(
        &self,
        id: VoiceReferenceId,
    ) -> Result<Option<VoiceReference>, EngineError> {
        Ok(self.refs.lock().get(&id).cloned())
    }
}

pub struct FakeTaskStore {
    tasks: Mutex<HashMap<TaskId, Task>>,
    by_external: Mutex<HashMap<String, TaskId>>,
    cancelled: Mutex<std::collections::HashSet<TaskId>>,
    next_id: AtomicI64,
}

impl Default for FakeTaskStore {
    fn default() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
            by_external: Mutex::new(HashMap::new()),
            cancelled: Mutex::new(std::collections::HashSet::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl FakeTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_cancellation(&self, task_id: TaskId) {
        self.cancelled.lock().insert(task_id);
    }

    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.tasks.lock().get(&id).cloned()
    }

    /// Seeds a fully-formed [`Task`] directly, for tests that need
    /// specific ids/statuses rather than the auto-assigned ones
    /// [`TaskStorePort::create_task`] hands out.
    pub fn insert_for_test(&self, task: Task) -> TaskId {
        let id = task.id;
        if let Some(external_id) = task.external_id.clone() {
            self.by_external.lock().insert(external_id, id);
        }
        self.tasks.lock().insert(id, task);
        id
    }
}

#[async_trait]
impl TaskStorePort for FakeTaskStore {
    async fn create_task(
        &self,
        job_id: JobId,
        kind: TaskKind,
        slide_index: Option<i32>,
        external_id: Option<&str>,
    ) -> Result<Task, EngineError> {
        let id = TaskId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let task = Task {
            id,
            job_id,
            kind,
            slide_index,
            external_id: external_id.map(str::to_string),
            status: TaskStatus::Pending,
            progress: None,
            error: None,
            started_at: None,
            completed_at: None,
        };
        self.tasks.lock().insert(id, task.clone());
        if let Some(external_id) = external_id {
            self.by_external.lock().insert(external_id.to_string(), id);
        }
        Ok(task)
    }

    async fn update_task(&self, task_ref: TaskRef<'_>, update: TaskUpdate) -> Result<Task, EngineError> {
        let id = match task_ref {
            TaskRef::Id(id) => id,
            TaskRef::ExternalId(external_id) => *self
                .by_external
                .lock()
                .get(external_id)
                .ok_or_else(|| EngineError::Storage(deckcast_storage::StorageError::TaskExternalIdNotFound(external_id.to_string())))?,
        };
        let mut tasks = self.tasks.lock();
        let task = tasks.get_mut(&id).ok_or(EngineError::Storage(deckcast_storage::StorageError::TaskNotFound(id)))?;

        let next_status = update.status.unwrap_or(task.status);
        if next_status == TaskStatus::Running && task.started_at.is_none() {
            task.started_at = Some(Utc::now());
        }
        if next_status.is_settled() && task.completed_at.is_none() {
            task.completed_at = Some(Utc::now());
        }
        task.status = next_status;
        if let Some(progress) = update.progress {
            task.progress = Some(progress);
        }
        if let Some(error) = update.error {
            task.error = Some(error);
        }
        if let Some(external_id) = update.external_id {
            task.external_id = Some(external_id);
        }
        Ok(task.clone())
    }

    async fn list_tasks(&self, job_id: JobId) -> Result<Vec<Task>, EngineError> {
        let mut tasks: Vec<Task> = self
            .tasks
            .lock()
            .values()
            .filter(|t| t.job_id == job_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (format!("{:?}", t.kind), t.slide_index));
        Ok(tasks)
    }

    async fn is_cancellation_requested(&self, task_id: TaskId) -> Result<bool, EngineError> {
        Ok(self.cancelled.lock().contains(&task_id))
    }

    async fn request_cancellation(&self, task_id: TaskId) -> Result<(), EngineError> {
        self.cancelled.lock().insert(task_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeObjectStore {
    objects: Mutex<HashMap<(String, String), Bytes>>,
}

impl FakeObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bucket: &str, key: &str, bytes: Bytes) {
        self.objects.lock().insert((bucket.to_string(), key.to_string()), bytes);
    }
}

#[async_trait]
impl ObjectStorePort for FakeObjectStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Bytes) -> Result<(), EngineError> {
        self.objects.lock().insert((bucket.to_string(), key.to_string()), bytes);
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, EngineError> {
        self.objects
            .lock()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| {
                EngineError::ObjectStore(deckcast_objectstore::ObjectStoreError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            })
    }

    async fn delete_prefix(&self, bucket: &str, prefix: &str) -> Result<usize, EngineError> {
        let mut objects = self.objects.lock();
        let before = objects.len();
        objects.retain(|(b, k), _| !(b == bucket && k.starts_with(prefix)));
        Ok(before - objects.len())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), EngineError> {
        self.objects.lock().remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeBroker {
    pub enqueued: Mutex<Vec<(deckcast_broker::Queue, String, serde_json::Value)>>,
    pub revoked: Mutex<Vec<(TaskId, Option<String>)>>,
    next_id: AtomicI64,
}

impl FakeBroker {
    pub fn new() -> Self {
        Self {
            enqueued: Mutex::new(Vec::new()),
            revoked: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl BrokerPort for FakeBroker {
    async fn enqueue(
        &self,
        queue: deckcast_broker::Queue,
        task_name: &str,
        args: serde_json::Value,
        _task_id: Option<TaskId>,
    ) -> Result<String, EngineError> {
        self.enqueued.lock().push((queue, task_name.to_string(), args));
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst).to_string())
    }

    async fn revoke(&self, task_id: TaskId, external_id: Option<&str>) -> Result<(), EngineError> {
        self.revoked.lock().push((task_id, external_id.map(str::to_string)));
        Ok(())
    }
}

pub fn new_voice_reference(id: VoiceReferenceId, s3_path: &str) -> VoiceReference {
    VoiceReference::builder()
        .id(id)
        .s3_path(s3_path)
        .build()
}

/// Scripted [`crate::synthesize::Synthesizer`] for fallback-chain tests:
/// each tier can be independently told to succeed or to raise, so a test
/// can exercise "primary fails, secondary succeeds" without a real TTS
/// backend.
#[derive(Default)]
pub struct FakeSynthesizer {
    pub reference_fails: std::sync::atomic::AtomicBool,
    pub base_fails: std::sync::atomic::AtomicBool,
    pub silence_fails: std::sync::atomic::AtomicBool,
    pub reference_calls: AtomicI64,
    pub base_calls: AtomicI64,
    pub silence_calls: AtomicI64,
}

impl FakeSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_reference(self) -> Self {
        self.reference_fails.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_base(self) -> Self {
        self.base_fails.store(true, Ordering::SeqCst);
        self
    }
}

#[async_trait::async_trait]
impl crate::synthesize::Synthesizer for FakeSynthesizer {
    async fn synthesize_with_reference(
        &self,
        _text: &str,
        _ref_bytes: &Bytes,
        _ref_ext: &str,
        _speed: f32,
        _pitch: f32,
    ) -> Result<Bytes, crate::synthesize::SynthesizerError> {
        self.reference_calls.fetch_add(1, Ordering::SeqCst);
        if self.reference_fails.load(Ordering::SeqCst) {
            return Err(crate::synthesize::SynthesizerError::Request("primary down".into()));
        }
        Ok(Bytes::from_static(b"cloned-wav"))
    }

    async fn synthesize_base(
        &self,
        _text: &str,
        _speed: f32,
        _pitch: f32,
    ) -> Result<Bytes, crate::synthesize::SynthesizerError> {
        self.base_calls.fetch_add(1, Ordering::SeqCst);
        if self.base_fails.load(Ordering::SeqCst) {
            return Err(crate::synthesize::SynthesizerError::Request("base down".into()));
        }
        Ok(Bytes::from_static(b"base-wav"))
    }

    async fn synthesize_silence(
        &self,
        seconds: f32,
    ) -> Result<Bytes, crate::synthesize::SynthesizerError> {
        self.silence_calls.fetch_add(1, Ordering::SeqCst);
        if self.silence_fails.load(Ordering::SeqCst) {
            return Err(crate::synthesize::SynthesizerError::Request("silence down".into()));
        }
        Ok(crate::synthesize::silence_wav(seconds))
    }
}

/// Stub [`crate::muxer::Muxer`] that writes a marker file instead of
/// shelling out to `ffmpeg`, so the barrier/assembler state machine is
/// exercised without a real muxer binary on the test host.
#[derive(Default)]
pub struct FakeMuxer {
    pub calls: Mutex<Vec<usize>>,
}

impl FakeMuxer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl crate::muxer::Muxer for FakeMuxer {
    async fn mux(
        &self,
        pairs: &[crate::muxer::SlidePair],
        output_path: &std::path::Path,
    ) -> Result<(), crate::muxer::MuxerError> {
        if pairs.is_empty() {
            return Err(crate::muxer::MuxerError::EmptyInput);
        }
        self.calls.lock().push(pairs.len());
        tokio::fs::write(output_path, b"fake-mp4")
            .await
            .map_err(crate::muxer::MuxerError::Spawn)?;
        Ok(())
    }
}
