// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `deckcast-gpu-worker`: pulls `synthesize` messages off the `gpu` queue.
//! Concurrency defaults to one in-flight task per process (spec §5: "GPU
//! workers ... serial per GPU", one exclusive model load per host), via
//! `GPU_WORKER_CONCURRENCY` — distinct from `WORKER_CONCURRENCY`, which
//! governs the CPU worker and is not GPU-exclusive. Raise it only for a
//! process that shards multiple GPUs behind itself.

use std::sync::Arc;

use deckcast_broker::{Queue, TaskMessage};
use deckcast_core::JobId;
use deckcast_daemon::Context;
use deckcast_engine::{Synthesizer, SynthesisWorker};
use deckcast_objectstore::ObjectStore;
use deckcast_storage::{JobStore, TaskStore, VoiceReferenceStore};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const VISIBILITY_TIMEOUT_SECS: i32 = 30;
const EMPTY_QUEUE_BACKOFF: std::time::Duration = std::time::Duration::from_millis(500);

type GpuWorker = SynthesisWorker<JobStore, TaskStore, ObjectStore, VoiceReferenceStore, Box<dyn Synthesizer>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    deckcast_daemon::init_tracing();
    let ctx = Context::connect().await?;
    info!(concurrency = ctx.config.gpu_worker_concurrency, "deckcast-gpu-worker starting");

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received, draining in-flight tasks");
            shutdown.cancel();
        });
    }

    let synthesizer = deckcast_daemon::build_synthesizer(&ctx.config);
    let worker: Arc<GpuWorker> = Arc::new(SynthesisWorker::new(
        ctx.job_store.clone(),
        ctx.task_store.clone(),
        ctx.object_store.clone(),
        ctx.voice_store.clone(),
        synthesizer,
        ctx.config.tts_soft_time_limit,
        ctx.config.tts_hard_time_limit,
    ));
    let permits = Arc::new(Semaphore::new(ctx.config.gpu_worker_concurrency));

    loop {
        if shutdown.is_cancelled() {
            break;
        }
        let received = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = ctx.broker.receive(Queue::Gpu, VISIBILITY_TIMEOUT_SECS) => received,
        };
        let task = match received {
            Ok(Some(task)) => task,
            Ok(None) => {
                tokio::time::sleep(EMPTY_QUEUE_BACKOFF).await;
                continue;
            }
            Err(e) => {
                error!(error = %e, "gpu queue receive failed");
                tokio::time::sleep(EMPTY_QUEUE_BACKOFF).await;
                continue;
            }
        };

        let permit = match permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        let worker = worker.clone();
        let broker = ctx.broker.clone();

        tokio::spawn(async move {
            let _permit = permit;
            let msg_id = task.msg_id;
            let result = run_task(&worker, &task.message).await;
            if let Err(e) = &result {
                warn!(task_name = %task.message.task_name, error = %e, "gpu task body failed");
            }
            if let Err(e) = broker.ack(Queue::Gpu, msg_id).await {
                error!(error = %e, msg_id, "failed to ack gpu queue message");
            }
        });
    }

    Ok(())
}

#[tracing::instrument(skip(worker, message), fields(task_name = %message.task_name))]
async fn run_task(worker: &GpuWorker, message: &TaskMessage) -> anyhow::Result<()> {
    match message.task_name.as_str() {
        "synthesize_audio" => {
            let job_id: JobId = serde_json::from_value(message.args["job_id"].clone())?;
            let slide_index: u32 = serde_json::from_value(message.args["slide_index"].clone())?;
            let task_id = message
                .task_id
                .ok_or_else(|| anyhow::anyhow!("synthesize_audio message missing task_id"))?;
            worker.run(task_id, job_id, slide_index).await?;
        }
        other => anyhow::bail!("gpu worker received unknown task_name {other:?}"),
    }
    Ok(())
}
