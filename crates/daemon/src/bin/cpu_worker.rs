// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `deckcast-cpu-worker`: pulls `decompose`/`assemble` messages off the
//! `cpu` queue (spec §5: "CPU workers run in parallel across multiple
//! processes/hosts").

use std::sync::Arc;

use deckcast_broker::{Queue, TaskMessage};
use deckcast_core::{JobId, SystemClock, TaskId};
use deckcast_daemon::Context;
use deckcast_engine::{Assembler, Dispatcher, FfmpegMuxer, PptxDeckReader, RendererClient};
use deckcast_objectstore::ObjectStore;
use deckcast_storage::{JobStore, TaskStore};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Margin added on top of `assembly_barrier_deadline` for the pgmq
/// visibility timeout on cpu-queue receives. `assemble_video` can hold a
/// message's worker for up to the barrier deadline while it polls for
/// sibling synthesize tasks (`Assembler::barrier`); a timeout shorter than
/// that lets pgmq redeliver the same assemble task to a second worker
/// mid-barrier, duplicating the barrier and mux. `decompose_job` finishes
/// well inside this window too, so one shared timeout covers both task
/// kinds received off `Queue::Cpu`.
const VISIBILITY_TIMEOUT_MARGIN_SECS: i32 = 60;
const EMPTY_QUEUE_BACKOFF: std::time::Duration = std::time::Duration::from_millis(500);

type CpuDispatcher = Dispatcher<JobStore, TaskStore, ObjectStore, deckcast_broker::Broker, PptxDeckReader>;
type CpuAssembler = Assembler<JobStore, TaskStore, ObjectStore, FfmpegMuxer, SystemClock>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    deckcast_daemon::init_tracing();
    let ctx = Context::connect().await?;
    info!(concurrency = ctx.config.worker_concurrency, "deckcast-cpu-worker starting");

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received, draining in-flight tasks");
            shutdown.cancel();
        });
    }

    let dispatcher: Arc<CpuDispatcher> = Arc::new(Dispatcher::new(
        ctx.job_store.clone(),
        ctx.task_store.clone(),
        ctx.object_store.clone(),
        ctx.broker.clone(),
        PptxDeckReader,
        RendererClient::new(ctx.config.renderer_url.clone()),
        ctx.config.assembly_barrier_deadline,
    ));
    let assembler: Arc<CpuAssembler> = Arc::new(Assembler::new(
        ctx.job_store.clone(),
        ctx.task_store.clone(),
        ctx.object_store.clone(),
        FfmpegMuxer::new(),
        SystemClock,
    ));
    let permits = Arc::new(Semaphore::new(ctx.config.worker_concurrency));
    let visibility_timeout_secs = i32::try_from(ctx.config.assembly_barrier_deadline.as_secs())
        .unwrap_or(i32::MAX)
        .saturating_add(VISIBILITY_TIMEOUT_MARGIN_SECS);

    loop {
        if shutdown.is_cancelled() {
            break;
        }
        let received = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = ctx.broker.receive(Queue::Cpu, visibility_timeout_secs) => received,
        };
        let task = match received {
            Ok(Some(task)) => task,
            Ok(None) => {
                tokio::time::sleep(EMPTY_QUEUE_BACKOFF).await;
                continue;
            }
            Err(e) => {
                error!(error = %e, "cpu queue receive failed");
                tokio::time::sleep(EMPTY_QUEUE_BACKOFF).await;
                continue;
            }
        };

        let permit = match permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        let dispatcher = dispatcher.clone();
        let assembler = assembler.clone();
        let broker = ctx.broker.clone();

        tokio::spawn(async move {
            let _permit = permit;
            let msg_id = task.msg_id;
            let result = run_task(&dispatcher, &assembler, &task.message).await;
            if let Err(e) = &result {
                warn!(task_name = %task.message.task_name, error = %e, "cpu task body failed");
            }
            if let Err(e) = broker.ack(Queue::Cpu, msg_id).await {
                error!(error = %e, msg_id, "failed to ack cpu queue message");
            }
        });
    }

    Ok(())
}

#[tracing::instrument(skip(dispatcher, assembler, message), fields(task_name = %message.task_name))]
async fn run_task(
    dispatcher: &CpuDispatcher,
    assembler: &CpuAssembler,
    message: &TaskMessage,
) -> anyhow::Result<()> {
    match message.task_name.as_str() {
        "decompose_job" => {
            let job_id: JobId = serde_json::from_value(message.args["job_id"].clone())?;
            dispatcher.run(job_id, &SystemClock).await?;
        }
        "assemble_video" => {
            let job_id: JobId = serde_json::from_value(message.args["job_id"].clone())?;
            let task_id: TaskId = serde_json::from_value(message.args["task_id"].clone())?;
            let image_paths: Vec<String> = serde_json::from_value(message.args["image_paths"].clone())?;
            let expected_slides: u32 = serde_json::from_value(message.args["expected_slides"].clone())?;
            let deadline: chrono::DateTime<chrono::Utc> =
                serde_json::from_value(message.args["deadline"].clone())?;
            let deadline_secs: u64 = serde_json::from_value(message.args["deadline_secs"].clone())?;
            assembler
                .run(task_id, job_id, &image_paths, expected_slides, deadline, deadline_secs)
                .await?;
        }
        other => anyhow::bail!("cpu worker received unknown task_name {other:?}"),
    }
    Ok(())
}
