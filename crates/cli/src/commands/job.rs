// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `deckcast job ...`: operator inspection and cancellation (spec §4.1,
//! §5 "Cancellation").

use clap::{Subcommand, ValueEnum};
use deckcast_core::{JobId, JobStatus};
use deckcast_daemon::Context;
use deckcast_engine::Canceller;

#[derive(Subcommand)]
pub enum JobCommand {
    /// Print a job row and its tasks.
    Show {
        /// Numeric job id.
        id: i64,
    },
    /// List jobs in the given statuses (defaults to the non-terminal ones).
    List {
        #[arg(long, value_enum)]
        status: Vec<StatusArg>,
    },
    /// Cancel a job: revoke every non-terminal task, mark the job
    /// `cancelled` (spec §5). A no-op if the job is already terminal.
    Cancel {
        /// Numeric job id.
        id: i64,
    },
}

/// clap-friendly mirror of [`JobStatus`] (which intentionally carries no
/// `ValueEnum` derive of its own — it is a persistence/domain type, not a
/// CLI-surface one).
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Pending,
    Decomposing,
    Synthesizing,
    Assembling,
    Completed,
    Failed,
    Cancelled,
}

impl From<StatusArg> for JobStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => JobStatus::Pending,
            StatusArg::Decomposing => JobStatus::Decomposing,
            StatusArg::Synthesizing => JobStatus::Synthesizing,
            StatusArg::Assembling => JobStatus::Assembling,
            StatusArg::Completed => JobStatus::Completed,
            StatusArg::Failed => JobStatus::Failed,
            StatusArg::Cancelled => JobStatus::Cancelled,
        }
    }
}

const NON_TERMINAL: [JobStatus; 4] = [
    JobStatus::Pending,
    JobStatus::Decomposing,
    JobStatus::Synthesizing,
    JobStatus::Assembling,
];

pub async fn handle(command: JobCommand, ctx: &Context) -> anyhow::Result<()> {
    match command {
        JobCommand::Show { id } => show(ctx, JobId::new(id)).await,
        JobCommand::List { status } => list(ctx, status).await,
        JobCommand::Cancel { id } => cancel(ctx, JobId::new(id)).await,
    }
}

async fn show(ctx: &Context, id: JobId) -> anyhow::Result<()> {
    let job = ctx
        .job_store
        .get_job(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("job {id} not found"))?;
    println!(
        "job {} status={} stage={:?} slide_count={:?} result={:?} error={:?}",
        job.id, job.status, job.stage, job.slide_count, job.result_artifact_key, job.error
    );

    let tasks = ctx.task_store.list_tasks(id).await?;
    for task in tasks {
        println!(
            "  task {} kind={} slide={:?} status={} progress={:?} error={:?}",
            task.id, task.kind, task.slide_index, task.status, task.progress, task.error
        );
    }
    Ok(())
}

async fn list(ctx: &Context, statuses: Vec<StatusArg>) -> anyhow::Result<()> {
    let statuses: Vec<JobStatus> = if statuses.is_empty() {
        NON_TERMINAL.to_vec()
    } else {
        statuses.into_iter().map(JobStatus::from).collect()
    };
    let jobs = ctx.job_store.list_jobs_by_status(&statuses).await?;
    for job in jobs {
        println!(
            "job {} status={} stage={:?} slide_count={:?} created_at={}",
            job.id, job.status, job.stage, job.slide_count, job.created_at
        );
    }
    Ok(())
}

async fn cancel(ctx: &Context, id: JobId) -> anyhow::Result<()> {
    let canceller = Canceller::new(ctx.job_store.clone(), ctx.task_store.clone(), ctx.broker.clone());
    let outcome = canceller.cancel_job(id).await?;
    if outcome.applied {
        println!("job {id} cancelled, {} task(s) revoked", outcome.tasks_cancelled);
    } else {
        println!("job {id} already terminal, nothing to cancel");
    }
    Ok(())
}
