// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `deckcast retention ...`: preview and execute the retention sweep
//! (spec §4.6).

use clap::Subcommand;
use deckcast_core::{JobId, JobStatus, SystemClock};
use deckcast_daemon::Context;
use deckcast_retention::{RetentionService, DEFAULT_STATUS_FILTER};

use super::job::StatusArg;

#[derive(Subcommand)]
pub enum RetentionCommand {
    /// Pure read: list the jobs a sweep would delete without deleting them.
    Preview {
        /// Delete jobs whose `created_at` is older than this many days.
        #[arg(long, default_value_t = 30)]
        age_days: i64,
        /// Restrict to these statuses (defaults to completed/failed).
        #[arg(long, value_enum)]
        status: Vec<StatusArg>,
    },
    /// Delete every job older than `age_days` matching the status filter.
    Sweep {
        #[arg(long, default_value_t = 30)]
        age_days: i64,
        #[arg(long, value_enum)]
        status: Vec<StatusArg>,
    },
    /// Delete exactly the named jobs, bypassing the age/status filter.
    Delete {
        /// Numeric job ids.
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

pub async fn handle(command: RetentionCommand, ctx: &Context) -> anyhow::Result<()> {
    let service = RetentionService::new(ctx.job_store.clone(), ctx.object_store.clone(), SystemClock);

    match command {
        RetentionCommand::Preview { age_days, status } => {
            let filter = status_filter(status);
            let preview = service.preview(age_days, &filter).await?;
            println!("cutoff={} count={}", preview.cutoff, preview.count);
            for job in preview.jobs {
                println!("  job {} status={} created_at={}", job.id, job.status, job.created_at);
            }
        }
        RetentionCommand::Sweep { age_days, status } => {
            let filter = status_filter(status);
            let summary = service.delete_old(age_days, &filter).await?;
            print_summary(&summary);
        }
        RetentionCommand::Delete { ids } => {
            let ids: Vec<JobId> = ids.into_iter().map(JobId::new).collect();
            let summary = service.delete_specific(&ids).await?;
            print_summary(&summary);
        }
    }
    Ok(())
}

fn status_filter(status: Vec<StatusArg>) -> Vec<JobStatus> {
    if status.is_empty() {
        DEFAULT_STATUS_FILTER.to_vec()
    } else {
        status.into_iter().map(JobStatus::from).collect()
    }
}

fn print_summary(summary: &deckcast_retention::DeletionSummary) {
    println!(
        "jobs_deleted={} artifacts_deleted={} errors={}",
        summary.jobs_deleted,
        summary.artifacts_deleted,
        summary.errors.len()
    );
    for error in &summary.errors {
        println!("  error: {error}");
    }
}
