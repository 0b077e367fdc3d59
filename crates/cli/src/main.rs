// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `deckcast`: operator CLI for retention sweeps and job cancellation
//! (spec §4.6, §5). Talks directly to the same Postgres/object-store the
//! worker processes use — there is no daemon RPC surface, since the
//! engine itself has no always-on control plane beyond the two queue
//! workers.

mod commands;

use clap::{Parser, Subcommand};
use commands::{job, retention};
use deckcast_daemon::Context;

#[derive(Parser)]
#[command(name = "deckcast", version, about = "Operator CLI for the deckcast job orchestration engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Retention sweep operations (spec §4.6)
    Retention {
        #[command(subcommand)]
        command: retention::RetentionCommand,
    },
    /// Job inspection and cancellation (spec §5)
    Job {
        #[command(subcommand)]
        command: job::JobCommand,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    deckcast_daemon::init_tracing();
    let cli = Cli::parse();
    let ctx = Context::connect().await?;

    match cli.command {
        Command::Retention { command } => retention::handle(command, &ctx).await,
        Command::Job { command } => job::handle(command, &ctx).await,
    }
}
