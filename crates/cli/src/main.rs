// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `updockly-ctl`: a thin local-operation front end for the engine.
//!
//! There is no daemon and no network surface here — every subcommand
//! wires the engine up against the same in-memory `Store`/
//! `ContainerRuntime`/`Notifier` fakes the test suites use, seeded with
//! a small demo fleet, so the binary is runnable without a real
//! container runtime.

mod commands;
mod exit_error;

use clap::{Parser, Subcommand};
use exit_error::ExitError;

#[derive(Parser)]
#[command(name = "updockly-ctl", version, about = "Local operation front end for the update-orchestration engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one local update pass and one agent command-queue cycle now.
    RunCycle,
    /// Build today's history recap and run the offline-agent check once.
    Recap,
    /// Cron expression utilities.
    Cron {
        #[command(subcommand)]
        command: CronCommand,
    },
}

#[derive(Subcommand)]
enum CronCommand {
    /// Evaluate a 5-field cron expression against the current minute.
    Test {
        /// e.g. "0 2 * * *"
        expression: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(err.code);
    }
}

async fn run() -> Result<(), ExitError> {
    let cli = Cli::parse();
    match cli.command {
        Command::RunCycle => commands::run_cycle::handle().await,
        Command::Recap => commands::recap::handle().await,
        Command::Cron { command: CronCommand::Test { expression } } => commands::cron::handle(&expression),
    }
}
