// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `updockly-ctl run-cycle`: one local update pass plus one agent
//! command-queue cycle, run immediately against the seeded demo fleet.

use crate::commands::demo;
use crate::exit_error::ExitError;

pub async fn handle() -> Result<(), ExitError> {
    let fleet = demo::seeded().await?;

    let local_summary = fleet.local_pass().run(fleet.config.prune_after_local_pass).await;
    println!(
        "local pass: checked={} updated={} failed={}",
        local_summary.checked, local_summary.updated, local_summary.failed
    );

    let agent_summary = fleet
        .command_queue()
        .run_agent_cycle(
            chrono::Duration::from_std(fleet.config.heartbeat_online_window)
                .map_err(|err| ExitError::new(1, err.to_string()))?,
        )
        .await;
    println!("agent cycle: checked={} queued={}", agent_summary.checked, agent_summary.queued);

    Ok(())
}
