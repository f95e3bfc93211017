// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `updockly-ctl recap`: build today's history recap and run the offline
//! detection pass once against the seeded demo fleet.

use std::sync::Arc;

use updockly_core::OfflineNotifications;
use updockly_scheduler::RecapScheduler;

use crate::commands::demo;
use crate::exit_error::ExitError;

pub async fn handle() -> Result<(), ExitError> {
    let fleet = demo::seeded().await?;
    let scheduler = RecapScheduler::new(
        fleet.store.clone(),
        fleet.notifier.clone(),
        fleet.clock,
        Arc::new(OfflineNotifications::new()),
        &fleet.config,
    );

    scheduler.tick().await;

    let sent = fleet.notifier.sent();
    if sent.is_empty() {
        println!("no recap sent this tick (outside the recap window, or already recapped today)");
    } else {
        for notice in sent {
            println!("{}\n{}\n", notice.title, notice.message);
        }
    }

    Ok(())
}
