// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `updockly-ctl cron test <expr>`: evaluate a 5-field cron expression
//! against the current instant, without touching the store at all.

use updockly_core::CronEvaluator;

use crate::exit_error::ExitError;

pub fn handle(expression: &str) -> Result<(), ExitError> {
    let evaluator = CronEvaluator::parse(expression);
    let now = chrono::Utc::now();
    if evaluator.matches(now) {
        println!("'{expression}' matches the current minute ({now})");
    } else {
        println!("'{expression}' does not match the current minute ({now})");
    }
    Ok(())
}
