// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! updockly-scheduler: the two 30 s-tick background tasks.
//!
//! This is the one crate that owns a `tokio::time::interval` and a
//! `tokio_util::sync::CancellationToken` — `updockly-engine` stays
//! executor-agnostic and unit-testable without a runtime wherever
//! possible, grounded on `oj-daemon`'s split between `engine/` (pure
//! handler logic) and `lifecycle/`/`listener/` (the tasks that drive it).

pub mod recap;
pub mod schedule_loop;

pub use recap::{RecapDigest, RecapEntry, RecapScheduler};
pub use schedule_loop::ScheduleLoop;
