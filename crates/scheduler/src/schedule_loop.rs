// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ScheduleLoop`: the 30 s-tick background task that fires local
//! update passes and agent command enqueues on a cron schedule (§4.I).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use updockly_core::{Clock, ScheduleId};
use updockly_engine::{CommandQueue, EngineConfig, HistoryRecorder, LocalUpdatePass};
use updockly_ports::{ContainerRuntime, Notifier, Store};

/// The minute-resolution key a schedule's `last_run` entry is compared
/// against, so a cron expression that matches for an entire 60s window
/// still fires exactly once.
type MinuteKey = (i32, u32, u32, u32, u32);

fn minute_key<Tz2: chrono::TimeZone>(t: DateTime<Tz2>) -> MinuteKey {
    (t.year(), t.month(), t.day(), t.hour(), t.minute())
}

pub struct ScheduleLoop<R, S, N, C> {
    store: S,
    clock: C,
    local_pass: Arc<LocalUpdatePass<R, S, N, C>>,
    queue: Arc<CommandQueue<S, N, C>>,
    history: HistoryRecorder<S, N, C>,
    last_run: Mutex<HashMap<ScheduleId, MinuteKey>>,
    cycle_running: Arc<AtomicBool>,
    operator_timezone: Tz,
    schedule_tick: Duration,
    cycle_timeout: Duration,
    heartbeat_online_window: chrono::Duration,
    prune_after_local_pass: bool,
}

impl<R, S, N, C> ScheduleLoop<R, S, N, C>
where
    R: ContainerRuntime,
    S: Store,
    N: Notifier,
    C: Clock,
{
    pub fn new(
        store: S,
        clock: C,
        local_pass: LocalUpdatePass<R, S, N, C>,
        queue: CommandQueue<S, N, C>,
        history: HistoryRecorder<S, N, C>,
        config: &EngineConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            clock,
            local_pass: Arc::new(local_pass),
            queue: Arc::new(queue),
            history,
            last_run: Mutex::new(HashMap::new()),
            cycle_running: Arc::new(AtomicBool::new(false)),
            operator_timezone: config.operator_timezone,
            schedule_tick: config.schedule_tick,
            cycle_timeout: config.cycle_timeout,
            heartbeat_online_window: chrono::Duration::from_std(config.heartbeat_online_window)
                .unwrap_or(chrono::Duration::seconds(300)),
            prune_after_local_pass: config.prune_after_local_pass,
        })
    }

    /// Run the 30 s tick loop until `cancel` fires, returning after the
    /// last in-flight cycle (if any) is handed off to its own timeout.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.schedule_tick);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("schedule loop cancelled");
                        return;
                    }
                    _ = interval.tick() => {
                        self.tick().await;
                    }
                }
            }
        })
    }

    /// One tick: step 1-3 decide which schedules fired this minute;
    /// step 4-6 run the cycle under the compare-and-set flag.
    pub async fn tick(&self) {
        let now = self.clock.now_utc().with_timezone(&self.operator_timezone);

        let schedules = match self.store.list_schedules().await {
            Ok(schedules) => schedules,
            Err(err) => {
                tracing::error!(error = %err, "failed to list schedules");
                return;
            }
        };

        let key = minute_key(now);
        let mut fired = false;
        {
            let mut last_run = self.last_run.lock();
            for schedule in &schedules {
                if !schedule.evaluator().matches(now) {
                    continue;
                }
                if last_run.get(&schedule.id) == Some(&key) {
                    continue;
                }
                last_run.insert(schedule.id, key);
                fired = true;
            }
        }

        if !fired {
            return;
        }

        if self.cycle_running.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            tracing::debug!("schedule cycle already running; skipping this tick's trigger");
            return;
        }

        let local_pass = Arc::clone(&self.local_pass);
        let queue = Arc::clone(&self.queue);
        let history = self.history.clone();
        let cycle_running = Arc::clone(&self.cycle_running);
        let cycle_timeout = self.cycle_timeout;
        let online_window = self.heartbeat_online_window;
        let prune_after = self.prune_after_local_pass;

        tokio::spawn(async move {
            let outcome = tokio::time::timeout(cycle_timeout, async {
                let local_summary = local_pass.run(prune_after).await;
                let agent_summary = queue.run_agent_cycle(online_window).await;
                (local_summary, agent_summary)
            })
            .await;

            match outcome {
                Ok((local, agent)) => {
                    if local.checked > 0 || agent.queued > 0 {
                        let message = format!(
                            "local_checked={}, local_updated={}, local_failed={}, agent_checked={}, agent_queued={}",
                            local.checked, local.updated, local.failed, agent.checked, agent.queued
                        );
                        history.record_schedule_summary(message).await;
                    }
                }
                Err(_) => {
                    tracing::warn!("schedule cycle exceeded its deadline; abandoning this cycle");
                }
            }

            cycle_running.store(false, Ordering::SeqCst);
        });
    }
}

#[cfg(test)]
#[path = "schedule_loop_tests.rs"]
mod tests;
