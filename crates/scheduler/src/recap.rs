// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RecapScheduler`: the daily recap digest and offline-agent detection,
//! sharing the same 30 s tick as `ScheduleLoop` (§4.K).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;

use updockly_core::{paging::MAX_LIST_LIMIT, Clock, HistoryStatus, OfflineNotifications, UpdateHistory};
use updockly_ports::{Notifier, Store};

use updockly_engine::EngineConfig;

/// One line of a recap digest.
#[derive(Debug, Clone)]
pub struct RecapEntry {
    pub icon: &'static str,
    /// Human-readable, operator-timezone-local timestamp.
    pub timestamp: String,
    pub container_name: String,
    pub message: String,
}

/// §10.6 of the expanded spec: a typed stand-in for the free-text recap
/// spec.md §4.K describes, so `Notifier` renders structured data rather
/// than a hand-formatted string built inline.
#[derive(Debug, Clone)]
pub struct RecapDigest {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub success_count: u32,
    pub error_count: u32,
    pub entries: Vec<RecapEntry>,
}

const MAX_RECAP_ENTRIES: usize = 20;

fn icon_for(status: HistoryStatus) -> &'static str {
    match status {
        HistoryStatus::Success => "\u{2705}",
        HistoryStatus::Error => "\u{274c}",
        HistoryStatus::Warning => "\u{26a0}\u{fe0f}",
        HistoryStatus::Info => "\u{2139}\u{fe0f}",
    }
}

fn build_digest(rows: &[UpdateHistory], window_start: DateTime<Utc>, window_end: DateTime<Utc>, tz: Tz) -> RecapDigest {
    let mut success_count = 0u32;
    let mut error_count = 0u32;
    let mut entries = Vec::new();

    for row in rows {
        match row.status {
            HistoryStatus::Success => success_count += 1,
            HistoryStatus::Error => error_count += 1,
            HistoryStatus::Warning | HistoryStatus::Info => {}
        }
        if entries.len() < MAX_RECAP_ENTRIES {
            entries.push(RecapEntry {
                icon: icon_for(row.status),
                timestamp: row.created_at.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string(),
                container_name: row.container_name.clone(),
                message: row.message.clone(),
            });
        }
    }

    RecapDigest { window_start, window_end, success_count, error_count, entries }
}

impl RecapDigest {
    pub fn render_title(&self) -> String {
        format!("\u{1f4ca} Daily recap: {} success, {} errors", self.success_count, self.error_count)
    }

    pub fn render_body(&self) -> String {
        let mut lines = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            lines.push(format!("{} {} {}: {}", entry.icon, entry.timestamp, entry.container_name, entry.message));
        }
        lines.join("\n")
    }
}

pub struct RecapScheduler<S, N, C> {
    store: S,
    notifier: N,
    clock: C,
    offline: Arc<OfflineNotifications>,
    started_at: DateTime<Utc>,
    operator_timezone: Tz,
    recap_time: NaiveTime,
    offline_grace: chrono::Duration,
    offline_window: chrono::Duration,
    notifier_timeout: Duration,
    recap_notifier_timeout: Duration,
    last_recapped: Mutex<Option<NaiveDate>>,
    primed: Mutex<bool>,
}

impl<S, N, C> RecapScheduler<S, N, C>
where
    S: Store,
    N: Notifier,
    C: Clock,
{
    pub fn new(store: S, notifier: N, clock: C, offline: Arc<OfflineNotifications>, config: &EngineConfig) -> Self {
        let started_at = clock.now_utc();
        Self {
            store,
            notifier,
            clock,
            offline,
            started_at,
            operator_timezone: config.operator_timezone,
            recap_time: config.recap_time,
            offline_grace: chrono::Duration::from_std(config.offline_grace).unwrap_or(chrono::Duration::seconds(120)),
            offline_window: chrono::Duration::from_std(config.heartbeat_online_window)
                .unwrap_or(chrono::Duration::seconds(300)),
            notifier_timeout: config.notifier_timeout,
            recap_notifier_timeout: config.recap_notifier_timeout,
            last_recapped: Mutex::new(None),
            primed: Mutex::new(false),
        }
    }

    pub async fn tick(&self) {
        self.run_recap_check().await;
        self.run_offline_check().await;
    }

    fn target_instant(&self, day: NaiveDate) -> Option<DateTime<Tz>> {
        match self.operator_timezone.from_local_datetime(&day.and_time(self.recap_time)) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earlier, _) => Some(earlier),
            LocalResult::None => None,
        }
    }

    async fn run_recap_check(&self) {
        let now_tz = self.clock.now_utc().with_timezone(&self.operator_timezone);
        let today = now_tz.date_naive();
        let Some(target) = self.target_instant(today) else {
            tracing::warn!("recap time does not resolve to a valid instant in the operator timezone today");
            return;
        };

        {
            let mut primed = self.primed.lock();
            if !*primed {
                *primed = true;
                if now_tz > target {
                    // Priming: the process started after today's recap time
                    // already passed. Mark it done rather than firing a
                    // recap for a window that predates this process.
                    *self.last_recapped.lock() = Some(today);
                }
                return;
            }
        }

        let already_recapped = *self.last_recapped.lock() == Some(today);
        if now_tz < target || already_recapped {
            return;
        }
        *self.last_recapped.lock() = Some(today);

        let window_end = self.clock.now_utc();
        let window_start = window_end - chrono::Duration::hours(24);
        let rows = match self.store.list_history(MAX_LIST_LIMIT).await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!(error = %err, "failed to list history for daily recap");
                return;
            }
        };
        let windowed: Vec<UpdateHistory> =
            rows.into_iter().filter(|row| row.created_at >= window_start && row.created_at <= window_end).collect();

        let digest = build_digest(&windowed, window_start, window_end, self.operator_timezone);
        self.dispatch(digest.render_title(), digest.render_body(), self.recap_notifier_timeout).await;
    }

    async fn run_offline_check(&self) {
        let now = self.clock.now_utc();
        if now - self.started_at < self.offline_grace {
            return;
        }

        let agents = match self.store.list_agents().await {
            Ok(agents) => agents,
            Err(err) => {
                tracing::error!(error = %err, "failed to list agents for offline detection");
                return;
            }
        };

        for agent in agents {
            match agent.last_seen {
                Some(last_seen) if now - last_seen > self.offline_window => {
                    if self.offline.set_if_absent(agent.id) {
                        let title = format!("\u{1f50c} {} appears offline", agent.name);
                        let body = format!("last seen: {}", last_seen.to_rfc3339());
                        self.dispatch(title, body, self.notifier_timeout).await;
                    }
                }
                Some(_) => self.offline.delete(&agent.id),
                None => {}
            }
        }
    }

    async fn dispatch(&self, title: String, body: String, timeout: Duration) {
        match tokio::time::timeout(timeout, self.notifier.notify(&title, &body)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(error = %err, "notification failed"),
            Err(_) => tracing::warn!("notification timed out"),
        }
    }
}

#[cfg(test)]
#[path = "recap_tests.rs"]
mod tests;
