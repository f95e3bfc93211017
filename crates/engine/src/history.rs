// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `HistoryRecorder`: normalize and persist update outcomes, then fan
//! out a notification on the configured success/failure triggers (§4.J).
//!
//! Takes a `Notifier` directly rather than the other way around, so
//! there is no cyclic service-holds-its-own-reporter dependency (§9).

use updockly_core::{AgentId, Clock, ContainerId, HistoryId, HistorySource, HistoryStatus, UpdateHistory};
use updockly_ports::{Notifier, Store};

/// One update outcome to persist. Source/status arrive already typed —
/// the trim/lowercase/default normalization the design calls for
/// applies at the untyped boundary (see [`normalize_source`] and
/// [`normalize_status`]), not here.
pub struct HistoryEntry {
    pub container_id: ContainerId,
    pub container_name: String,
    pub image: String,
    pub image_digest: Option<String>,
    pub agent_id: Option<AgentId>,
    pub agent_name: Option<String>,
    pub source: HistorySource,
    pub status: HistoryStatus,
    pub message: String,
}

/// Parse a raw, possibly-absent source string, defaulting to `local`.
pub fn normalize_source(raw: Option<&str>) -> HistorySource {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(HistorySource::Local)
}

/// Parse a raw, possibly-absent status string, defaulting to `success`.
pub fn normalize_status(raw: Option<&str>) -> HistoryStatus {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(HistoryStatus::Success)
}

#[derive(Debug, Clone, Copy)]
pub struct NotifyPolicy {
    pub notify_on_success: bool,
    pub notify_on_failure: bool,
}

#[derive(Clone)]
pub struct HistoryRecorder<S, N, C> {
    store: S,
    notifier: N,
    clock: C,
    policy: NotifyPolicy,
}

impl<S, N, C> HistoryRecorder<S, N, C>
where
    S: Store,
    N: Notifier,
    C: Clock,
{
    pub fn new(store: S, notifier: N, clock: C, policy: NotifyPolicy) -> Self {
        Self { store, notifier, clock, policy }
    }

    /// Persist `entry`, then fan out a notification off the calling
    /// task if `(success & notify_on_success) | (error & notify_on_failure)`.
    pub async fn record(&self, entry: HistoryEntry) -> Option<HistoryId> {
        let now = self.clock.now_utc();
        let message = entry.message.trim().to_string();
        let row = UpdateHistory {
            id: HistoryId::new(),
            container_id: entry.container_id,
            container_name: entry.container_name.clone(),
            image: entry.image.clone(),
            image_digest: entry.image_digest,
            agent_id: entry.agent_id,
            agent_name: entry.agent_name,
            source: entry.source,
            status: entry.status,
            message: message.clone(),
            created_at: now,
        };

        let persisted_id = row.id;
        if let Err(err) = self.store.record_history(row).await {
            tracing::error!(error = %err, "failed to persist update history entry");
            return None;
        }

        let should_notify = match entry.status {
            HistoryStatus::Success => self.policy.notify_on_success,
            HistoryStatus::Error => self.policy.notify_on_failure,
            HistoryStatus::Warning | HistoryStatus::Info => false,
        };

        if should_notify {
            let icon = if entry.status == HistoryStatus::Success { "\u{2705}" } else { "\u{26a0}\u{fe0f}" };
            let title = format!("{icon} {}", entry.container_name);
            let body = format!(
                "image: {}\nsource: {}\nwhen: {}\n{}",
                entry.image,
                entry.source,
                now.to_rfc3339(),
                message
            );
            let notifier = self.notifier.clone();
            tokio::spawn(async move {
                if let Err(err) = notifier.notify(&title, &body).await {
                    tracing::warn!(error = %err, "history notification failed");
                }
            });
        }

        Some(persisted_id)
    }

    pub async fn record_local_outcome(
        &self,
        container_id: &ContainerId,
        container_name: &str,
        image: &str,
        image_digest: Option<String>,
        status: HistoryStatus,
        message: String,
    ) -> Option<HistoryId> {
        self.record(HistoryEntry {
            container_id: container_id.clone(),
            container_name: container_name.to_string(),
            image: image.to_string(),
            image_digest,
            agent_id: None,
            agent_name: None,
            source: HistorySource::Local,
            status,
            message,
        })
        .await
    }

    pub async fn record_agent_outcome(
        &self,
        container_id: &ContainerId,
        container_name: &str,
        image: &str,
        agent_id: &AgentId,
        agent_name: Option<String>,
        status: HistoryStatus,
        message: String,
    ) -> Option<HistoryId> {
        self.record(HistoryEntry {
            container_id: container_id.clone(),
            container_name: container_name.to_string(),
            image: image.to_string(),
            image_digest: None,
            agent_id: Some(*agent_id),
            agent_name,
            source: HistorySource::Agent,
            status,
            message,
        })
        .await
    }

    /// §4.I step 6: one `info` row per cycle summarizing what happened,
    /// only ever emitted when something actually occurred this cycle.
    pub async fn record_schedule_summary(&self, message: String) -> Option<HistoryId> {
        self.record(HistoryEntry {
            container_id: ContainerId::new(""),
            container_name: String::new(),
            image: String::new(),
            image_digest: None,
            agent_id: None,
            agent_name: None,
            source: HistorySource::Schedule,
            status: HistoryStatus::Info,
            message,
        })
        .await
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
