// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `HeartbeatReconciler`: merge agent-reported container state into the
//! stored `Agent` record, preserving Updockly-owned flags an agent
//! doesn't know about (§4.H).

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use updockly_core::{
    AgentCommand, AgentId, Clock, CommandStatus, CommandType, ContainerId, ContainerSnapshot,
    OfflineNotifications,
};
use updockly_ports::Store;

use crate::error::EngineError;

/// A heartbeat body, already parsed from whatever wire format an agent
/// uses. Empty strings are treated the same as absent (§4.H: "non-empty
/// scalar fields").
#[derive(Debug, Clone, Default)]
pub struct HeartbeatReport {
    pub hostname: Option<String>,
    pub agent_version: Option<String>,
    pub runtime_version: Option<String>,
    pub platform: Option<String>,
    pub containers: Vec<ContainerSnapshot>,
}

pub struct HeartbeatReconciler<S, C> {
    store: S,
    clock: C,
    offline: Arc<OfflineNotifications>,
}

impl<S, C> HeartbeatReconciler<S, C>
where
    S: Store,
    C: Clock,
{
    pub fn new(store: S, clock: C, offline: Arc<OfflineNotifications>) -> Self {
        Self { store, clock, offline }
    }

    /// Apply an incoming heartbeat: refresh liveness, clear any offline
    /// mark, overwrite non-empty scalar fields, merge the container list.
    pub async fn apply_heartbeat(
        &self,
        agent_id: &AgentId,
        report: HeartbeatReport,
    ) -> Result<(), EngineError> {
        let mut agent = self.store.get_agent(agent_id).await?;
        let now = self.clock.now_utc();

        agent.last_seen = Some(now);
        if let Some(hostname) = non_empty(report.hostname) {
            agent.hostname = hostname;
        }
        if let Some(agent_version) = non_empty(report.agent_version) {
            agent.agent_version = agent_version;
        }
        if let Some(runtime_version) = non_empty(report.runtime_version) {
            agent.runtime_version = runtime_version;
        }
        if let Some(platform) = non_empty(report.platform) {
            agent.platform = platform;
        }
        agent.containers = merge_snapshots(&agent.containers, report.containers);
        agent.updated_at = now;

        self.store.upsert_agent(agent).await?;
        self.offline.delete(agent_id);
        Ok(())
    }

    /// §4.G/§4.H: fold a command report into the agent's container
    /// snapshot list. Called by `CommandQueue::report` after the
    /// command's own status transition has been persisted.
    pub async fn apply_command_report(
        &self,
        agent_id: &AgentId,
        command: &AgentCommand,
        status: CommandStatus,
        result: Option<&Value>,
        error_message: Option<&str>,
    ) -> Result<(), EngineError> {
        let mut agent = self.store.get_agent(agent_id).await?;
        let now = self.clock.now_utc();

        match (command.kind, status) {
            (CommandType::CheckUpdate, CommandStatus::Completed) => {
                if let Some(result) = result {
                    apply_check_update_result(&mut agent.containers, result, now);
                }
            }
            (CommandType::CheckUpdate, CommandStatus::Error) => {
                if let Some(container_id) = command.target_container() {
                    apply_check_update_error(&mut agent.containers, container_id, error_message, now);
                }
            }
            (CommandType::UpdateContainer | CommandType::RollbackContainer, CommandStatus::Completed) => {
                apply_recreate_result(&mut agent.containers, command.target_container(), result);
            }
            _ => {}
        }

        agent.updated_at = now;
        self.store.upsert_agent(agent).await?;
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// §4.H: for each incoming snapshot, preserve the prior value of
/// `auto_update`/`update_available`/`checked_at` whenever the incoming
/// value is the field's zero value. Unknown incoming ids are appended;
/// prior ids absent from the incoming list are dropped.
fn merge_snapshots(prior: &[ContainerSnapshot], incoming: Vec<ContainerSnapshot>) -> Vec<ContainerSnapshot> {
    let prior_by_id: HashMap<&ContainerId, &ContainerSnapshot> =
        prior.iter().map(|snapshot| (&snapshot.id, snapshot)).collect();

    incoming
        .into_iter()
        .map(|mut snapshot| {
            if let Some(old) = prior_by_id.get(&snapshot.id) {
                if !snapshot.auto_update {
                    snapshot.auto_update = old.auto_update;
                }
                if !snapshot.update_available {
                    snapshot.update_available = old.update_available;
                }
                if snapshot.checked_at.is_none() {
                    snapshot.checked_at = old.checked_at;
                }
            }
            snapshot
        })
        .collect()
}

fn apply_check_update_result(containers: &mut Vec<ContainerSnapshot>, result: &Value, now: chrono::DateTime<chrono::Utc>) {
    let Some(container_id) = result.get("containerId").and_then(Value::as_str) else {
        return;
    };
    let update_available = result.get("updateAvailable").and_then(Value::as_bool).unwrap_or(false);
    let container_id = ContainerId::new(container_id);

    match containers.iter_mut().find(|c| c.id == container_id) {
        Some(existing) => {
            existing.update_available = update_available;
            existing.checked_at = Some(now);
        }
        None => {
            containers.push(ContainerSnapshot {
                id: container_id,
                name: String::new(),
                image: String::new(),
                state: String::new(),
                status: String::new(),
                auto_update: false,
                update_available,
                checked_at: Some(now),
                ports: vec![],
                labels: Default::default(),
            });
        }
    }
}

fn apply_check_update_error(
    containers: &mut [ContainerSnapshot],
    container_id: &str,
    error_message: Option<&str>,
    now: chrono::DateTime<chrono::Utc>,
) {
    let container_id = ContainerId::new(container_id);
    if let Some(existing) = containers.iter_mut().find(|c| c.id == container_id) {
        existing.state = "error".to_string();
        existing.status = error_message.unwrap_or_default().to_string();
        existing.update_available = false;
        existing.checked_at = Some(now);
    }
}

/// §4.H: replace the snapshot for the reported container with the one
/// echoed back in `result.container`, forcing `update_available =
/// false`, preserving `auto_update` from the prior entry unless the
/// result explicitly sets it true. When the agent didn't echo a
/// `container` at all, the prior snapshot's `update_available` is still
/// forced false — the signal that the agent finished but has nothing
/// new to report (see Open Question #3 in DESIGN.md).
fn apply_recreate_result(containers: &mut Vec<ContainerSnapshot>, target: Option<&str>, result: Option<&Value>) {
    let echoed = result.and_then(|r| r.get("container")).cloned();

    match echoed {
        Some(value) => {
            let Ok(mut new_snapshot) = serde_json::from_value::<ContainerSnapshot>(value) else {
                return;
            };
            let prior_auto_update = target
                .map(ContainerId::new)
                .and_then(|id| containers.iter().find(|c| c.id == id))
                .map(|c| c.auto_update)
                .unwrap_or(false);
            if let Some(id) = target {
                containers.retain(|c| c.id.as_str() != id);
            }
            new_snapshot.update_available = false;
            if !new_snapshot.auto_update {
                new_snapshot.auto_update = prior_auto_update;
            }
            containers.push(new_snapshot);
        }
        None => {
            if let Some(id) = target.map(ContainerId::new) {
                if let Some(existing) = containers.iter_mut().find(|c| c.id == id) {
                    existing.update_available = false;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
