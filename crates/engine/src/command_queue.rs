// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `AgentCommandQueue`: the pull-based protocol between the control
//! plane and remote agents (§4.G) — create/claim/report, with the
//! single-flight-per-(agent, container, type) invariant.
//!
//! Supplements the distilled spec with an in-memory de-dup index
//! (§10.6 of the expanded spec): the `Store`'s pending-command query
//! remains the source of truth and is re-checked on every enqueue, so
//! the index is a fast-path cache rather than a second system of record.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::{json, Value};
use updockly_core::{
    AgentCommand, AgentId, Clock, CommandId, CommandStatus, CommandType, ContainerId,
};
use updockly_ports::Store;

use crate::error::EngineError;
use crate::heartbeat::HeartbeatReconciler;
use crate::history::{HistoryEntry, HistoryRecorder};
use updockly_core::{HistorySource, HistoryStatus};
use updockly_ports::Notifier;

type InflightKey = (AgentId, String, CommandType);

pub struct CommandQueue<S, N, C> {
    store: S,
    clock: C,
    reconciler: HeartbeatReconciler<S, C>,
    history: HistoryRecorder<S, N, C>,
    inflight: Mutex<HashMap<InflightKey, CommandId>>,
}

/// Outcome of one cycle's worth of agent enqueue attempts, folded into
/// the schedule loop's per-tick history summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentCycleSummary {
    pub checked: u32,
    pub queued: u32,
}

impl<S, N, C> CommandQueue<S, N, C>
where
    S: Store,
    N: Notifier,
    C: Clock,
{
    pub fn new(store: S, clock: C, reconciler: HeartbeatReconciler<S, C>, history: HistoryRecorder<S, N, C>) -> Self {
        Self { store, clock, reconciler, history, inflight: Mutex::new(HashMap::new()) }
    }

    /// Enqueue a command unless one already targets the same
    /// `(agent, container, type)` and hasn't finished yet. Returns
    /// `Ok(None)` when de-duped.
    pub async fn enqueue(
        &self,
        agent_id: &AgentId,
        kind: CommandType,
        payload: Value,
    ) -> Result<Option<AgentCommand>, EngineError> {
        self.store.get_agent(agent_id).await.map_err(|err| {
            if err.is_not_found() {
                EngineError::NotFound { operation: "enqueue command", target: agent_id.as_str() }
            } else {
                err.into()
            }
        })?;

        let container_id = payload.get("containerId").and_then(Value::as_str).map(str::to_string);

        if let Some(container_id) = &container_id {
            let key: InflightKey = (*agent_id, container_id.clone(), kind);
            if self.inflight.lock().contains_key(&key) {
                return Ok(None);
            }
            let pending = self.store.list_pending_or_running_commands(agent_id).await?;
            if pending.iter().any(|c| c.kind == kind && c.target_container() == Some(container_id.as_str())) {
                return Ok(None);
            }
        }

        let now = self.clock.now_utc();
        let command = AgentCommand::new(*agent_id, kind, payload, now);
        command.validate().map_err(|msg| EngineError::Contract(msg.to_string()))?;

        self.store.enqueue_command(command.clone()).await?;
        if let Some(container_id) = container_id {
            self.inflight.lock().insert((*agent_id, container_id, kind), command.id);
        }
        Ok(Some(command))
    }

    /// Atomically claim the oldest pending command for `agent_id`.
    pub async fn claim_next(&self, agent_id: &AgentId) -> Result<Option<AgentCommand>, EngineError> {
        let now = self.clock.now_utc();
        Ok(self.store.claim_next_pending_command(agent_id, now).await?)
    }

    /// Apply a reported result: persist the status transition, run
    /// §4.H reconciliation, and (for update/rollback) record history.
    pub async fn report(
        &self,
        agent_id: &AgentId,
        command_id: &CommandId,
        status: CommandStatus,
        result: Option<Value>,
        error_message: Option<String>,
    ) -> Result<(), EngineError> {
        if !matches!(status, CommandStatus::Completed | CommandStatus::Error) {
            return Err(EngineError::Contract("report status must be completed or error".to_string()));
        }

        let command = self.store.get_command(command_id).await?;
        if &command.agent_id != agent_id {
            return Err(EngineError::AgentUnknown {
                command_id: command_id.as_str(),
                agent_id: agent_id.as_str(),
            });
        }

        let now = self.clock.now_utc();
        self.store
            .update_command_status(command_id, status, result.clone(), error_message.clone(), now)
            .await?;

        if let Some(container_id) = command.target_container() {
            self.inflight.lock().remove(&(*agent_id, container_id.to_string(), command.kind));
        }

        self.reconciler
            .apply_command_report(agent_id, &command, status, result.as_ref(), error_message.as_deref())
            .await?;

        if matches!(command.kind, CommandType::UpdateContainer | CommandType::RollbackContainer) {
            self.record_recreate_history(agent_id, &command, status, result.as_ref(), error_message.as_deref())
                .await;
        }

        Ok(())
    }

    async fn record_recreate_history(
        &self,
        agent_id: &AgentId,
        command: &AgentCommand,
        status: CommandStatus,
        result: Option<&Value>,
        error_message: Option<&str>,
    ) {
        let container = result.and_then(|r| r.get("container"));
        let container_id = container
            .and_then(|c| c.get("id")).and_then(Value::as_str)
            .or_else(|| command.target_container())
            .map(ContainerId::new)
            .unwrap_or_else(|| ContainerId::new(""));
        let name = container.and_then(|c| c.get("name")).and_then(Value::as_str).unwrap_or_default().to_string();
        let image = container.and_then(|c| c.get("image")).and_then(Value::as_str).unwrap_or_default().to_string();

        let history_status = if status == CommandStatus::Completed { HistoryStatus::Success } else { HistoryStatus::Error };
        let message = error_message
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} completed by agent", command.kind));

        self.history
            .record(HistoryEntry {
                container_id,
                container_name: name,
                image,
                image_digest: None,
                agent_id: Some(*agent_id),
                agent_name: None,
                source: HistorySource::Agent,
                status: history_status,
                message,
            })
            .await;
    }

    /// §4.G cycle enqueue policy: for each online agent and each of its
    /// `auto_update` container snapshots, enqueue `update-container` if
    /// an update is known available, else `check-update`.
    pub async fn run_agent_cycle(&self, online_window: chrono::Duration) -> AgentCycleSummary {
        let mut summary = AgentCycleSummary::default();
        let now = self.clock.now_utc();

        let agents = match self.store.list_agents_seen_after(now - online_window).await {
            Ok(agents) => agents,
            Err(err) => {
                tracing::error!(error = %err, "failed to list online agents for cycle enqueue");
                return summary;
            }
        };

        for agent in agents {
            for snapshot in agent.containers.iter().filter(|c| c.auto_update) {
                summary.checked += 1;
                let (kind, payload) = if snapshot.update_available {
                    (CommandType::UpdateContainer, json!({ "containerId": snapshot.id.as_str() }))
                } else {
                    (CommandType::CheckUpdate, json!({ "containerId": snapshot.id.as_str() }))
                };
                match self.enqueue(&agent.id, kind, payload).await {
                    Ok(Some(_)) => summary.queued += 1,
                    Ok(None) => {}
                    Err(err) => {
                        tracing::warn!(error = %err, agent_id = %agent.id, "failed to enqueue agent command")
                    }
                }
            }
        }

        summary
    }
}

#[cfg(test)]
#[path = "command_queue_tests.rs"]
mod tests;
