// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work items dispatched to agents through the pull-based command queue.

use crate::id::{AgentId, CommandId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandType {
    CheckUpdate,
    UpdateContainer,
    RollbackContainer,
    StartContainer,
    StopContainer,
    RestartContainer,
    FetchLogs,
}

crate::simple_display! {
    CommandType {
        CheckUpdate => "check-update",
        UpdateContainer => "update-container",
        RollbackContainer => "rollback-container",
        StartContainer => "start-container",
        StopContainer => "stop-container",
        RestartContainer => "restart-container",
        FetchLogs => "fetch-logs",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Pending,
    Running,
    Completed,
    Error,
}

crate::simple_display! {
    CommandStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Error => "error",
    }
}

/// A unit of work an agent polls for, runs, and reports the result of.
///
/// Transitions are one-way: `Pending -> Running -> {Completed | Error}`.
/// No reversals, and exactly one agent poll may win the `Pending ->
/// Running` transition for a given command (enforced by the `Store`'s
/// claim operation, not by this type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCommand {
    pub id: CommandId,
    pub agent_id: AgentId,
    #[serde(rename = "type")]
    pub kind: CommandType,
    pub status: CommandStatus,
    pub payload: Value,
    pub result: Option<Value>,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgentCommand {
    pub fn new(agent_id: AgentId, kind: CommandType, payload: Value, now: DateTime<Utc>) -> Self {
        Self {
            id: CommandId::new(),
            agent_id,
            kind,
            status: CommandStatus::Pending,
            payload,
            result: None,
            error_message: None,
            started_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// `rollback-container` requires a non-empty `payload.image`.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.kind == CommandType::RollbackContainer {
            let has_image = self
                .payload
                .get("image")
                .and_then(Value::as_str)
                .map(|s| !s.is_empty())
                .unwrap_or(false);
            if !has_image {
                return Err("rollback-container requires a non-empty payload.image");
            }
        }
        Ok(())
    }

    /// Target container id this command acts on, if its payload carries one.
    /// Used by the single-flight de-dup check.
    pub fn target_container(&self) -> Option<&str> {
        self.payload.get("containerId").and_then(Value::as_str)
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
