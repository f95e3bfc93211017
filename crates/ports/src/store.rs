// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Store`: the capability port over persisted state (§4.B).
//!
//! Reduced to an abstract interface — no schema, no migrations, no SQL
//! dialect leaks through. Implementations are free to back this with
//! whatever they like; every method here is phrased in terms of the
//! domain entities in `updockly_core`, not rows or documents.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use updockly_core::{
    Agent, AgentCommand, AgentId, CommandId, CommandStatus, ContainerId, ContainerPreference,
    HistoryId, RunningSnapshot, Schedule, ScheduleId, UpdateHistory,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{operation}: not found: {target}")]
    NotFound { operation: &'static str, target: String },

    #[error("{operation}: {message}")]
    Backend { operation: &'static str, message: String },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    // -- agents --------------------------------------------------------
    async fn get_agent(&self, id: &AgentId) -> Result<Agent, StoreError>;
    async fn list_agents(&self) -> Result<Vec<Agent>, StoreError>;
    async fn list_agents_seen_after(&self, threshold: DateTime<Utc>) -> Result<Vec<Agent>, StoreError>;
    async fn upsert_agent(&self, agent: Agent) -> Result<(), StoreError>;

    // -- container preferences ------------------------------------------
    async fn get_preference(&self, id: &ContainerId) -> Result<Option<ContainerPreference>, StoreError>;
    async fn list_preferences(&self) -> Result<Vec<ContainerPreference>, StoreError>;
    async fn list_auto_update_preferences(&self) -> Result<Vec<ContainerPreference>, StoreError>;
    async fn upsert_preference(&self, preference: ContainerPreference) -> Result<(), StoreError>;
    async fn delete_preference(&self, id: &ContainerId) -> Result<(), StoreError>;

    // -- schedules -------------------------------------------------------
    async fn get_schedule(&self, id: &ScheduleId) -> Result<Schedule, StoreError>;
    async fn list_schedules(&self) -> Result<Vec<Schedule>, StoreError>;
    async fn upsert_schedule(&self, schedule: Schedule) -> Result<(), StoreError>;
    async fn delete_schedule(&self, id: &ScheduleId) -> Result<(), StoreError>;

    // -- agent commands ----------------------------------------------------
    async fn enqueue_command(&self, command: AgentCommand) -> Result<(), StoreError>;
    async fn get_command(&self, id: &CommandId) -> Result<AgentCommand, StoreError>;

    /// Commands still in flight for an agent — `pending` or `running`.
    /// §4.G's single-flight enqueue check re-validates against this
    /// before inserting a new `check-update`/`update-container`, so a
    /// command already claimed but not yet reported still de-dups.
    async fn list_pending_or_running_commands(
        &self,
        agent_id: &AgentId,
    ) -> Result<Vec<AgentCommand>, StoreError>;

    /// Atomically pop the oldest pending command for an agent and mark it
    /// running with `started_at = now`, so two concurrent claims can
    /// never return the same command (§4.G single-flight invariant).
    async fn claim_next_pending_command(
        &self,
        agent_id: &AgentId,
        now: DateTime<Utc>,
    ) -> Result<Option<AgentCommand>, StoreError>;

    async fn update_command_status(
        &self,
        id: &CommandId,
        status: CommandStatus,
        result: Option<serde_json::Value>,
        error_message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    // -- history -----------------------------------------------------------
    async fn record_history(&self, entry: UpdateHistory) -> Result<HistoryId, StoreError>;
    async fn list_history(&self, limit: usize) -> Result<Vec<UpdateHistory>, StoreError>;
    async fn list_history_for_container(
        &self,
        container_id: &ContainerId,
        limit: usize,
    ) -> Result<Vec<UpdateHistory>, StoreError>;

    // -- running snapshots ---------------------------------------------------
    async fn upsert_running_snapshot(&self, snapshot: RunningSnapshot) -> Result<(), StoreError>;
    async fn get_running_snapshot(&self, date: NaiveDate) -> Result<Option<RunningSnapshot>, StoreError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake;
