// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `Store` double for engine tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use updockly_core::{
    Agent, AgentCommand, AgentId, CommandId, CommandStatus, ContainerId, ContainerPreference,
    HistoryId, RunningSnapshot, Schedule, ScheduleId, UpdateHistory,
};

use super::StoreError;

#[derive(Clone, Default)]
pub struct FakeStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    agents: HashMap<AgentId, Agent>,
    preferences: HashMap<ContainerId, ContainerPreference>,
    schedules: HashMap<ScheduleId, Schedule>,
    commands: HashMap<CommandId, AgentCommand>,
    history: Vec<UpdateHistory>,
    snapshots: HashMap<NaiveDate, RunningSnapshot>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history_len(&self) -> usize {
        self.inner.lock().history.len()
    }
}

#[async_trait]
impl super::Store for FakeStore {
    async fn get_agent(&self, id: &AgentId) -> Result<Agent, StoreError> {
        self.inner.lock().agents.get(id).cloned().ok_or_else(|| StoreError::NotFound {
            operation: "get agent",
            target: id.as_str().to_string(),
        })
    }

    async fn list_agents(&self) -> Result<Vec<Agent>, StoreError> {
        Ok(self.inner.lock().agents.values().cloned().collect())
    }

    async fn list_agents_seen_after(&self, threshold: DateTime<Utc>) -> Result<Vec<Agent>, StoreError> {
        Ok(self
            .inner
            .lock()
            .agents
            .values()
            .filter(|a| a.last_seen.map(|seen| seen >= threshold).unwrap_or(false))
            .cloned()
            .collect())
    }

    async fn upsert_agent(&self, agent: Agent) -> Result<(), StoreError> {
        self.inner.lock().agents.insert(agent.id.clone(), agent);
        Ok(())
    }

    async fn get_preference(&self, id: &ContainerId) -> Result<Option<ContainerPreference>, StoreError> {
        Ok(self.inner.lock().preferences.get(id).cloned())
    }

    async fn list_preferences(&self) -> Result<Vec<ContainerPreference>, StoreError> {
        Ok(self.inner.lock().preferences.values().cloned().collect())
    }

    async fn list_auto_update_preferences(&self) -> Result<Vec<ContainerPreference>, StoreError> {
        Ok(self
            .inner
            .lock()
            .preferences
            .values()
            .filter(|p| p.auto_update)
            .cloned()
            .collect())
    }

    async fn upsert_preference(&self, preference: ContainerPreference) -> Result<(), StoreError> {
        self.inner.lock().preferences.insert(preference.id.clone(), preference);
        Ok(())
    }

    async fn delete_preference(&self, id: &ContainerId) -> Result<(), StoreError> {
        self.inner.lock().preferences.remove(id);
        Ok(())
    }

    async fn get_schedule(&self, id: &ScheduleId) -> Result<Schedule, StoreError> {
        self.inner.lock().schedules.get(id).cloned().ok_or_else(|| StoreError::NotFound {
            operation: "get schedule",
            target: id.as_str().to_string(),
        })
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, StoreError> {
        Ok(self.inner.lock().schedules.values().cloned().collect())
    }

    async fn upsert_schedule(&self, schedule: Schedule) -> Result<(), StoreError> {
        self.inner.lock().schedules.insert(schedule.id.clone(), schedule);
        Ok(())
    }

    async fn delete_schedule(&self, id: &ScheduleId) -> Result<(), StoreError> {
        self.inner.lock().schedules.remove(id).ok_or_else(|| StoreError::NotFound {
            operation: "delete schedule",
            target: id.as_str().to_string(),
        })?;
        Ok(())
    }

    async fn enqueue_command(&self, command: AgentCommand) -> Result<(), StoreError> {
        self.inner.lock().commands.insert(command.id.clone(), command);
        Ok(())
    }

    async fn get_command(&self, id: &CommandId) -> Result<AgentCommand, StoreError> {
        self.inner.lock().commands.get(id).cloned().ok_or_else(|| StoreError::NotFound {
            operation: "get command",
            target: id.as_str().to_string(),
        })
    }

    async fn list_pending_or_running_commands(&self, agent_id: &AgentId) -> Result<Vec<AgentCommand>, StoreError> {
        Ok(self
            .inner
            .lock()
            .commands
            .values()
            .filter(|c| {
                &c.agent_id == agent_id
                    && matches!(c.status, CommandStatus::Pending | CommandStatus::Running)
            })
            .cloned()
            .collect())
    }

    async fn claim_next_pending_command(
        &self,
        agent_id: &AgentId,
        now: DateTime<Utc>,
    ) -> Result<Option<AgentCommand>, StoreError> {
        let mut inner = self.inner.lock();
        let next_id = inner
            .commands
            .values()
            .filter(|c| &c.agent_id == agent_id && c.status == CommandStatus::Pending)
            .min_by_key(|c| c.created_at)
            .map(|c| c.id.clone());

        let Some(next_id) = next_id else {
            return Ok(None);
        };
        let Some(command) = inner.commands.get_mut(&next_id) else {
            return Ok(None);
        };
        command.status = CommandStatus::Running;
        command.started_at = Some(now);
        command.updated_at = now;
        Ok(Some(command.clone()))
    }

    async fn update_command_status(
        &self,
        id: &CommandId,
        status: CommandStatus,
        result: Option<serde_json::Value>,
        error_message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let command = inner.commands.get_mut(id).ok_or_else(|| StoreError::NotFound {
            operation: "update command status",
            target: id.as_str().to_string(),
        })?;
        command.status = status;
        command.result = result;
        command.error_message = error_message;
        command.completed_at = Some(now);
        command.updated_at = now;
        Ok(())
    }

    async fn record_history(&self, entry: UpdateHistory) -> Result<HistoryId, StoreError> {
        let mut inner = self.inner.lock();
        let id = entry.id.clone();
        inner.history.push(entry);
        Ok(id)
    }

    async fn list_history(&self, limit: usize) -> Result<Vec<UpdateHistory>, StoreError> {
        let mut inner = self.inner.lock().history.clone();
        inner.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        inner.truncate(updockly_core::paging::clamp_list_limit(limit));
        Ok(inner)
    }

    async fn list_history_for_container(
        &self,
        container_id: &ContainerId,
        limit: usize,
    ) -> Result<Vec<UpdateHistory>, StoreError> {
        let mut matching: Vec<UpdateHistory> = self
            .inner
            .lock()
            .history
            .iter()
            .filter(|h| &h.container_id == container_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(updockly_core::paging::clamp_list_limit(limit));
        Ok(matching)
    }

    async fn upsert_running_snapshot(&self, snapshot: RunningSnapshot) -> Result<(), StoreError> {
        self.inner.lock().snapshots.insert(snapshot.date, snapshot);
        Ok(())
    }

    async fn get_running_snapshot(&self, date: NaiveDate) -> Result<Option<RunningSnapshot>, StoreError> {
        Ok(self.inner.lock().snapshots.get(&date).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store as _;
    use updockly_core::test_support;

    #[tokio::test]
    async fn claim_next_pending_command_is_single_flight() {
        let store = FakeStore::new();
        let agent_id = AgentId::new();
        let command = test_support::command(agent_id.clone(), updockly_core::CommandType::CheckUpdate, "web");
        store.enqueue_command(command.clone()).await.unwrap();

        let now = test_support::epoch(1_700_000_000);
        let first = store.claim_next_pending_command(&agent_id, now).await.unwrap();
        let second = store.claim_next_pending_command(&agent_id, now).await.unwrap();

        assert_eq!(first.as_ref().unwrap().id, command.id);
        assert_eq!(first.unwrap().started_at, Some(now));
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn list_history_zero_limit_uses_the_boundary_default() {
        let store = FakeStore::new();
        for i in 0..600 {
            store
                .record_history(UpdateHistory {
                    id: updockly_core::HistoryId::new(),
                    container_id: ContainerId::new("c"),
                    container_name: "web".to_string(),
                    image: "nginx:1".to_string(),
                    image_digest: None,
                    agent_id: None,
                    agent_name: None,
                    source: updockly_core::HistorySource::Local,
                    status: updockly_core::HistoryStatus::Success,
                    message: format!("entry {i}"),
                    created_at: test_support::epoch(1_700_000_000 + i),
                })
                .await
                .unwrap();
        }

        assert_eq!(store.list_history(0).await.unwrap().len(), 100);
        assert_eq!(store.list_history(10_000).await.unwrap().len(), 500);
    }

    #[tokio::test]
    async fn list_auto_update_preferences_filters() {
        let store = FakeStore::new();
        let mut on = test_support::preference("a", "web", "nginx:latest");
        on.auto_update = true;
        let off = test_support::preference("b", "db", "postgres:16");
        store.upsert_preference(on.clone()).await.unwrap();
        store.upsert_preference(off).await.unwrap();

        let result = store.list_auto_update_preferences().await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, on.id);
    }
}
