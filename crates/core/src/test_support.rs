// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::agent::{Agent, ContainerSnapshot};
use crate::command::{AgentCommand, CommandType};
use crate::id::{AgentId, ContainerId};
use crate::preference::ContainerPreference;
use crate::schedule::Schedule;
use chrono::{DateTime, Utc};
use serde_json::json;

pub fn epoch(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

pub fn container_snapshot(id: &str, name: &str, image: &str) -> ContainerSnapshot {
    ContainerSnapshot {
        id: ContainerId::new(id),
        name: name.to_string(),
        image: image.to_string(),
        state: "running".to_string(),
        status: "Up 2 hours".to_string(),
        auto_update: false,
        update_available: false,
        checked_at: None,
        ports: vec![],
        labels: Default::default(),
    }
}

pub fn agent(name: &str) -> Agent {
    let now = epoch(1_700_000_000);
    Agent {
        id: AgentId::new(),
        name: name.to_string(),
        hostname: format!("{name}.local"),
        platform: "linux/amd64".to_string(),
        agent_version: "0.1.0".to_string(),
        runtime_version: "24.0.0".to_string(),
        token_hash: "deadbeef".to_string(),
        token_version: 1,
        token_expires_at: now + chrono::Duration::days(365),
        token_binding: None,
        last_seen: None,
        containers: vec![],
        tls_enabled: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn preference(id: &str, name: &str, image: &str) -> ContainerPreference {
    ContainerPreference::new(ContainerId::new(id), name, image, epoch(1_700_000_000))
}

pub fn schedule(name: &str, cron_expression: &str) -> Schedule {
    let now = epoch(1_700_000_000);
    Schedule {
        id: crate::id::ScheduleId::new(),
        name: name.to_string(),
        cron_expression: cron_expression.to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub fn command(agent_id: AgentId, kind: CommandType, container_id: &str) -> AgentCommand {
    AgentCommand::new(agent_id, kind, json!({ "containerId": container_id }), epoch(1_700_000_000))
}
