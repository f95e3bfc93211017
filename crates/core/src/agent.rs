// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A registered fleet member and the container state it last reported.

use crate::id::{AgentId, ContainerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A remote host polling the command queue and sending heartbeats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub hostname: String,
    pub platform: String,
    pub agent_version: String,
    pub runtime_version: String,
    /// One-way digest of the bearer token. The plaintext exists only in
    /// the response immediately after creation/rotation.
    pub token_hash: String,
    pub token_version: u32,
    pub token_expires_at: DateTime<Utc>,
    /// Client IP the token is pinned to. Immutable once set, unless the
    /// token is rotated.
    pub token_binding: Option<String>,
    /// `None` means "never connected", distinct from "offline".
    pub last_seen: Option<DateTime<Utc>>,
    pub containers: Vec<ContainerSnapshot>,
    pub tls_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    /// Has this agent ever connected at all?
    pub fn has_ever_connected(&self) -> bool {
        self.last_seen.is_some()
    }

    /// Online iff it has connected and its last heartbeat is within `window`.
    pub fn is_online(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        matches!(self.last_seen, Some(seen) if now - seen <= window)
    }

    pub fn find_container(&self, id: &ContainerId) -> Option<&ContainerSnapshot> {
        self.containers.iter().find(|c| &c.id == id)
    }

    pub fn find_container_mut(&mut self, id: &ContainerId) -> Option<&mut ContainerSnapshot> {
        self.containers.iter_mut().find(|c| &c.id == id)
    }
}

/// Point-in-time description of one container as known to an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    pub id: ContainerId,
    pub name: String,
    pub image: String,
    pub state: String,
    pub status: String,
    pub auto_update: bool,
    pub update_available: bool,
    pub checked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
