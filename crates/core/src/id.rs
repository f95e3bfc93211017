// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque identifiers.
//!
//! Entities minted by the engine itself (agents, commands, schedules,
//! history rows, running snapshots) get a random 128-bit id via
//! [`crate::define_id!`]. Container identifiers are supplied externally
//! by the container runtime or by a remote agent and are therefore plain
//! opaque strings, not generated values — see [`ContainerId`].

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier for a registered [`crate::agent::Agent`].
    pub struct AgentId;
}

crate::define_id! {
    /// Identifier for an [`crate::command::AgentCommand`].
    pub struct CommandId;
}

crate::define_id! {
    /// Identifier for a [`crate::schedule::Schedule`].
    pub struct ScheduleId;
}

crate::define_id! {
    /// Identifier for an [`crate::history::UpdateHistory`] row.
    pub struct HistoryId;
}

crate::define_id! {
    /// Identifier for a [`crate::snapshot::RunningSnapshot`] row.
    pub struct RunningSnapshotId;
}

/// Opaque container identifier, as reported by a container runtime or a
/// remote agent. Unlike the other ids here, this is never generated by
/// the engine — it is reassigned whenever a container is recreated
/// (see `ContainerPreference` invariants).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ContainerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
