// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only record of update attempts, fed to `Notifier` and recaps.

use crate::id::{AgentId, ContainerId, HistoryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySource {
    Local,
    Agent,
    Schedule,
    Manual,
}

crate::simple_display! {
    HistorySource {
        Local => "local",
        Agent => "agent",
        Schedule => "schedule",
        Manual => "manual",
    }
}

impl std::str::FromStr for HistorySource {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "agent" => Ok(Self::Agent),
            "schedule" => Ok(Self::Schedule),
            "manual" => Ok(Self::Manual),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStatus {
    Success,
    Error,
    Warning,
    Info,
}

crate::simple_display! {
    HistoryStatus {
        Success => "success",
        Error => "error",
        Warning => "warning",
        Info => "info",
    }
}

impl std::str::FromStr for HistoryStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            _ => Err(()),
        }
    }
}

/// One row per update attempt. Append-only from the orchestrator's
/// perspective — nothing in this workspace ever mutates an existing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateHistory {
    pub id: HistoryId,
    pub container_id: ContainerId,
    pub container_name: String,
    pub image: String,
    pub image_digest: Option<String>,
    pub agent_id: Option<AgentId>,
    pub agent_name: Option<String>,
    pub source: HistorySource,
    pub status: HistoryStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
