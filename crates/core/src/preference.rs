// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local per-container auto-update configuration.

use crate::id::ContainerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// At any time, exactly one row corresponds to a live local container.
/// On recreation (update, rollback) the row's `id` is reassigned to the
/// new container id rather than a new row being created — see
/// `LocalUpdatePass` drift recovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerPreference {
    pub id: ContainerId,
    pub name: String,
    pub image: String,
    pub auto_update: bool,
    pub update_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContainerPreference {
    pub fn new(id: ContainerId, name: impl Into<String>, image: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            image: image.into(),
            auto_update: false,
            update_available: false,
            created_at: now,
            updated_at: now,
        }
    }
}
