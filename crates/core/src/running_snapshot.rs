// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daily container-count sample, one row per local calendar day.

use crate::id::RunningSnapshotId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningSnapshot {
    pub id: RunningSnapshotId,
    /// Midnight in operator timezone, stored as a calendar date.
    pub date: NaiveDate,
    pub running: u32,
    pub total: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
