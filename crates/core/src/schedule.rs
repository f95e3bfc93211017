// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named cron schedules evaluated by the schedule loop.

use crate::cron::CronEvaluator;
use crate::id::ScheduleId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub name: String,
    pub cron_expression: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    pub fn evaluator(&self) -> CronEvaluator {
        CronEvaluator::parse(&self.cron_expression)
    }
}
