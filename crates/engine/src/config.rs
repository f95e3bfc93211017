// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit, constructed engine configuration (§10.4 of the expanded
//! spec). Per the "global mutable process state" design note, nothing
//! in this workspace reads `std::env`/a process-wide timezone default
//! — every value here is a constructor parameter, owned by whichever
//! binary wires the engine up (`updockly-ctl`).

use std::time::Duration;

use chrono::NaiveTime;
use chrono_tz::Tz;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Single timezone used for every cron evaluation and calendar-day
    /// boundary computation this process performs.
    pub operator_timezone: Tz,
    /// §4.I: overall deadline for one schedule cycle.
    pub cycle_timeout: Duration,
    /// §4.G/§4.K: an agent is "online" if seen within this window.
    pub heartbeat_online_window: Duration,
    /// §5: `Notifier` HTTP call deadline for ordinary history notices.
    pub notifier_timeout: Duration,
    /// §5: `Notifier` HTTP call deadline for the daily recap.
    pub recap_notifier_timeout: Duration,
    /// §4.K: wall-clock `HH:MM` the daily recap fires at.
    pub recap_time: NaiveTime,
    /// §4.K: offline-agent detection is silent for this long after start.
    pub offline_grace: Duration,
    /// §4.I/§4.K: the tick period both background loops share.
    pub schedule_tick: Duration,
    /// §4.F: whether to prune dangling images after a local pass.
    pub prune_after_local_pass: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            operator_timezone: Tz::UTC,
            cycle_timeout: Duration::from_secs(15 * 60),
            heartbeat_online_window: Duration::from_secs(5 * 60),
            notifier_timeout: Duration::from_secs(10),
            recap_notifier_timeout: Duration::from_secs(15),
            recap_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            offline_grace: Duration::from_secs(2 * 60),
            schedule_tick: Duration::from_secs(30),
            prune_after_local_pass: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_design_notes() {
        let config = EngineConfig::default();
        assert_eq!(config.cycle_timeout, Duration::from_secs(900));
        assert_eq!(config.heartbeat_online_window, Duration::from_secs(300));
        assert_eq!(config.offline_grace, Duration::from_secs(120));
        assert_eq!(config.schedule_tick, Duration::from_secs(30));
    }
}
