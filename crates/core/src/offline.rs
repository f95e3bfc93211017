// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared "have we already told an operator about this" bookkeeping.
//!
//! Used for the recap scheduler's offline-agent detection (§4.K): a
//! plain mutex-guarded set with the two operations the design calls
//! for, set-if-absent and delete. No I/O — this is process-local
//! in-memory state, not a `Store` entity.

use crate::id::AgentId;
use parking_lot::Mutex;
use std::collections::HashSet;

#[derive(Default)]
pub struct OfflineNotifications {
    notified: Mutex<HashSet<AgentId>>,
}

impl OfflineNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `id` if not already present. Returns `true` iff it was
    /// newly added (i.e. the caller should emit a notification).
    pub fn set_if_absent(&self, id: AgentId) -> bool {
        self.notified.lock().insert(id)
    }

    /// Clear a prior mark, e.g. when the agent is seen again.
    pub fn delete(&self, id: &AgentId) {
        self.notified.lock().remove(id);
    }

    pub fn is_marked(&self, id: &AgentId) -> bool {
        self.notified.lock().contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_if_absent_returns_true_once() {
        let offline = OfflineNotifications::new();
        let id = AgentId::new();
        assert!(offline.set_if_absent(id));
        assert!(!offline.set_if_absent(id));
    }

    #[test]
    fn delete_clears_mark() {
        let offline = OfflineNotifications::new();
        let id = AgentId::new();
        offline.set_if_absent(id);
        offline.delete(&id);
        assert!(!offline.is_marked(&id));
    }
}
