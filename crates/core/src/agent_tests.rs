// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support;

#[test]
fn never_connected_is_not_online() {
    let agent = test_support::agent("a1");
    assert!(!agent.has_ever_connected());
    assert!(!agent.is_online(test_support::epoch(2_000_000_000), chrono::Duration::minutes(5)));
}

#[test]
fn online_within_window() {
    let mut agent = test_support::agent("a1");
    let now = test_support::epoch(1_700_000_000);
    agent.last_seen = Some(now);
    assert!(agent.is_online(now + chrono::Duration::minutes(4), chrono::Duration::minutes(5)));
    assert!(!agent.is_online(now + chrono::Duration::minutes(6), chrono::Duration::minutes(5)));
}

#[test]
fn find_container_by_id() {
    let mut agent = test_support::agent("a1");
    agent.containers.push(test_support::container_snapshot("c1", "nginx", "nginx:1"));
    assert!(agent.find_container(&ContainerId::new("c1")).is_some());
    assert!(agent.find_container(&ContainerId::new("missing")).is_none());
}
