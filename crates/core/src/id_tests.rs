// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_ids_are_unique() {
    assert_ne!(AgentId::new(), AgentId::new());
}

#[test]
fn round_trips_through_display_and_from_string() {
    let id = ScheduleId::new();
    let parsed = ScheduleId::from_string(id.to_string());
    assert_eq!(id, parsed);
}

#[test]
fn malformed_string_maps_to_nil_instead_of_panicking() {
    let a = CommandId::from_string("not-a-uuid");
    let b = CommandId::from_string("also not a uuid");
    assert_eq!(a, b);
}

#[test]
fn container_id_preserves_arbitrary_runtime_strings() {
    let id = ContainerId::from("3f8a9c2b1d0e");
    assert_eq!(id.as_str(), "3f8a9c2b1d0e");
    assert_eq!(id.to_string(), "3f8a9c2b1d0e");
}
