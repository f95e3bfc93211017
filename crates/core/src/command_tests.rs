// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::id::AgentId;
use crate::test_support;
use serde_json::json;

#[test]
fn rollback_without_image_is_rejected() {
    let cmd = AgentCommand::new(
        AgentId::new(),
        CommandType::RollbackContainer,
        json!({ "containerId": "c1" }),
        test_support::epoch(1_700_000_000),
    );
    assert!(cmd.validate().is_err());
}

#[test]
fn rollback_with_empty_image_is_rejected() {
    let cmd = AgentCommand::new(
        AgentId::new(),
        CommandType::RollbackContainer,
        json!({ "containerId": "c1", "image": "" }),
        test_support::epoch(1_700_000_000),
    );
    assert!(cmd.validate().is_err());
}

#[test]
fn rollback_with_image_is_accepted() {
    let cmd = AgentCommand::new(
        AgentId::new(),
        CommandType::RollbackContainer,
        json!({ "containerId": "c1", "image": "nginx:1" }),
        test_support::epoch(1_700_000_000),
    );
    assert!(cmd.validate().is_ok());
}

#[test]
fn non_rollback_commands_do_not_require_image() {
    let cmd = test_support::command(AgentId::new(), CommandType::CheckUpdate, "c1");
    assert!(cmd.validate().is_ok());
}

#[test]
fn target_container_reads_payload_field() {
    let cmd = test_support::command(AgentId::new(), CommandType::UpdateContainer, "c1");
    assert_eq!(cmd.target_container(), Some("c1"));
}

#[yare::parameterized(
    check_update = { CommandType::CheckUpdate, "check-update" },
    update = { CommandType::UpdateContainer, "update-container" },
    rollback = { CommandType::RollbackContainer, "rollback-container" },
    start = { CommandType::StartContainer, "start-container" },
    stop = { CommandType::StopContainer, "stop-container" },
    restart = { CommandType::RestartContainer, "restart-container" },
    logs = { CommandType::FetchLogs, "fetch-logs" },
)]
fn command_type_display(kind: CommandType, expected: &str) {
    assert_eq!(kind.to_string(), expected);
}
