// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use updockly_core::test_support::epoch;
use updockly_core::{ContainerId, FakeClock, HistorySource, HistoryStatus};
use updockly_ports::notifier::fake::FakeNotifier;
use updockly_ports::store::fake::FakeStore;
use updockly_ports::Store as _;

use super::*;

fn recorder(policy: NotifyPolicy) -> (HistoryRecorder<FakeStore, FakeNotifier, FakeClock>, FakeStore, FakeNotifier) {
    let store = FakeStore::new();
    let notifier = FakeNotifier::new();
    let clock = FakeClock::at(epoch(1_700_000_000));
    let recorder = HistoryRecorder::new(store.clone(), notifier.clone(), clock, policy);
    (recorder, store, notifier)
}

fn entry(status: HistoryStatus, message: &str) -> HistoryEntry {
    HistoryEntry {
        container_id: ContainerId::new("c1"),
        container_name: "web".to_string(),
        image: "nginx:1".to_string(),
        image_digest: Some("sha256:abc".to_string()),
        agent_id: None,
        agent_name: None,
        source: HistorySource::Local,
        status,
        message: message.to_string(),
    }
}

#[tokio::test]
async fn record_trims_message_before_persisting() {
    let (recorder, store, _notifier) = recorder(NotifyPolicy { notify_on_success: false, notify_on_failure: false });
    recorder.record(entry(HistoryStatus::Success, "  update completed  \n")).await;

    let rows = store.list_history(10).await.unwrap();
    assert_eq!(rows[0].message, "update completed");
}

#[tokio::test]
async fn success_notifies_only_when_policy_enables_it() {
    let (recorder, _store, notifier) = recorder(NotifyPolicy { notify_on_success: true, notify_on_failure: false });
    recorder.record(entry(HistoryStatus::Success, "done")).await;
    tokio::task::yield_now().await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].title.contains("web"));
    assert!(sent[0].message.contains("nginx:1"));
}

#[tokio::test]
async fn success_is_silent_when_notify_on_success_is_off() {
    let (recorder, _store, notifier) = recorder(NotifyPolicy { notify_on_success: false, notify_on_failure: true });
    recorder.record(entry(HistoryStatus::Success, "done")).await;
    tokio::task::yield_now().await;

    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn error_notifies_only_when_policy_enables_it() {
    let (recorder, _store, notifier) = recorder(NotifyPolicy { notify_on_success: false, notify_on_failure: true });
    recorder.record(entry(HistoryStatus::Error, "update failed")).await;
    tokio::task::yield_now().await;

    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn warning_and_info_never_notify_regardless_of_policy() {
    let (recorder, _store, notifier) = recorder(NotifyPolicy { notify_on_success: true, notify_on_failure: true });
    recorder.record(entry(HistoryStatus::Warning, "rolled back")).await;
    recorder.record(entry(HistoryStatus::Info, "cycle summary")).await;
    tokio::task::yield_now().await;

    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn record_local_outcome_sets_local_source_and_no_agent_fields() {
    let (recorder, store, _notifier) = recorder(NotifyPolicy { notify_on_success: false, notify_on_failure: false });
    recorder
        .record_local_outcome(
            &ContainerId::new("c1"),
            "web",
            "nginx:1",
            Some("sha256:abc".to_string()),
            HistoryStatus::Success,
            "update completed".to_string(),
        )
        .await;

    let rows = store.list_history(10).await.unwrap();
    assert_eq!(rows[0].source, HistorySource::Local);
    assert!(rows[0].agent_id.is_none());
}

#[tokio::test]
async fn record_agent_outcome_sets_agent_source_and_fields() {
    let (recorder, store, _notifier) = recorder(NotifyPolicy { notify_on_success: false, notify_on_failure: false });
    let agent_id = updockly_core::AgentId::new();
    recorder
        .record_agent_outcome(
            &ContainerId::new("c1"),
            "web",
            "nginx:1",
            &agent_id,
            Some("edge-1".to_string()),
            HistoryStatus::Success,
            "update completed by agent".to_string(),
        )
        .await;

    let rows = store.list_history(10).await.unwrap();
    assert_eq!(rows[0].source, HistorySource::Agent);
    assert_eq!(rows[0].agent_id, Some(agent_id));
    assert_eq!(rows[0].agent_name.as_deref(), Some("edge-1"));
}

#[tokio::test]
async fn record_schedule_summary_uses_info_status_and_schedule_source() {
    let (recorder, store, _notifier) = recorder(NotifyPolicy { notify_on_success: true, notify_on_failure: true });
    recorder.record_schedule_summary("checked 3, updated 1".to_string()).await;
    tokio::task::yield_now().await;

    let rows = store.list_history(10).await.unwrap();
    assert_eq!(rows[0].status, HistoryStatus::Info);
    assert_eq!(rows[0].source, HistorySource::Schedule);
}

#[test]
fn normalize_source_defaults_to_local_on_absent_or_unknown() {
    assert_eq!(normalize_source(None), HistorySource::Local);
    assert_eq!(normalize_source(Some("  ")), HistorySource::Local);
    assert_eq!(normalize_source(Some("bogus")), HistorySource::Local);
    assert_eq!(normalize_source(Some("agent")), HistorySource::Agent);
}

#[test]
fn normalize_status_defaults_to_success_on_absent_or_unknown() {
    assert_eq!(normalize_status(None), HistoryStatus::Success);
    assert_eq!(normalize_status(Some("")), HistoryStatus::Success);
    assert_eq!(normalize_status(Some("error")), HistoryStatus::Error);
}
