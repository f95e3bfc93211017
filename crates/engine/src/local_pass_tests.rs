// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use updockly_core::test_support::epoch;
use updockly_core::{Clock, FakeClock, HistorySource, HistoryStatus};
use updockly_ports::notifier::fake::FakeNotifier;
use updockly_ports::runtime::fake::FakeContainerRuntime;
use updockly_ports::runtime::{ContainerConfig, HostConfig, ImageInspect, InspectedContainer};
use updockly_ports::store::fake::FakeStore;
use updockly_ports::Store as _;

use super::*;
use crate::history::NotifyPolicy;

fn seeded_runtime(id: &str, name: &str, image_ref: &str, local_digest: &str) -> FakeContainerRuntime {
    let runtime = FakeContainerRuntime::new();
    runtime.seed_container(InspectedContainer {
        id: ContainerId::new(id),
        name: name.to_string(),
        image_ref: image_ref.to_string(),
        config: ContainerConfig::default(),
        host_config: HostConfig::default(),
        network_attachments: vec![],
    });
    runtime.seed_image(image_ref, ImageInspect { repo_digests: vec![local_digest.to_string()], id: "img1".to_string() });
    runtime
}

fn build(
    runtime: FakeContainerRuntime,
    store: FakeStore,
    clock: FakeClock,
) -> LocalUpdatePass<FakeContainerRuntime, FakeStore, FakeNotifier, FakeClock> {
    let history = HistoryRecorder::new(
        store.clone(),
        FakeNotifier::new(),
        clock.clone(),
        NotifyPolicy { notify_on_success: false, notify_on_failure: false },
    );
    LocalUpdatePass::new(runtime, store, history, clock)
}

#[tokio::test]
async fn successful_local_update_records_history_and_reassigns_preference_id() {
    let runtime = seeded_runtime("c1", "web", "nginx:1", "sha256:old");
    runtime.seed_remote_digest("nginx:1", "sha256:new");
    let store = FakeStore::new();
    let clock = FakeClock::at(epoch(1_700_000_000));

    let mut preference = updockly_core::test_support::preference("c1", "web", "nginx:1");
    preference.auto_update = true;
    store.upsert_preference(preference).await.unwrap();

    let pass = build(runtime, store.clone(), clock);
    let summary = pass.run(false).await;

    assert_eq!(summary.checked, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 0);

    let history = store.list_history(10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, HistoryStatus::Success);
    assert_eq!(history[0].source, HistorySource::Local);

    let preferences = store.list_preferences().await.unwrap();
    assert_eq!(preferences.len(), 1);
    assert_ne!(preferences[0].id, ContainerId::new("c1"));
    assert!(!preferences[0].update_available);
}

#[tokio::test]
async fn create_failure_rolls_back_and_records_warning() {
    let runtime = seeded_runtime("c1", "web", "nginx:1", "sha256:old");
    runtime.seed_remote_digest("nginx:1", "sha256:new");

    struct FailingCreateRuntime(FakeContainerRuntime);

    #[async_trait::async_trait]
    impl updockly_ports::ContainerRuntime for FailingCreateRuntime {
        async fn list_all(&self) -> Result<Vec<InspectedContainer>, updockly_ports::RuntimeError> {
            self.0.list_all().await
        }
        async fn inspect(&self, id: &ContainerId) -> Result<InspectedContainer, updockly_ports::RuntimeError> {
            self.0.inspect(id).await
        }
        fn pull(&self, image_ref: &str) -> futures::stream::BoxStream<'static, Result<String, updockly_ports::RuntimeError>> {
            self.0.pull(image_ref)
        }
        async fn stop(&self, id: &ContainerId, grace_seconds: Option<u32>) -> Result<(), updockly_ports::RuntimeError> {
            self.0.stop(id, grace_seconds).await
        }
        async fn start(&self, id: &ContainerId) -> Result<(), updockly_ports::RuntimeError> {
            self.0.start(id).await
        }
        async fn rename(&self, id: &ContainerId, new_name: &str) -> Result<(), updockly_ports::RuntimeError> {
            self.0.rename(id, new_name).await
        }
        async fn remove(&self, id: &ContainerId, force: bool, remove_volumes: bool) -> Result<(), updockly_ports::RuntimeError> {
            self.0.remove(id, force, remove_volumes).await
        }
        async fn create(&self, _spec: updockly_ports::CreateSpec) -> Result<ContainerId, updockly_ports::RuntimeError> {
            Err(updockly_ports::RuntimeError::Transient { operation: "create container", message: "simulated failure".to_string() })
        }
        async fn image_inspect(&self, image_ref: &str) -> Result<ImageInspect, updockly_ports::RuntimeError> {
            self.0.image_inspect(image_ref).await
        }
        async fn distribution_inspect(&self, image_ref: &str) -> Result<String, updockly_ports::RuntimeError> {
            self.0.distribution_inspect(image_ref).await
        }
        async fn logs(&self, id: &ContainerId, tail: Option<u32>) -> Result<String, updockly_ports::RuntimeError> {
            self.0.logs(id, tail).await
        }
        async fn prune_images(&self) -> Result<updockly_ports::PruneResult, updockly_ports::RuntimeError> {
            self.0.prune_images().await
        }
        async fn ping(&self) -> Result<(), updockly_ports::RuntimeError> {
            self.0.ping().await
        }
    }

    impl Clone for FailingCreateRuntime {
        fn clone(&self) -> Self {
            FailingCreateRuntime(self.0.clone())
        }
    }

    let store = FakeStore::new();
    let clock = FakeClock::at(epoch(1_700_000_000));
    let mut preference = updockly_core::test_support::preference("c1", "web", "nginx:1");
    preference.auto_update = true;
    store.upsert_preference(preference).await.unwrap();

    let failing = FailingCreateRuntime(runtime.clone());
    let pass = build(failing, store.clone(), clock);
    let summary = pass.run(false).await;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.updated, 0);

    let history = store.list_history(10).await.unwrap();
    assert_eq!(history[0].status, HistoryStatus::Warning);
    assert!(history[0].message.contains("rolled back"));

    // preference is unchanged: the original container is still the one on file
    let preferences = store.list_preferences().await.unwrap();
    assert_eq!(preferences[0].id, ContainerId::new("c1"));

    let restored = runtime.inspect(&ContainerId::new("c1")).await.unwrap();
    assert_eq!(restored.name, "web");
}

#[tokio::test]
async fn drift_recovery_reassigns_preference_id_without_history() {
    let runtime = FakeContainerRuntime::new();
    runtime.seed_container(InspectedContainer {
        id: ContainerId::new("new-id"),
        name: "nginx".to_string(),
        image_ref: "nginx:1".to_string(),
        config: ContainerConfig::default(),
        host_config: HostConfig::default(),
        network_attachments: vec![],
    });

    let store = FakeStore::new();
    let clock = FakeClock::at(epoch(1_700_000_000));
    let mut preference = updockly_core::test_support::preference("old-id", "nginx", "nginx:1");
    preference.auto_update = true;
    store.upsert_preference(preference).await.unwrap();

    let pass = build(runtime, store.clone(), clock);
    pass.run(false).await;

    let preferences = store.list_preferences().await.unwrap();
    assert_eq!(preferences.len(), 1);
    assert_eq!(preferences[0].id, ContainerId::new("new-id"));

    assert!(store.list_history(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn drift_with_no_matching_container_disables_auto_update() {
    let runtime = FakeContainerRuntime::new();
    let store = FakeStore::new();
    let clock = FakeClock::at(epoch(1_700_000_000));
    let mut preference = updockly_core::test_support::preference("old-id", "nginx", "nginx:1");
    preference.auto_update = true;
    store.upsert_preference(preference).await.unwrap();

    let pass = build(runtime, store.clone(), clock);
    pass.run(false).await;

    let preferences = store.list_preferences().await.unwrap();
    assert_eq!(preferences.len(), 1);
    assert!(!preferences[0].auto_update);
}
