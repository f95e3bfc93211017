// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A small in-memory fleet the CLI exercises the engine against.
//!
//! `updockly-ctl` has no real container runtime or HTTP notifier to talk
//! to, so every subcommand wires the engine up against the same three
//! in-memory fakes the test suites use, seeded with one auto-updating
//! local container, one nightly schedule, and one remote agent.

use std::sync::Arc;

use updockly_core::test_support::{agent, container_snapshot, preference, schedule};
use updockly_core::{ContainerId, OfflineNotifications, SystemClock};
use updockly_engine::{CommandQueue, EngineConfig, HeartbeatReconciler, HistoryRecorder, LocalUpdatePass, NotifyPolicy};
use updockly_ports::notifier::fake::FakeNotifier;
use updockly_ports::runtime::fake::FakeContainerRuntime;
use updockly_ports::runtime::{ContainerConfig, HostConfig, ImageInspect, InspectedContainer};
use updockly_ports::store::fake::FakeStore;
use updockly_ports::Store as _;

use crate::exit_error::ExitError;

fn store_err(err: impl std::fmt::Display) -> ExitError {
    ExitError::new(1, format!("failed to seed demo fleet: {err}"))
}

pub struct Fleet {
    pub runtime: FakeContainerRuntime,
    pub store: FakeStore,
    pub notifier: FakeNotifier,
    pub clock: SystemClock,
    pub config: EngineConfig,
}

pub async fn seeded() -> Result<Fleet, ExitError> {
    let runtime = FakeContainerRuntime::new();
    let store = FakeStore::new();
    let notifier = FakeNotifier::new();

    runtime.seed_container(InspectedContainer {
        id: ContainerId::new("web"),
        name: "web".to_string(),
        image_ref: "nginx:1.25".to_string(),
        config: ContainerConfig::default(),
        host_config: HostConfig::default(),
        network_attachments: vec![],
    });
    runtime.seed_image(
        "nginx:1.25",
        ImageInspect { repo_digests: vec!["sha256:local".to_string()], id: "img-web".to_string() },
    );

    let mut web_preference = preference("web", "web", "nginx:1.25");
    web_preference.auto_update = true;
    store.upsert_preference(web_preference).await.map_err(store_err)?;

    store.upsert_schedule(schedule("nightly", "0 2 * * *")).await.map_err(store_err)?;

    let mut edge = agent("edge-1");
    edge.containers.push(container_snapshot("edge-db", "db", "postgres:16"));
    edge.containers[0].auto_update = true;
    edge.last_seen = Some(chrono::Utc::now());
    store.upsert_agent(edge).await.map_err(store_err)?;

    Ok(Fleet { runtime, store, notifier, clock: SystemClock, config: EngineConfig::default() })
}

impl Fleet {
    pub fn local_pass(&self) -> LocalUpdatePass<FakeContainerRuntime, FakeStore, FakeNotifier, SystemClock> {
        LocalUpdatePass::new(self.runtime.clone(), self.store.clone(), self.history(), self.clock)
    }

    pub fn command_queue(&self) -> CommandQueue<FakeStore, FakeNotifier, SystemClock> {
        let reconciler = HeartbeatReconciler::new(self.store.clone(), self.clock, Arc::new(OfflineNotifications::new()));
        CommandQueue::new(self.store.clone(), self.clock, reconciler, self.history())
    }

    pub fn history(&self) -> HistoryRecorder<FakeStore, FakeNotifier, SystemClock> {
        HistoryRecorder::new(
            self.store.clone(),
            self.notifier.clone(),
            self.clock,
            NotifyPolicy { notify_on_success: true, notify_on_failure: true },
        )
    }
}
