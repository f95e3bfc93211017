// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `ContainerRuntime` double for engine tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use parking_lot::Mutex;
use updockly_core::ContainerId;

use super::{
    ContainerConfig, CreateSpec, HostConfig, ImageInspect, InspectedContainer, PruneResult,
    RuntimeError,
};

#[derive(Clone, Default)]
pub struct FakeContainerRuntime {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    containers: HashMap<ContainerId, InspectedContainer>,
    images: HashMap<String, ImageInspect>,
    /// Remote distribution digest by ref, independent of the locally
    /// cached `images` entry so tests can model "a newer image is
    /// available in the registry" without mutating local state.
    remote_digests: HashMap<String, String>,
    next_id: u64,
    /// Images queued to fail `pull` with a transient error, by ref.
    failing_pulls: Vec<String>,
}

impl FakeContainerRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_container(&self, container: InspectedContainer) {
        self.inner.lock().containers.insert(container.id.clone(), container);
    }

    pub fn seed_image(&self, image_ref: impl Into<String>, inspect: ImageInspect) {
        self.inner.lock().images.insert(image_ref.into(), inspect);
    }

    pub fn fail_pull(&self, image_ref: impl Into<String>) {
        self.inner.lock().failing_pulls.push(image_ref.into());
    }

    /// Seed the digest `distribution_inspect` reports for `image_ref`,
    /// independent of any locally cached `ImageInspect` entry.
    pub fn seed_remote_digest(&self, image_ref: impl Into<String>, digest: impl Into<String>) {
        self.inner.lock().remote_digests.insert(image_ref.into(), digest.into());
    }

    pub fn container_count(&self) -> usize {
        self.inner.lock().containers.len()
    }
}

#[async_trait]
impl super::ContainerRuntime for FakeContainerRuntime {
    async fn list_all(&self) -> Result<Vec<InspectedContainer>, RuntimeError> {
        Ok(self.inner.lock().containers.values().cloned().collect())
    }

    async fn inspect(&self, id: &ContainerId) -> Result<InspectedContainer, RuntimeError> {
        self.inner.lock().containers.get(id).cloned().ok_or_else(|| RuntimeError::NotFound {
            operation: "inspect container",
            target: id.as_str().to_string(),
        })
    }

    fn pull(&self, image_ref: &str) -> BoxStream<'static, Result<String, RuntimeError>> {
        if self.inner.lock().failing_pulls.contains(&image_ref.to_string()) {
            return Box::pin(stream::once(async {
                Err(RuntimeError::Transient {
                    operation: "pull image",
                    message: "simulated registry timeout".to_string(),
                })
            }));
        }
        let lines = vec![
            Ok("Pulling from library".to_string()),
            Ok("Download complete".to_string()),
            Ok("Status: Downloaded newer image".to_string()),
        ];
        Box::pin(stream::iter(lines))
    }

    async fn stop(&self, id: &ContainerId, _grace_seconds: Option<u32>) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        inner.containers.get(id).cloned().ok_or_else(|| RuntimeError::NotFound {
            operation: "stop container",
            target: id.as_str().to_string(),
        })?;
        Ok(())
    }

    async fn start(&self, id: &ContainerId) -> Result<(), RuntimeError> {
        let inner = self.inner.lock();
        inner.containers.get(id).ok_or_else(|| RuntimeError::NotFound {
            operation: "start container",
            target: id.as_str().to_string(),
        })?;
        Ok(())
    }

    async fn rename(&self, id: &ContainerId, new_name: &str) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        let container = inner.containers.get_mut(id).ok_or_else(|| RuntimeError::NotFound {
            operation: "rename container",
            target: id.as_str().to_string(),
        })?;
        container.name = new_name.to_string();
        Ok(())
    }

    async fn remove(
        &self,
        id: &ContainerId,
        _force: bool,
        _remove_volumes: bool,
    ) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        inner.containers.remove(id).ok_or_else(|| RuntimeError::NotFound {
            operation: "remove container",
            target: id.as_str().to_string(),
        })?;
        Ok(())
    }

    async fn create(&self, spec: CreateSpec) -> Result<ContainerId, RuntimeError> {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = ContainerId::new(format!("fake-container-{}", inner.next_id));
        let image_ref = spec
            .config
            .extra
            .get("image")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        inner.containers.insert(
            id.clone(),
            InspectedContainer {
                id: id.clone(),
                name: spec.name,
                image_ref,
                config: spec.config,
                host_config: spec.host_config,
                network_attachments: spec.networks,
            },
        );
        Ok(id)
    }

    async fn image_inspect(&self, image_ref: &str) -> Result<ImageInspect, RuntimeError> {
        self.inner.lock().images.get(image_ref).cloned().ok_or_else(|| RuntimeError::NotFound {
            operation: "inspect image",
            target: image_ref.to_string(),
        })
    }

    async fn distribution_inspect(&self, image_ref: &str) -> Result<String, RuntimeError> {
        let inner = self.inner.lock();
        if let Some(digest) = inner.remote_digests.get(image_ref) {
            return Ok(digest.clone());
        }
        inner
            .images
            .get(image_ref)
            .and_then(|img| img.repo_digests.first().cloned())
            .ok_or_else(|| RuntimeError::NotFound {
                operation: "distribution inspect",
                target: image_ref.to_string(),
            })
    }

    async fn logs(&self, id: &ContainerId, _tail: Option<u32>) -> Result<String, RuntimeError> {
        self.inner.lock().containers.get(id).ok_or_else(|| RuntimeError::NotFound {
            operation: "fetch logs",
            target: id.as_str().to_string(),
        })?;
        Ok(String::new())
    }

    async fn prune_images(&self) -> Result<PruneResult, RuntimeError> {
        Ok(PruneResult::default())
    }

    async fn ping(&self) -> Result<(), RuntimeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ContainerRuntime as _;

    #[tokio::test]
    async fn create_then_inspect_round_trips() {
        let runtime = FakeContainerRuntime::new();
        let id = runtime
            .create(CreateSpec {
                name: "web".to_string(),
                config: ContainerConfig::default(),
                host_config: HostConfig::default(),
                networks: Vec::new(),
            })
            .await
            .unwrap();
        let found = runtime.inspect(&id).await.unwrap();
        assert_eq!(found.name, "web");
    }

    #[tokio::test]
    async fn inspect_missing_container_is_not_found() {
        let runtime = FakeContainerRuntime::new();
        let err = runtime.inspect(&ContainerId::new("ghost")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn fail_pull_yields_transient_error() {
        let runtime = FakeContainerRuntime::new();
        runtime.fail_pull("broken:latest");
        let mut progress = runtime.pull("broken:latest");
        use futures::StreamExt;
        let first = progress.next().await.unwrap();
        assert!(first.is_err());
    }
}
