// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ContainerRuntime`: the capability port over a host's container engine.
//!
//! All operations fail with [`RuntimeError::NotFound`] when the referenced
//! container or image no longer exists, so `LocalUpdatePass` can
//! distinguish drift (§4.F) from a merely transient failure.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;
use thiserror::Error;
use updockly_core::ContainerId;

/// Errors surfaced by a `ContainerRuntime` implementation.
///
/// Every variant carries the short operation tag the propagation policy
/// in the design calls for (e.g. `"stop container"`), so history/log
/// messages stay meaningful without leaking implementation internals.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{operation}: not found: {target}")]
    NotFound { operation: &'static str, target: String },

    #[error("{operation}: {message}")]
    Transient { operation: &'static str, message: String },
}

impl RuntimeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RuntimeError::NotFound { .. })
    }
}

/// Container process/image configuration, as returned by `inspect` and
/// fed back into `create` unchanged (plus the host-network edge case in
/// §4.E step 5). Kept as an opaque JSON blob for everything this engine
/// doesn't need to reason about, with the two fields it does need to
/// read/mutate pulled out.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ContainerConfig {
    pub hostname: Option<String>,
    pub domainname: Option<String>,
    #[serde(flatten)]
    pub extra: Value,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct HostConfig {
    pub network_mode: Option<String>,
    #[serde(flatten)]
    pub extra: Value,
}

impl HostConfig {
    /// The runtime rejects combining `hostname`/`domainname` with host
    /// networking — see §4.E step 5.
    pub fn is_host_network_mode(&self) -> bool {
        self.network_mode.as_deref().map(|m| m.eq_ignore_ascii_case("host")).unwrap_or(false)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NetworkAttachment {
    pub network_name: String,
    #[serde(default)]
    pub endpoint: Value,
}

#[derive(Debug, Clone)]
pub struct InspectedContainer {
    pub id: ContainerId,
    pub name: String,
    pub image_ref: String,
    pub config: ContainerConfig,
    pub host_config: HostConfig,
    pub network_attachments: Vec<NetworkAttachment>,
}

#[derive(Debug, Clone, Default)]
pub struct ImageInspect {
    pub repo_digests: Vec<String>,
    pub id: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PruneResult {
    pub removed_count: u64,
    pub reclaimed_bytes: u64,
}

/// Bundled arguments for `create`, grouped the way `inspect` hands them
/// back so a caller can round-trip config → create with minimal editing.
pub struct CreateSpec {
    pub name: String,
    pub config: ContainerConfig,
    pub host_config: HostConfig,
    pub networks: Vec<NetworkAttachment>,
}

#[async_trait]
pub trait ContainerRuntime: Clone + Send + Sync + 'static {
    async fn list_all(&self) -> Result<Vec<InspectedContainer>, RuntimeError>;
    async fn inspect(&self, id: &ContainerId) -> Result<InspectedContainer, RuntimeError>;

    /// Lazy byte stream of pull progress lines; each item is a raw line
    /// of output (JSON or not — decoding is the caller's job, per §4.E).
    fn pull(&self, image_ref: &str) -> BoxStream<'static, Result<String, RuntimeError>>;

    async fn stop(&self, id: &ContainerId, grace_seconds: Option<u32>) -> Result<(), RuntimeError>;
    async fn start(&self, id: &ContainerId) -> Result<(), RuntimeError>;
    async fn rename(&self, id: &ContainerId, new_name: &str) -> Result<(), RuntimeError>;
    async fn remove(
        &self,
        id: &ContainerId,
        force: bool,
        remove_volumes: bool,
    ) -> Result<(), RuntimeError>;
    async fn create(&self, spec: CreateSpec) -> Result<ContainerId, RuntimeError>;
    async fn image_inspect(&self, image_ref: &str) -> Result<ImageInspect, RuntimeError>;
    async fn distribution_inspect(&self, image_ref: &str) -> Result<String, RuntimeError>;
    async fn logs(&self, id: &ContainerId, tail: Option<u32>) -> Result<String, RuntimeError>;
    async fn prune_images(&self) -> Result<PruneResult, RuntimeError>;
    async fn ping(&self) -> Result<(), RuntimeError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake;
