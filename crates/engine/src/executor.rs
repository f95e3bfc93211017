// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `UpdateExecutor`: the stop → pull → recreate → start → cleanup
//! transition for a single container, with backup-and-rollback on
//! failure (§4.E).
//!
//! Deliberately has no `Store` dependency — it only knows how to talk
//! to a `ContainerRuntime`. The caller (`LocalUpdatePass`) is the one
//! that persists the resulting preference change and history entry,
//! which keeps this the one place in the engine a cyclic
//! executor-records-its-own-outcome dependency would otherwise form.

use futures::StreamExt;
use updockly_core::{Clock, ContainerId};
use updockly_ports::{ContainerRuntime, CreateSpec};

use crate::error::UpdateError;
use crate::progress::{ProgressLine, ProgressSink};

/// Result of a successful update.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub new_id: ContainerId,
    pub name: String,
    pub image_ref: String,
    pub resolved_digest: String,
}

pub struct UpdateExecutor<R, C> {
    runtime: R,
    clock: C,
}

impl<R, C> UpdateExecutor<R, C>
where
    R: ContainerRuntime,
    C: Clock,
{
    pub fn new(runtime: R, clock: C) -> Self {
        Self { runtime, clock }
    }

    pub async fn run(
        &self,
        container_id: &ContainerId,
        sink: &mut ProgressSink<'_>,
    ) -> Result<UpdateOutcome, UpdateError> {
        // 1. INSPECT
        let original = self
            .runtime
            .inspect(container_id)
            .await
            .map_err(|_| UpdateError::fatal("inspect_failed"))?;

        // 2. PULL
        self.pull_with_progress(&original.image_ref, sink)
            .await
            .map_err(|_| UpdateError::fatal("pull_failed"))?;
        let resolved_digest = self.resolve_digest(&original.image_ref).await;

        // 3. STOP
        self.runtime
            .stop(&original.id, None)
            .await
            .map_err(|_| UpdateError::fatal("stop_failed"))?;

        // 4. BACKUP
        let backup_name = format!(
            "{}-updockly-backup-{}",
            original.name,
            self.clock.now_utc().timestamp()
        );
        if self.runtime.rename(&original.id, &backup_name).await.is_err() {
            // Best-effort: try to bring the original back up under its own name.
            let _ = self.runtime.start(&original.id).await;
            return Err(UpdateError::fatal("backup_failed"));
        }
        // Rename preserves id, so the backup now lives at `original.id`.
        let backup_id = original.id.clone();

        // 5. CREATE
        let mut config = original.config.clone();
        let host_config = original.host_config.clone();
        if host_config.is_host_network_mode() {
            config.hostname = None;
            config.domainname = None;
        }
        let create_result = self
            .runtime
            .create(CreateSpec {
                name: original.name.clone(),
                config,
                host_config,
                networks: original.network_attachments.clone(),
            })
            .await;
        let new_id = match create_result {
            Ok(id) => id,
            Err(_) => {
                return Err(self.rollback(&original.name, &backup_id, "create_failed").await);
            }
        };

        // 6. START
        if self.runtime.start(&new_id).await.is_err() {
            let _ = self.runtime.remove(&new_id, true, true).await;
            return Err(self.rollback(&original.name, &backup_id, "start_failed").await);
        }

        // 7. CLEANUP (best-effort)
        if let Err(err) = self.runtime.remove(&backup_id, true, true).await {
            tracing::warn!(container_id = %backup_id, error = %err, "cleanup of backup container failed");
        }

        // 8. DONE
        Ok(UpdateOutcome {
            new_id,
            name: original.name,
            image_ref: original.image_ref,
            resolved_digest,
        })
    }

    async fn pull_with_progress(
        &self,
        image_ref: &str,
        sink: &mut ProgressSink<'_>,
    ) -> Result<(), updockly_ports::RuntimeError> {
        let mut stream = self.runtime.pull(image_ref);
        while let Some(line) = stream.next().await {
            let line = line?;
            sink(ProgressLine::decode(line));
        }
        Ok(())
    }

    /// Best-effort digest lookup: absence never fails the update.
    async fn resolve_digest(&self, image_ref: &str) -> String {
        match self.runtime.image_inspect(image_ref).await {
            Ok(inspect) => inspect
                .repo_digests
                .into_iter()
                .find(|d| !d.is_empty())
                .unwrap_or(inspect.id),
            Err(_) => String::new(),
        }
    }

    /// §4.E rollback procedure. Always returns a `rolled_back=false`
    /// error unless both the rename and the restart of the backup
    /// succeed.
    async fn rollback(&self, original_name: &str, backup_id: &ContainerId, cause: &'static str) -> UpdateError {
        let rename_result = self.runtime.rename(backup_id, original_name).await;
        let start_result = self.runtime.start(backup_id).await;

        match (rename_result, start_result) {
            (Ok(()), Ok(())) => UpdateError::rolled_back(cause, "restored previous container"),
            (Ok(()), Err(start_err)) => UpdateError::rollback_failed(
                cause,
                format!("rollback rename succeeded but restart failed: {start_err}"),
            ),
            (Err(rename_err), Ok(())) => UpdateError::rollback_failed(
                cause,
                format!(
                    "rollback rename failed ({rename_err}); container restarted under backup name"
                ),
            ),
            (Err(rename_err), Err(start_err)) => UpdateError::rollback_failed(
                cause,
                format!("rollback rename failed ({rename_err}) and restart failed ({start_err})"),
            ),
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
