// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `LocalUpdatePass`: iterate local preferences with auto-update on,
//! reconcile identity drift, and invoke `UpdateExecutor` (§4.F).

use updockly_core::{Clock, ContainerId, ContainerPreference, HistoryStatus};
use updockly_ports::{ContainerRuntime, PruneResult, RuntimeError, Store};

use crate::executor::UpdateExecutor;
use crate::history::HistoryRecorder;
use crate::progress::ProgressLine;

/// Outcome of a single preference's availability check, used to decide
/// whether drift recovery or an update attempt follows.
enum Availability {
    Available,
    NotAvailable,
    /// The container id no longer resolves to a live container.
    Drifted,
}

pub struct LocalUpdatePass<R, S, N, C> {
    runtime: R,
    store: S,
    history: HistoryRecorder<S, N, C>,
    clock: C,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PassSummary {
    pub checked: u32,
    pub updated: u32,
    pub failed: u32,
}

impl<R, S, N, C> LocalUpdatePass<R, S, N, C>
where
    R: ContainerRuntime,
    S: Store,
    N: updockly_ports::Notifier,
    C: Clock,
{
    pub fn new(runtime: R, store: S, history: HistoryRecorder<S, N, C>, clock: C) -> Self {
        Self { runtime, store, history, clock }
    }

    pub async fn run(&self, prune_after: bool) -> PassSummary {
        let mut summary = PassSummary::default();

        let preferences = match self.store.list_auto_update_preferences().await {
            Ok(prefs) => prefs,
            Err(err) => {
                tracing::error!(error = %err, "failed to list auto-update preferences");
                return summary;
            }
        };

        for preference in preferences {
            summary.checked += 1;
            self.process_one(preference, &mut summary).await;
        }

        if prune_after {
            match self.runtime.prune_images().await {
                Ok(PruneResult { removed_count, reclaimed_bytes }) => {
                    tracing::info!(removed_count, reclaimed_bytes, "pruned dangling images");
                }
                Err(err) => tracing::warn!(error = %err, "image prune failed"),
            }
        }

        summary
    }

    async fn process_one(&self, preference: ContainerPreference, summary: &mut PassSummary) {
        let availability = self.check_availability(&preference.id, &preference).await;

        let preference = match availability {
            Availability::Drifted => {
                match self.recover_drift(preference).await {
                    Some(updated) => updated,
                    None => return,
                }
            }
            Availability::Available | Availability::NotAvailable => preference,
        };

        let update_available = matches!(
            self.check_availability(&preference.id, &preference).await,
            Availability::Available
        );

        let mut preference = preference;
        preference.update_available = update_available;
        preference.updated_at = self.clock.now_utc();
        if let Err(err) = self.store.upsert_preference(preference.clone()).await {
            tracing::error!(error = %err, "failed to persist update_available flag");
        }

        if !update_available {
            return;
        }

        let executor = UpdateExecutor::new(self.runtime.clone(), self.clock.clone());
        let mut sink = |_: ProgressLine| {};
        match executor.run(&preference.id, &mut sink).await {
            Ok(outcome) => {
                summary.updated += 1;
                let previous_id = preference.id.clone();
                let mut updated_preference = preference.clone();
                updated_preference.id = outcome.new_id.clone();
                updated_preference.name = outcome.name.clone();
                updated_preference.image = outcome.image_ref.clone();
                updated_preference.update_available = false;
                updated_preference.updated_at = self.clock.now_utc();
                if let Err(err) = self.store.upsert_preference(updated_preference).await {
                    tracing::error!(error = %err, "failed to persist post-update preference");
                }
                if previous_id != outcome.new_id {
                    if let Err(err) = self.store.delete_preference(&previous_id).await {
                        tracing::error!(error = %err, "failed to delete stale preference row after update");
                    }
                }

                self.history
                    .record_local_outcome(
                        &outcome.new_id,
                        &outcome.name,
                        &outcome.image_ref,
                        Some(outcome.resolved_digest),
                        HistoryStatus::Success,
                        "update completed".to_string(),
                    )
                    .await;
            }
            Err(err) => {
                summary.failed += 1;
                let status = if err.rolled_back { HistoryStatus::Warning } else { HistoryStatus::Error };
                let message = match (err.rolled_back, &err.rollback_message) {
                    (true, Some(msg)) => format!("update failed ({}); rolled back: {msg}", err.cause),
                    (false, Some(msg)) => format!("update failed ({}); rollback failed: {msg}", err.cause),
                    (_, None) => format!("update failed ({})", err.cause),
                };
                self.history
                    .record_local_outcome(&preference.id, &preference.name, &preference.image, None, status, message)
                    .await;
            }
        }
    }

    /// §4.F step 1: inspect the container, inspect the local image,
    /// compare against the remote distribution digest.
    async fn check_availability(&self, id: &ContainerId, preference: &ContainerPreference) -> Availability {
        let inspected = match self.runtime.inspect(id).await {
            Ok(inspected) => inspected,
            Err(RuntimeError::NotFound { .. }) => return Availability::Drifted,
            Err(err) => {
                tracing::warn!(error = %err, container_id = %id, "container inspect failed; treating as unavailable this cycle");
                return Availability::NotAvailable;
            }
        };

        let local = match self.runtime.image_inspect(&inspected.image_ref).await {
            Ok(local) => local,
            Err(err) => {
                tracing::warn!(error = %err, image = %inspected.image_ref, "local image inspect failed");
                return Availability::NotAvailable;
            }
        };

        let remote_digest = match self.runtime.distribution_inspect(&inspected.image_ref).await {
            Ok(digest) => digest,
            Err(err) => {
                tracing::warn!(error = %err, image = %preference.image, "distribution inspect failed");
                return Availability::NotAvailable;
            }
        };

        let matches_local = local.repo_digests.iter().any(|d| d.contains(&remote_digest));
        if matches_local {
            Availability::NotAvailable
        } else {
            Availability::Available
        }
    }

    /// §4.F step 2: the container id in storage no longer resolves.
    /// Look for a live container matching by name, then by image.
    async fn recover_drift(&self, mut preference: ContainerPreference) -> Option<ContainerPreference> {
        let containers = match self.runtime.list_all().await {
            Ok(containers) => containers,
            Err(err) => {
                tracing::warn!(error = %err, "failed to list containers during drift recovery");
                return None;
            }
        };

        let found = containers
            .iter()
            .find(|c| c.name == preference.name)
            .or_else(|| containers.iter().find(|c| c.image_ref == preference.image));

        let Some(found) = found else {
            // The container is truly gone: disable auto-update on the stale row.
            preference.auto_update = false;
            preference.updated_at = self.clock.now_utc();
            if let Err(err) = self.store.upsert_preference(preference).await {
                tracing::error!(error = %err, "failed to persist disabled auto_update after drift");
            }
            return None;
        };

        if found.id == preference.id {
            return Some(preference);
        }

        match self.store.get_preference(&found.id).await {
            Ok(Some(_)) => {
                // A row already exists under the new id; this one is stale.
                if let Err(err) = self.store.delete_preference(&preference.id).await {
                    tracing::error!(error = %err, "failed to delete stale preference row");
                }
                None
            }
            Ok(None) => {
                let stale_id = preference.id.clone();
                preference.id = found.id.clone();
                preference.name = found.name.clone();
                preference.image = found.image_ref.clone();
                preference.updated_at = self.clock.now_utc();
                if let Err(err) = self.store.delete_preference(&stale_id).await {
                    tracing::error!(error = %err, "failed to delete stale preference row after drift reassignment");
                }
                Some(preference)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to check for existing preference row during drift recovery");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "local_pass_tests.rs"]
mod tests;
