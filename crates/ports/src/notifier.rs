// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Notifier`: best-effort delivery of operator-facing notices (§4.C).
//!
//! A failed notification never aborts the operation it's reporting on —
//! callers log and continue. This mirrors how the desktop-notification
//! adapter in the original orchestration stack was treated: useful
//! signal, not a dependency anything else blocks on.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("notify failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Clone + Send + Sync + 'static {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake;
