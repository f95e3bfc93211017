// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the orchestration engine (§7).
//!
//! Each variant is the thing a caller needs to decide what happens
//! next — log and continue, trigger drift recovery, or surface to an
//! operator — not a wrapper around whatever a port happened to return.

use thiserror::Error;
use updockly_ports::{NotifyError, RuntimeError, StoreError};

#[derive(Debug, Error)]
pub enum EngineError {
    /// The runtime call failed but the container itself is recoverable.
    #[error("transient runtime error during {operation}: {message}")]
    TransientRuntime { operation: &'static str, message: String },

    /// The referenced container or image no longer exists.
    #[error("{operation}: not found: {target}")]
    NotFound { operation: &'static str, target: String },

    /// A command referenced an agent other than the one presenting it.
    #[error("command {command_id} does not belong to agent {agent_id}")]
    AgentUnknown { command_id: String, agent_id: String },

    /// Invalid status transition or missing required payload field.
    #[error("contract violation: {0}")]
    Contract(String),

    /// The backing store failed.
    #[error("internal error during {operation}: {message}")]
    Internal { operation: &'static str, message: String },
}

impl From<RuntimeError> for EngineError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::NotFound { operation, target } => EngineError::NotFound { operation, target },
            RuntimeError::Transient { operation, message } => {
                EngineError::TransientRuntime { operation, message }
            }
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { operation, target } => EngineError::NotFound { operation, target },
            StoreError::Backend { operation, message } => EngineError::Internal { operation, message },
        }
    }
}

impl From<NotifyError> for EngineError {
    fn from(err: NotifyError) -> Self {
        EngineError::Internal { operation: "notify", message: err.0 }
    }
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound { .. })
    }
}

/// The terminal outcome of an `UpdateExecutor` run: always success, an
/// aborted-with-rollback failure, or a fatal failure, never a bare
/// `EngineError` — §8's rollback-atomicity invariant is encoded in the
/// shape of this type, not asserted after the fact.
#[derive(Debug, Error)]
#[error("update failed: cause={cause} rolled_back={rolled_back}")]
pub struct UpdateError {
    pub cause: &'static str,
    pub rolled_back: bool,
    pub rollback_message: Option<String>,
}

impl UpdateError {
    pub fn fatal(cause: &'static str) -> Self {
        Self { cause, rolled_back: false, rollback_message: None }
    }

    pub fn rolled_back(cause: &'static str, rollback_message: impl Into<String>) -> Self {
        Self { cause, rolled_back: true, rollback_message: Some(rollback_message.into()) }
    }

    pub fn rollback_failed(cause: &'static str, message: impl Into<String>) -> Self {
        Self { cause, rolled_back: false, rollback_message: Some(message.into()) }
    }
}
