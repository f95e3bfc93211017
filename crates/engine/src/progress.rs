// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress sink contract for long-running pulls.

use serde_json::Value;

/// One line of pull output, already split on newlines by the runtime
/// adapter. JSON lines are decoded before being handed to the sink;
/// anything else is forwarded verbatim.
#[derive(Debug, Clone)]
pub enum ProgressLine {
    Json(Value),
    Raw(String),
}

impl ProgressLine {
    pub fn decode(raw: String) -> Self {
        match serde_json::from_str(&raw) {
            Ok(value) => ProgressLine::Json(value),
            Err(_) => ProgressLine::Raw(raw),
        }
    }
}

/// Invoked from the executing task only — the executor never calls it
/// concurrently with itself, so a plain `FnMut` is enough; no `Send`
/// requirement beyond what the surrounding future already needs.
pub type ProgressSink<'a> = dyn FnMut(ProgressLine) + 'a;
