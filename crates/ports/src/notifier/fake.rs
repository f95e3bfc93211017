// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `Notifier` double that records every call it received.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::NotifyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub title: String,
    pub message: String,
}

#[derive(Clone, Default)]
pub struct FakeNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
    fail_next: Arc<Mutex<bool>>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_call(&self) {
        *self.fail_next.lock() = true;
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl super::Notifier for FakeNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<(), NotifyError> {
        let mut should_fail = self.fail_next.lock();
        if *should_fail {
            *should_fail = false;
            return Err(NotifyError("simulated notifier failure".to_string()));
        }
        drop(should_fail);
        self.sent.lock().push(SentNotification {
            title: title.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }
}
