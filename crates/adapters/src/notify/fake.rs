// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notification channel for testing

use super::{ChannelAdapter, NotifyError};
use async_trait::async_trait;
use cw_core::{NotificationKind, NotificationMessage};
use std::sync::{Arc, Mutex};

/// Recorded delivery
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredMessage {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

/// Fake channel recording deliveries; can be scripted to fail
#[derive(Clone, Default)]
pub struct FakeChannel {
    delivered: Arc<Mutex<Vec<DeliveredMessage>>>,
    fail_remaining: Arc<Mutex<u32>>,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` deliveries fail
    pub fn fail_times(&self, count: u32) {
        *self.fail_remaining.lock().unwrap_or_else(|e| e.into_inner()) = count;
    }

    /// All successfully delivered messages
    pub fn delivered(&self) -> Vec<DeliveredMessage> {
        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl ChannelAdapter for FakeChannel {
    fn channel(&self) -> &'static str {
        "fake"
    }

    async fn deliver(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        {
            let mut remaining = self.fail_remaining.lock().unwrap_or_else(|e| e.into_inner());
            if *remaining > 0 {
                *remaining -= 1;
                return Err(NotifyError::Failed("scripted failure".to_string()));
            }
        }

        self.delivered
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(DeliveredMessage {
                kind: message.kind,
                title: message.title.clone(),
                body: message.body.clone(),
            });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
