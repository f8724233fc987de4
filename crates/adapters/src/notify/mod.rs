// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification channel adapters
//!
//! Each configured provider maps to one channel adapter; the dispatcher
//! resolves adapters by the provider's channel tag.

use async_trait::async_trait;
use cw_core::{ChannelConfig, NotificationMessage};
use std::sync::Arc;
use thiserror::Error;

mod desktop;
mod email;

pub use desktop::DesktopNotifier;
pub use email::EmailChannel;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{DeliveredMessage, FakeChannel};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Failed(String),
    #[error("smtp error: {0}")]
    Smtp(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Adapter trait for notification delivery
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Channel tag, e.g. "desktop" or "email"
    fn channel(&self) -> &'static str;

    /// Deliver one message
    async fn deliver(&self, message: &NotificationMessage) -> Result<(), NotifyError>;
}

/// Build the adapter for a provider's channel configuration
pub fn build_channel(config: &ChannelConfig) -> Arc<dyn ChannelAdapter> {
    match config {
        ChannelConfig::Desktop {} => Arc::new(DesktopNotifier::new()),
        ChannelConfig::Email { smtp, to } => Arc::new(EmailChannel::new(smtp.clone(), to.clone())),
    }
}
