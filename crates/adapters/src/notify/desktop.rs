// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop notifications via notify-send

use super::{ChannelAdapter, NotifyError};
use async_trait::async_trait;
use cw_core::{NotificationMessage, Urgency};
use std::process::Command;

/// Desktop notifier using the freedesktop notify-send tool
#[derive(Clone, Debug, Default)]
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self {
            app_name: "Camp Warden".to_string(),
        }
    }

    fn urgency_flag(urgency: Urgency) -> &'static str {
        match urgency {
            Urgency::Normal => "low",
            Urgency::Important => "normal",
            Urgency::Critical => "critical",
        }
    }
}

#[async_trait]
impl ChannelAdapter for DesktopNotifier {
    fn channel(&self) -> &'static str {
        "desktop"
    }

    async fn deliver(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        let output = Command::new("notify-send")
            .arg("--app-name")
            .arg(&self.app_name)
            .arg("--urgency")
            .arg(Self::urgency_flag(message.urgency))
            .arg(&message.title)
            .arg(&message.body)
            .output()
            .map_err(|e| NotifyError::Failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NotifyError::Failed(stderr.to_string()));
        }

        Ok(())
    }
}
