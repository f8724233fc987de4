// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification messages, provider configuration, and delivery audit records
//!
//! The stored message list is authoritative: a message is created and
//! persisted before any delivery attempt, so the in-app view survives
//! channel outages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;

/// Logical event class a notification reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    WatchFound,
    BookingConfirmed,
    BookingFailed,
    RolloverSucceeded,
    RolloverExhausted,
    DualBookingAnomaly,
    AuthRequired,
}

impl NotificationKind {
    /// Delivery urgency for this class of message
    pub fn urgency(&self) -> Urgency {
        match self {
            NotificationKind::WatchFound => Urgency::Important,
            NotificationKind::BookingConfirmed => Urgency::Important,
            NotificationKind::BookingFailed => Urgency::Important,
            NotificationKind::RolloverSucceeded => Urgency::Important,
            NotificationKind::RolloverExhausted => Urgency::Normal,
            NotificationKind::DualBookingAnomaly => Urgency::Critical,
            NotificationKind::AuthRequired => Urgency::Critical,
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NotificationKind::WatchFound => "watch_found",
            NotificationKind::BookingConfirmed => "booking_confirmed",
            NotificationKind::BookingFailed => "booking_failed",
            NotificationKind::RolloverSucceeded => "rollover_succeeded",
            NotificationKind::RolloverExhausted => "rollover_exhausted",
            NotificationKind::DualBookingAnomaly => "dual_booking_anomaly",
            NotificationKind::AuthRequired => "auth_required",
        };
        write!(f, "{}", name)
    }
}

/// Notification urgency level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Normal,
    Important,
    Critical,
}

/// A user-visible notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub urgency: Urgency,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl NotificationMessage {
    pub fn new(
        id: impl Into<String>,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            body: body.into(),
            urgency: kind.urgency(),
            read: false,
            created_at: clock.now_utc(),
        }
    }

    pub fn mark_read(&self) -> Self {
        Self {
            read: true,
            ..self.clone()
        }
    }
}

/// SMTP connection settings for the email channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub from: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Channel-specific provider configuration, dispatched by tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum ChannelConfig {
    Desktop {},
    Email { smtp: SmtpConfig, to: String },
}

impl ChannelConfig {
    pub fn channel_name(&self) -> &'static str {
        match self {
            ChannelConfig::Desktop {} => "desktop",
            ChannelConfig::Email { .. } => "email",
        }
    }
}

/// A configured notification provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub config: ChannelConfig,
}

/// Outcome of one provider delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Failed { error: String },
}

/// Audit record of a delivery attempt for one message through one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub id: String,
    pub message_id: String,
    pub provider_id: String,
    pub status: DeliveryStatus,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
