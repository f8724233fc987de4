// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification model tests

use super::*;
use crate::clock::FakeClock;

#[test]
fn anomalies_and_auth_loss_are_critical() {
    assert_eq!(
        NotificationKind::DualBookingAnomaly.urgency(),
        Urgency::Critical
    );
    assert_eq!(NotificationKind::AuthRequired.urgency(), Urgency::Critical);
    assert_eq!(NotificationKind::WatchFound.urgency(), Urgency::Important);
}

#[test]
fn messages_start_unread_with_kind_urgency() {
    let clock = FakeClock::new();
    let msg = NotificationMessage::new(
        "n-1",
        NotificationKind::DualBookingAnomaly,
        "Two bookings held",
        "Cancel of OLD123 failed after NEW456 was created",
        &clock,
    );

    assert!(!msg.read);
    assert_eq!(msg.urgency, Urgency::Critical);

    let read = msg.mark_read();
    assert!(read.read);
    assert_eq!(read.id, "n-1");
}

#[test]
fn channel_config_serializes_with_a_tag() {
    let config = ChannelConfig::Email {
        smtp: SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            from: "warden@example.com".to_string(),
            username: None,
            password: None,
        },
        to: "camper@example.com".to_string(),
    };

    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["channel"], "email");

    let back: ChannelConfig = serde_json::from_value(json).unwrap();
    assert_eq!(back.channel_name(), "email");
}

#[test]
fn desktop_config_has_its_own_tag() {
    let json = serde_json::to_value(ChannelConfig::Desktop {}).unwrap();
    assert_eq!(json["channel"], "desktop");
}
