// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake channel tests

use super::*;
use cw_core::FakeClock;

fn message(title: &str) -> NotificationMessage {
    NotificationMessage::new(
        "n-1",
        NotificationKind::WatchFound,
        title,
        "body",
        &FakeClock::new(),
    )
}

#[tokio::test]
async fn records_delivered_messages() {
    let channel = FakeChannel::new();
    channel.deliver(&message("first")).await.unwrap();
    channel.deliver(&message("second")).await.unwrap();

    let delivered = channel.delivered();
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].title, "first");
    assert_eq!(delivered[1].title, "second");
}

#[tokio::test]
async fn scripted_failures_are_consumed_then_cleared() {
    let channel = FakeChannel::new();
    channel.fail_times(1);

    assert!(channel.deliver(&message("a")).await.is_err());
    assert!(channel.deliver(&message("b")).await.is_ok());
    assert_eq!(channel.delivered().len(), 1);
}
