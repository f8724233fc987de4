// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral specifications for the Camp Warden engine.
//!
//! These tests drive the full runtime (scheduler, executors, queue gate,
//! dispatcher) against a scripted portal and fake notification channel,
//! checking the end-to-end contracts a user depends on.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use chrono::NaiveDate;
use cw_adapters::{FakeChannel, FakePortalClient, PortalError};
use cw_core::{
    ChannelConfig, CheckResult, DateRange, DeliveryStatus, EngineConfig, FakeClock, JobStatus,
    NotificationKind, Provider, RolloverState, SequentialIdGen, Site,
};
use cw_engine::{Command, NotificationDispatcher, RolloverSpec, Runtime, RuntimeDeps, WatchSpec};
use cw_storage::{Journal, JsonStore};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    runtime: Runtime<FakePortalClient, FakeClock, SequentialIdGen>,
    portal: FakePortalClient,
    clock: FakeClock,
    channel: FakeChannel,
    journal_path: std::path::PathBuf,
    _dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let journal_path = dir.path().join("journal.jsonl");
    let store = JsonStore::open(dir.path().join("store")).unwrap();
    let journal = Journal::open(&journal_path).unwrap();
    let portal = FakePortalClient::new();
    let clock = FakeClock::new();
    let channel = FakeChannel::new();
    let provider = Provider {
        id: "p-1".to_string(),
        name: "spec channel".to_string(),
        enabled: true,
        config: ChannelConfig::Desktop {},
    };
    let dispatcher =
        NotificationDispatcher::with_channels(vec![(provider, Arc::new(channel.clone()))], 1);
    let config = EngineConfig {
        queue_poll_interval: Duration::from_millis(1),
        ..EngineConfig::default()
    };
    let runtime = Runtime::new(
        RuntimeDeps {
            portal: Arc::new(portal.clone()),
            store,
            journal,
            dispatcher,
            config,
        },
        clock.clone(),
        SequentialIdGen::new("spec"),
    );
    Harness {
        runtime,
        portal,
        clock,
        channel,
        journal_path,
        _dir: dir,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tent_site(id: &str, price: f64) -> Site {
    Site {
        id: id.to_string(),
        name: format!("Site {}", id),
        site_type: "tent".to_string(),
        price_per_night: price,
        bookable: true,
    }
}

async fn run_until_idle(h: &Harness) {
    for handle in h.runtime.run_tick().await.unwrap() {
        handle.await.unwrap();
    }
}

async fn create(h: &Harness, command: Command) -> String {
    let outcome = h.runtime.handle_command(command).await;
    assert!(outcome.success, "create failed: {:?}", outcome.error);
    outcome.data.unwrap()["id"].as_str().unwrap().to_string()
}

// watch/

#[tokio::test]
async fn notify_only_watch_finds_and_notifies_on_schedule() {
    let h = harness();
    h.portal
        .push_availability(Ok(vec![tent_site("7", 35.0)]));

    let id = create(
        &h,
        Command::WatchCreate {
            spec: WatchSpec {
                name: "Summer trip".to_string(),
                campground_id: "cg-42".to_string(),
                range: DateRange::new(date(2026, 7, 3), date(2026, 7, 6)),
                guests: 4,
                site_type: Some("tent".to_string()),
                max_price: Some(40.0),
                check_interval_minutes: 5,
                auto_book: false,
                notify_only: true,
            },
        },
    )
    .await;

    run_until_idle(&h).await;

    let watch = h.runtime.store().load_watch(&id).unwrap();
    assert_eq!(watch.last_result, Some(CheckResult::Found));
    assert_eq!(watch.found_count, 1);
    assert!(watch.active);
    let gap = watch.next_check_at.unwrap() - watch.last_checked_at.unwrap();
    assert_eq!(gap.num_minutes(), 5);

    let notifications = h.runtime.store().list_notifications().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::WatchFound);
    assert_eq!(h.channel.delivered().len(), 1);
}

#[tokio::test]
async fn auto_book_watch_books_the_best_site_and_retires() {
    let h = harness();
    h.portal.push_availability(Ok(vec![
        tent_site("12", 45.0),
        tent_site("7", 30.0),
        tent_site("9", 30.0),
    ]));

    let id = create(
        &h,
        Command::WatchCreate {
            spec: WatchSpec {
                name: "Auto trip".to_string(),
                campground_id: "cg-42".to_string(),
                range: DateRange::new(date(2026, 7, 3), date(2026, 7, 6)),
                guests: 2,
                site_type: None,
                max_price: None,
                check_interval_minutes: 30,
                auto_book: true,
                notify_only: false,
            },
        },
    )
    .await;

    run_until_idle(&h).await;

    let watch = h.runtime.store().load_watch(&id).unwrap();
    assert!(!watch.active, "a fulfilled watch stops running");
    assert_eq!(watch.next_check_at, None);

    // Cheapest site, lowest id on ties
    let booked = h
        .portal
        .calls()
        .iter()
        .find_map(|c| match c {
            cw_adapters::PortalCall::CreateBooking { site_id } => Some(site_id.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(booked, "7");

    let notifications = h.runtime.store().list_notifications().unwrap();
    assert_eq!(notifications[0].kind, NotificationKind::BookingConfirmed);
}

// rollover/

#[tokio::test]
async fn rollover_exhausts_after_max_attempts() {
    let h = harness();

    let id = create(
        &h,
        Command::RolloverCreate {
            spec: RolloverSpec {
                name: "Labor Day".to_string(),
                campground_id: "cg-42".to_string(),
                guests: 4,
                site_type: None,
                current_stay: DateRange::new(date(2026, 8, 20), date(2026, 8, 23)),
                target_stay: DateRange::new(date(2026, 9, 4), date(2026, 9, 7)),
                booking_reference: "OLD123".to_string(),
                check_interval_minutes: 30,
                max_attempts: 3,
            },
        },
    )
    .await;

    // The fake portal reports no availability by default
    for _ in 0..3 {
        run_until_idle(&h).await;
        h.clock.advance(Duration::from_secs(31 * 60));
    }

    let entry = h.runtime.store().load_rollover(&id).unwrap();
    assert_eq!(entry.state, RolloverState::Exhausted);
    assert_eq!(entry.attempts, 3);
    assert_eq!(entry.next_check_at, None);

    // No further scheduling, ever
    let handles = h.runtime.run_tick().await.unwrap();
    assert!(handles.is_empty());

    let notifications = h.runtime.store().list_notifications().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::RolloverExhausted);
}

#[tokio::test]
async fn rollover_books_first_then_cancels_then_finishes() {
    let h = harness();
    h.portal.push_availability(Ok(vec![tent_site("7", 30.0)]));
    h.portal.push_booking(Ok(cw_core::BookingConfirmation {
        reference: "NEW123".to_string(),
        site_id: "7".to_string(),
        range: DateRange::new(date(2026, 9, 4), date(2026, 9, 7)),
    }));
    h.portal.push_cancel(Ok(()));

    let id = create(
        &h,
        Command::RolloverCreate {
            spec: RolloverSpec {
                name: "Labor Day".to_string(),
                campground_id: "cg-42".to_string(),
                guests: 4,
                site_type: None,
                current_stay: DateRange::new(date(2026, 8, 20), date(2026, 8, 23)),
                target_stay: DateRange::new(date(2026, 9, 4), date(2026, 9, 7)),
                booking_reference: "OLD123".to_string(),
                check_interval_minutes: 30,
                max_attempts: 3,
            },
        },
    )
    .await;

    run_until_idle(&h).await;

    let entry = h.runtime.store().load_rollover(&id).unwrap();
    assert_eq!(entry.state, RolloverState::Success);
    assert!(entry.success_date.is_some());
    assert_eq!(entry.new_booking_reference.as_deref(), Some("NEW123"));
    assert_eq!(entry.booking_reference, "NEW123");

    // Create before cancel, and the cancel targets the old reference
    let calls = h.portal.calls();
    let create_at = calls
        .iter()
        .position(|c| matches!(c, cw_adapters::PortalCall::CreateBooking { .. }))
        .unwrap();
    let cancel_at = calls
        .iter()
        .position(|c| {
            matches!(c, cw_adapters::PortalCall::CancelBooking { reference } if reference == "OLD123")
        })
        .unwrap();
    assert!(create_at < cancel_at);

    // Exactly one job record reports the success
    let records = Journal::replay(&h.journal_path).unwrap();
    let successes: Vec<_> = records
        .iter()
        .filter(|r| r.detail.as_deref() == Some("rebooked:NEW123"))
        .collect();
    assert_eq!(successes.len(), 1);
}

#[tokio::test]
async fn failed_cancel_surfaces_a_dual_booking_anomaly() {
    let h = harness();
    h.portal.push_availability(Ok(vec![tent_site("7", 30.0)]));
    h.portal.push_booking(Ok(cw_core::BookingConfirmation {
        reference: "NEW456".to_string(),
        site_id: "7".to_string(),
        range: DateRange::new(date(2026, 9, 4), date(2026, 9, 7)),
    }));
    h.portal
        .push_cancel(Err(PortalError::Server { status: 500 }));

    let id = create(
        &h,
        Command::RolloverCreate {
            spec: RolloverSpec {
                name: "Labor Day".to_string(),
                campground_id: "cg-42".to_string(),
                guests: 4,
                site_type: None,
                current_stay: DateRange::new(date(2026, 8, 20), date(2026, 8, 23)),
                target_stay: DateRange::new(date(2026, 9, 4), date(2026, 9, 7)),
                booking_reference: "OLD123".to_string(),
                check_interval_minutes: 30,
                max_attempts: 3,
            },
        },
    )
    .await;

    run_until_idle(&h).await;

    let entry = h.runtime.store().load_rollover(&id).unwrap();
    assert!(
        matches!(entry.state, RolloverState::Anomaly { .. }),
        "cancel failure must not count as success"
    );
    assert_eq!(entry.success_date, None);

    // Loud, critical notification with both references in the body
    let notifications = h.runtime.store().list_notifications().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::DualBookingAnomaly);
    assert!(notifications[0].body.contains("NEW456"));
    assert!(notifications[0].body.contains("OLD123"));

    // The job record is a failure, not a success
    let records = Journal::replay(&h.journal_path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, JobStatus::Failed);
}

// delivery/

#[tokio::test]
async fn notification_record_survives_channel_failure() {
    let h = harness();
    h.portal.push_availability(Ok(vec![tent_site("7", 30.0)]));
    h.channel.fail_times(10);

    create(
        &h,
        Command::WatchCreate {
            spec: WatchSpec {
                name: "Trip".to_string(),
                campground_id: "cg-42".to_string(),
                range: DateRange::new(date(2026, 7, 3), date(2026, 7, 6)),
                guests: 2,
                site_type: None,
                max_price: None,
                check_interval_minutes: 5,
                auto_book: false,
                notify_only: true,
            },
        },
    )
    .await;

    run_until_idle(&h).await;

    // The in-app record exists even though delivery failed after a retry
    let notifications = h.runtime.store().list_notifications().unwrap();
    assert_eq!(notifications.len(), 1);

    let deliveries = h.runtime.store().list_deliveries().unwrap();
    assert_eq!(deliveries.len(), 1);
    assert!(matches!(
        deliveries[0].status,
        DeliveryStatus::Failed { .. }
    ));
    assert_eq!(deliveries[0].attempts, 2);
}
