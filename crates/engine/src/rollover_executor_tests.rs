// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rollover executor tests

use super::run_rollover_cycle;
use crate::queue_gate::QueueGate;
use chrono::NaiveDate;
use cw_adapters::{FakePortalClient, PortalCall, PortalError};
use cw_core::{
    DateRange, EngineConfig, FakeClock, NotificationKind, Effect, Rollover, RolloverResult,
    RolloverState, Site,
};
use cw_storage::JsonStore;
use std::time::Duration;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn entry(clock: &FakeClock) -> Rollover {
    Rollover::new(
        "r-1",
        "Labor Day",
        "cg-1",
        4,
        DateRange::new(date(2026, 8, 20), date(2026, 8, 23)),
        DateRange::new(date(2026, 9, 4), date(2026, 9, 7)),
        "OLD123",
        clock,
    )
    .with_max_attempts(3)
}

fn site(id: &str) -> Site {
    Site {
        id: id.to_string(),
        name: format!("Site {}", id),
        site_type: "tent".to_string(),
        price_per_night: 32.0,
        bookable: true,
    }
}

fn config() -> EngineConfig {
    EngineConfig {
        queue_poll_interval: Duration::from_millis(1),
        ..EngineConfig::default()
    }
}

fn gate() -> QueueGate {
    QueueGate::new(&config())
}

fn booking(reference: &str) -> cw_core::BookingConfirmation {
    cw_core::BookingConfirmation {
        reference: reference.to_string(),
        site_id: "7".to_string(),
        range: DateRange::new(date(2026, 9, 4), date(2026, 9, 7)),
    }
}

#[tokio::test]
async fn closed_target_window_consumes_an_attempt() {
    let clock = FakeClock::new();
    let portal = FakePortalClient::new();
    let store = JsonStore::open_temp().unwrap();
    // Default availability: nothing bookable yet

    let output = run_rollover_cycle(&entry(&clock), &portal, &gate(), &store, &config(), &clock)
        .await
        .unwrap();

    assert_eq!(output.entry.attempts, 1);
    assert_eq!(output.entry.state, RolloverState::Active);
    assert_eq!(output.job, Ok("no_later_slot".to_string()));
    // No booking or cancel was attempted
    assert!(output.entry.pending_rebook.is_none());
    assert!(portal
        .calls()
        .iter()
        .all(|c| !matches!(c, PortalCall::CreateBooking { .. } | PortalCall::CancelBooking { .. })));
}

#[tokio::test]
async fn open_window_books_then_cancels_in_order() {
    let clock = FakeClock::new();
    let portal = FakePortalClient::new();
    let store = JsonStore::open_temp().unwrap();
    store.save_rollover(&entry(&clock)).unwrap();

    portal.push_availability(Ok(vec![site("7")]));
    portal.push_booking(Ok(booking("NEW123")));
    portal.push_cancel(Ok(()));

    let output = run_rollover_cycle(&entry(&clock), &portal, &gate(), &store, &config(), &clock)
        .await
        .unwrap();

    assert_eq!(output.entry.state, RolloverState::Success);
    assert_eq!(output.entry.booking_reference, "NEW123");
    assert_eq!(output.entry.new_booking_reference.as_deref(), Some("NEW123"));
    assert!(output.entry.success_date.is_some());
    assert_eq!(output.job, Ok("rebooked:NEW123".to_string()));

    // Create strictly precedes cancel
    let calls = portal.calls();
    let create_at = calls
        .iter()
        .position(|c| matches!(c, PortalCall::CreateBooking { .. }))
        .unwrap();
    let cancel_at = calls
        .iter()
        .position(|c| matches!(c, PortalCall::CancelBooking { .. }))
        .unwrap();
    assert!(create_at < cancel_at);
    assert!(matches!(
        &calls[cancel_at],
        PortalCall::CancelBooking { reference } if reference == "OLD123"
    ));

    // The checkpoint hit disk before the cancel
    let stored = store.load_rollover("r-1").unwrap();
    // (final state was not persisted by the executor; the runtime does that)
    assert_eq!(
        stored.pending_rebook.map(|p| p.new_reference),
        Some("NEW123".to_string())
    );
}

#[tokio::test]
async fn failed_create_leaves_the_old_booking_untouched() {
    let clock = FakeClock::new();
    let portal = FakePortalClient::new();
    let store = JsonStore::open_temp().unwrap();

    portal.push_availability(Ok(vec![site("7")]));
    portal.push_booking(Err(PortalError::Server { status: 503 }));

    let output = run_rollover_cycle(&entry(&clock), &portal, &gate(), &store, &config(), &clock)
        .await
        .unwrap();

    assert_eq!(output.entry.state, RolloverState::Active);
    assert_eq!(output.entry.booking_reference, "OLD123");
    assert_eq!(output.entry.attempts, 0);
    assert!(output.job.is_err());
    assert!(portal
        .calls()
        .iter()
        .all(|c| !matches!(c, PortalCall::CancelBooking { .. })));
}

#[tokio::test]
async fn failed_cancel_after_create_is_an_anomaly() {
    let clock = FakeClock::new();
    let portal = FakePortalClient::new();
    let store = JsonStore::open_temp().unwrap();
    store.save_rollover(&entry(&clock)).unwrap();

    portal.push_availability(Ok(vec![site("7")]));
    portal.push_booking(Ok(booking("NEW456")));
    portal.push_cancel(Err(PortalError::Server { status: 500 }));

    let output = run_rollover_cycle(&entry(&clock), &portal, &gate(), &store, &config(), &clock)
        .await
        .unwrap();

    assert!(matches!(
        &output.entry.state,
        RolloverState::Anomaly { old_reference, new_reference, .. }
            if old_reference == "OLD123" && new_reference == "NEW456"
    ));
    assert_eq!(output.entry.success_date, None);
    assert!(output.job.is_err());
    assert!(output.effects.iter().any(|e| matches!(
        e,
        Effect::Notify {
            kind: NotificationKind::DualBookingAnomaly,
            ..
        }
    )));
}

#[tokio::test]
async fn target_taken_between_check_and_book_is_a_miss() {
    let clock = FakeClock::new();
    let portal = FakePortalClient::new();
    let store = JsonStore::open_temp().unwrap();

    portal.push_availability(Ok(vec![site("7")]));
    portal.push_booking(Err(PortalError::BookingConflict(
        "slot taken".to_string(),
    )));

    let output = run_rollover_cycle(&entry(&clock), &portal, &gate(), &store, &config(), &clock)
        .await
        .unwrap();

    assert_eq!(output.entry.state, RolloverState::Active);
    assert_eq!(output.entry.attempts, 1);
    assert_eq!(output.entry.last_result, Some(RolloverResult::NoLaterSlot));
}

#[tokio::test]
async fn transient_portal_failure_spares_the_attempt_counter() {
    let clock = FakeClock::new();
    let portal = FakePortalClient::new();
    let store = JsonStore::open_temp().unwrap();

    portal.push_availability(Err(PortalError::Timeout));

    let output = run_rollover_cycle(&entry(&clock), &portal, &gate(), &store, &config(), &clock)
        .await
        .unwrap();

    assert_eq!(output.entry.attempts, 0);
    assert_eq!(output.entry.state, RolloverState::Active);
    assert_eq!(output.entry.last_result, Some(RolloverResult::Transient));
    assert!(output.job.is_err());
}

#[tokio::test]
async fn auth_loss_parks_the_entry_in_error() {
    let clock = FakeClock::new();
    let portal = FakePortalClient::new();
    let store = JsonStore::open_temp().unwrap();

    portal.push_availability(Err(PortalError::AuthenticationRequired(
        "session expired".to_string(),
    )));

    let output = run_rollover_cycle(&entry(&clock), &portal, &gate(), &store, &config(), &clock)
        .await
        .unwrap();

    assert!(matches!(output.entry.state, RolloverState::Error { .. }));
    assert_eq!(output.entry.attempts, 0);
}

#[tokio::test]
async fn site_type_filter_applies_to_the_target_window() {
    let clock = FakeClock::new();
    let portal = FakePortalClient::new();
    let store = JsonStore::open_temp().unwrap();

    portal.push_availability(Ok(vec![Site {
        site_type: "rv".to_string(),
        ..site("7")
    }]));

    let e = entry(&clock).with_site_type("tent");
    let output = run_rollover_cycle(&e, &portal, &gate(), &store, &config(), &clock)
        .await
        .unwrap();

    // The only open site has the wrong type: still a miss
    assert_eq!(output.entry.attempts, 1);
    assert_eq!(output.entry.state, RolloverState::Active);
}
