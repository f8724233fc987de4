// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rollover state machine tests

use super::*;
use crate::clock::FakeClock;
use chrono::NaiveDate;
use std::time::Duration;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn entry(clock: &FakeClock) -> Rollover {
    Rollover::new(
        "r-1",
        "Labor Day",
        "cg-42",
        4,
        DateRange::new(date(2026, 8, 20), date(2026, 8, 23)),
        DateRange::new(date(2026, 9, 4), date(2026, 9, 7)),
        "OLD123",
        clock,
    )
    .with_max_attempts(3)
    .with_interval_minutes(30)
}

fn has_notify(effects: &[Effect], kind: NotificationKind) -> bool {
    effects
        .iter()
        .any(|e| matches!(e, Effect::Notify { kind: k, .. } if *k == kind))
}

#[test]
fn new_entry_is_active_and_due() {
    let clock = FakeClock::new();
    let r = entry(&clock);
    assert!(r.validate().is_ok());
    assert_eq!(r.state, RolloverState::Active);
    assert!(r.is_due(clock.now_utc()));
}

#[test]
fn no_later_slot_consumes_an_attempt_and_reschedules() {
    let clock = FakeClock::new();
    let r = entry(&clock);

    let (r, effects) = r.transition(RolloverInput::NoLaterSlot, &clock);

    assert_eq!(r.attempts, 1);
    assert_eq!(r.state, RolloverState::Active);
    assert_eq!(r.last_result, Some(RolloverResult::NoLaterSlot));
    let next = r.next_check_at.unwrap();
    assert_eq!((next - clock.now_utc()).num_minutes(), 30);
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::Emit(Event::RolloverChecked { .. }))));
}

#[test]
fn third_miss_exhausts_a_three_attempt_entry() {
    let clock = FakeClock::new();
    let mut r = entry(&clock);

    for _ in 0..2 {
        let (next, _) = r.transition(RolloverInput::NoLaterSlot, &clock);
        r = next;
        clock.advance(Duration::from_secs(1800));
    }
    assert_eq!(r.state, RolloverState::Active);

    let (r, effects) = r.transition(RolloverInput::NoLaterSlot, &clock);

    assert_eq!(r.state, RolloverState::Exhausted);
    assert_eq!(r.attempts, 3);
    assert_eq!(r.next_check_at, None);
    assert!(!r.is_due(clock.now_utc() + chrono::TimeDelta::days(365)));
    assert!(has_notify(&effects, NotificationKind::RolloverExhausted));
}

#[test]
fn transient_failures_never_consume_attempts() {
    let clock = FakeClock::new();
    let r = entry(&clock);

    let (r, effects) = r.transition(
        RolloverInput::Transient {
            reason: "portal request timed out".to_string(),
        },
        &clock,
    );

    assert_eq!(r.attempts, 0);
    assert_eq!(r.state, RolloverState::Active);
    assert_eq!(r.last_result, Some(RolloverResult::Transient));
    assert!(r.next_check_at.is_some());
    assert!(!has_notify(&effects, NotificationKind::RolloverExhausted));
}

#[test]
fn commit_swaps_references_and_finishes() {
    let clock = FakeClock::new();
    let r = entry(&clock);

    let (r, _) = r.transition(
        RolloverInput::RebookStarted {
            new_reference: "NEW123".to_string(),
        },
        &clock,
    );
    assert_eq!(
        r.pending_rebook.as_ref().map(|p| p.new_reference.as_str()),
        Some("NEW123")
    );

    let (r, effects) = r.transition(RolloverInput::RebookCommitted, &clock);

    assert_eq!(r.state, RolloverState::Success);
    assert_eq!(r.booking_reference, "NEW123");
    assert_eq!(r.new_booking_reference.as_deref(), Some("NEW123"));
    assert_ne!(r.new_booking_reference.as_deref(), Some("OLD123"));
    assert!(r.success_date.is_some());
    assert_eq!(r.pending_rebook, None);
    assert_eq!(r.next_check_at, None);
    assert!(has_notify(&effects, NotificationKind::RolloverSucceeded));
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::Emit(Event::RolloverSucceeded { old_reference, new_reference, .. })
            if old_reference == "OLD123" && new_reference == "NEW123"
    )));
}

#[test]
fn finished_entry_is_never_due_again() {
    let clock = FakeClock::new();
    let r = entry(&clock);
    let (r, _) = r.transition(
        RolloverInput::RebookStarted {
            new_reference: "NEW123".to_string(),
        },
        &clock,
    );
    let (r, _) = r.transition(RolloverInput::RebookCommitted, &clock);

    assert!(!r.is_due(clock.now_utc() + chrono::TimeDelta::days(365)));

    // Activation of a terminal entry is ignored
    let (r, _) = r.transition(RolloverInput::Activate, &clock);
    assert_eq!(r.state, RolloverState::Success);
    assert_eq!(r.next_check_at, None);
}

#[test]
fn cancel_failure_is_an_anomaly_not_a_success() {
    let clock = FakeClock::new();
    let r = entry(&clock);

    let (r, _) = r.transition(
        RolloverInput::RebookStarted {
            new_reference: "NEW456".to_string(),
        },
        &clock,
    );
    let (r, effects) = r.transition(
        RolloverInput::CancelFailed {
            reason: "portal server error: status 500".to_string(),
        },
        &clock,
    );

    assert!(matches!(
        &r.state,
        RolloverState::Anomaly { old_reference, new_reference, .. }
            if old_reference == "OLD123" && new_reference == "NEW456"
    ));
    assert_eq!(r.success_date, None);
    // The old reference is still what the account nominally holds
    assert_eq!(r.booking_reference, "OLD123");
    assert_eq!(r.new_booking_reference, None);
    assert!(has_notify(&effects, NotificationKind::DualBookingAnomaly));
    assert!(!r.is_due(clock.now_utc() + chrono::TimeDelta::days(1)));
}

#[test]
fn auth_loss_pauses_until_reactivation_without_resetting_counters() {
    let clock = FakeClock::new();
    let r = entry(&clock);

    let (r, _) = r.transition(RolloverInput::NoLaterSlot, &clock);
    let (r, effects) = r.transition(
        RolloverInput::AuthFailed {
            reason: "session expired".to_string(),
        },
        &clock,
    );

    assert!(matches!(r.state, RolloverState::Error { .. }));
    assert!(has_notify(&effects, NotificationKind::AuthRequired));
    assert!(!r.is_due(clock.now_utc()));

    let (r, _) = r.transition(RolloverInput::Activate, &clock);
    assert_eq!(r.state, RolloverState::Active);
    assert_eq!(r.attempts, 1);
    assert!(r.is_due(clock.now_utc()));
}

#[test]
fn deactivate_suppresses_scheduling_only() {
    let clock = FakeClock::new();
    let r = entry(&clock);

    let (r, _) = r.transition(RolloverInput::Deactivate, &clock);
    assert_eq!(r.state, RolloverState::Inactive);
    assert_eq!(r.next_check_at, None);

    let (r, _) = r.transition(RolloverInput::Activate, &clock);
    assert_eq!(r.state, RolloverState::Active);
    assert!(r.is_due(clock.now_utc()));
}

#[test]
fn commit_without_checkpoint_is_ignored() {
    let clock = FakeClock::new();
    let r = entry(&clock);

    let (r, effects) = r.transition(RolloverInput::RebookCommitted, &clock);

    assert_eq!(r.state, RolloverState::Active);
    assert_eq!(r.new_booking_reference, None);
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::Log { level: LogLevel::Error, .. })));
}

#[test]
fn validate_rejects_zero_max_attempts() {
    let clock = FakeClock::new();
    let r = entry(&clock).with_max_attempts(0);
    assert_eq!(r.validate(), Err(ValidationError::NoAttempts));
}
