// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock unit tests

use super::*;
use chrono::TimeZone;

#[test]
fn fake_clock_advances_both_timelines() {
    let clock = FakeClock::new();
    let start = clock.now();
    let start_utc = clock.now_utc();

    clock.advance(Duration::from_secs(90));

    assert_eq!(clock.now().duration_since(start), Duration::from_secs(90));
    assert_eq!((clock.now_utc() - start_utc).num_seconds(), 90);
}

#[test]
fn fake_clock_starts_at_fixed_timestamp() {
    let epoch = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().unwrap();
    let clock = FakeClock::at(epoch);

    assert_eq!(clock.now_utc(), epoch);

    clock.advance(Duration::from_secs(300));
    assert_eq!((clock.now_utc() - epoch).num_minutes(), 5);
}

#[test]
fn fake_clock_is_shared_across_clones() {
    let clock = FakeClock::new();
    let other = clock.clone();

    clock.advance(Duration::from_secs(10));

    assert_eq!(other.now(), clock.now());
    assert_eq!(other.now_utc(), clock.now_utc());
}

#[test]
fn system_clock_does_not_go_backwards() {
    let clock = SystemClock;
    let a = clock.now();
    let b = clock.now();
    assert!(b >= a);
}
