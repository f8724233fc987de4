// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription pattern tests

use super::*;

#[test]
fn exact_pattern_matches_only_itself() {
    let pattern = EventPattern::new("watch:found");
    assert!(pattern.matches("watch:found"));
    assert!(!pattern.matches("watch:checked"));
    assert!(!pattern.matches("rollover:success"));
}

#[test]
fn single_wildcard_matches_one_segment() {
    let pattern = EventPattern::new("rollover:*");
    assert!(pattern.matches("rollover:success"));
    assert!(pattern.matches("rollover:anomaly"));
    assert!(!pattern.matches("watch:found"));
}

#[test]
fn star_matches_everything() {
    let pattern = EventPattern::new("*");
    assert!(pattern.matches("watch:found"));
    assert!(pattern.matches("queue:status"));
}

#[test]
fn empty_pattern_matches_nothing() {
    let pattern = EventPattern::new("");
    assert!(!pattern.matches("watch:found"));
}

#[test]
fn subscription_matches_if_any_pattern_does() {
    let sub = Subscription::new(
        "ui",
        vec![
            EventPattern::new("watch:*"),
            EventPattern::new("notification:created"),
        ],
        "UI listener",
    );
    assert!(sub.matches("watch:checked"));
    assert!(sub.matches("notification:created"));
    assert!(!sub.matches("queue:status"));
}
