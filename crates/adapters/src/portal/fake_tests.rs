// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake portal client tests

use super::*;
use chrono::NaiveDate;
use cw_core::DateRange;

fn query() -> AvailabilityQuery {
    AvailabilityQuery {
        campground_id: "cg-1".to_string(),
        range: DateRange::new(
            NaiveDate::from_ymd_opt(2026, 7, 3).unwrap(),
            NaiveDate::from_ymd_opt(2026, 7, 6).unwrap(),
        ),
        guests: 2,
        site_type: None,
    }
}

#[tokio::test]
async fn scripted_responses_are_consumed_in_order() {
    let portal = FakePortalClient::new();
    portal.push_availability(Err(PortalError::Timeout));
    portal.push_availability(Ok(vec![]));

    assert_eq!(
        portal.check_availability(&query()).await,
        Err(PortalError::Timeout)
    );
    assert_eq!(portal.check_availability(&query()).await, Ok(vec![]));
    // Queue exhausted: default is no availability
    assert_eq!(portal.check_availability(&query()).await, Ok(vec![]));
    assert_eq!(portal.availability_calls(), 3);
}

#[tokio::test]
async fn default_booking_generates_references() {
    let portal = FakePortalClient::new();
    let request = BookingRequest {
        campground_id: "cg-1".to_string(),
        site_id: "7".to_string(),
        range: query().range,
        guests: 2,
    };

    let a = portal.create_booking(&request).await.unwrap();
    let b = portal.create_booking(&request).await.unwrap();
    assert_ne!(a.reference, b.reference);
}

#[tokio::test]
async fn calls_are_recorded_in_order() {
    let portal = FakePortalClient::new();
    portal.join_queue().await.unwrap();
    portal.cancel_booking("REF-1").await.unwrap();

    assert_eq!(
        portal.calls(),
        vec![
            PortalCall::JoinQueue,
            PortalCall::CancelBooking {
                reference: "REF-1".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn default_queue_ticket_is_admitted() {
    let portal = FakePortalClient::new();
    let ticket = portal.join_queue().await.unwrap();
    assert_eq!(ticket.phase, QueuePhase::Active);
}
