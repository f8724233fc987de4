// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watch executor
//!
//! One availability check for one watch: queue-gate admission, a bounded
//! portal call, pure filter/classification, and an optional auto-book of
//! the best matching site. The portal I/O is reduced to a `CheckOutcome`;
//! folding it into the watch happens in the core state machine.

use crate::queue_gate::{Admission, QueueGate};
use cw_adapters::{PortalClient, PortalError};
use cw_core::{
    best_site, AvailabilityQuery, BookingAttempt, BookingRequest, CheckOutcome, Clock,
    EngineConfig, Event, Watch,
};

fn outcome_from_portal_error(error: PortalError) -> CheckOutcome {
    match error {
        PortalError::AuthenticationRequired(reason) => CheckOutcome::AuthRequired { reason },
        other => CheckOutcome::Transient {
            reason: other.to_string(),
        },
    }
}

pub(crate) async fn run_watch_check<P: PortalClient>(
    watch: &Watch,
    portal: &P,
    gate: &QueueGate,
    config: &EngineConfig,
    clock: &impl Clock,
) -> (CheckOutcome, Vec<Event>) {
    // Queue admission first; availability and booking calls stay behind it
    let (admission, events) = match gate.admit(portal, clock).await {
        Ok(result) => result,
        Err(error) => return (outcome_from_portal_error(error), Vec::new()),
    };

    if let Admission::WaitTooLong { estimated_wait } = admission {
        return (
            CheckOutcome::Transient {
                reason: format!(
                    "queue wait of {}s exceeds the configured ceiling",
                    estimated_wait.as_secs()
                ),
            },
            events,
        );
    }

    let query = AvailabilityQuery {
        campground_id: watch.campground_id.clone(),
        range: watch.range,
        guests: watch.guests,
        site_type: watch.site_type.clone(),
    };

    let sites = match tokio::time::timeout(config.portal_timeout, portal.check_availability(&query))
        .await
    {
        // A timed-out check is a transient error, never "not found"
        Err(_elapsed) => return (outcome_from_portal_error(PortalError::Timeout), events),
        Ok(Err(error)) => return (outcome_from_portal_error(error), events),
        Ok(Ok(sites)) => sites,
    };

    let matching = watch.matching_sites(&sites);
    if matching.is_empty() {
        return (CheckOutcome::NotFound, events);
    }

    if !watch.auto_book {
        return (
            CheckOutcome::Found {
                matching: matching.len(),
                booking: None,
            },
            events,
        );
    }

    let Some(site) = best_site(&matching) else {
        return (CheckOutcome::NotFound, events);
    };
    let request = BookingRequest {
        campground_id: watch.campground_id.clone(),
        site_id: site.id.clone(),
        range: watch.range,
        guests: watch.guests,
    };

    let booking = match tokio::time::timeout(config.portal_timeout, portal.create_booking(&request))
        .await
    {
        Ok(Ok(confirmation)) => Some(BookingAttempt::Booked(confirmation)),
        // The site was taken between check and book: a plain miss, the
        // watch keeps running
        Ok(Err(PortalError::BookingConflict(reason))) => {
            tracing::info!(watch_id = %watch.id, reason = %reason, "site taken before booking");
            return (CheckOutcome::NotFound, events);
        }
        Ok(Err(PortalError::AuthenticationRequired(reason))) => {
            return (CheckOutcome::AuthRequired { reason }, events)
        }
        Ok(Err(error)) => Some(BookingAttempt::Failed {
            reason: error.to_string(),
        }),
        Err(_elapsed) => Some(BookingAttempt::Failed {
            reason: PortalError::Timeout.to_string(),
        }),
    };

    (
        CheckOutcome::Found {
            matching: matching.len(),
            booking,
        },
        events,
    )
}

#[cfg(test)]
#[path = "watch_executor_tests.rs"]
mod tests;
