// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rollover executor
//!
//! One check-and-rebook cycle. The ordering inside the swap is a hard
//! invariant: the new booking is created first, the checkpoint is persisted,
//! and only then is the old booking cancelled — the account never drops to
//! zero bookings, and a crash inside the window is recoverable from the
//! stored checkpoint.

use crate::error::EngineError;
use crate::queue_gate::{Admission, QueueGate};
use cw_adapters::{PortalClient, PortalError};
use cw_core::{
    best_site, AvailabilityQuery, BookingRequest, Clock, Effect, EngineConfig, Event, Rollover,
    RolloverInput,
};
use cw_storage::JsonStore;

/// Everything one cycle produced
pub(crate) struct RolloverCycleOutput {
    pub entry: Rollover,
    pub effects: Vec<Effect>,
    pub events: Vec<Event>,
    /// `Ok(detail)` for a completed cycle, `Err(error)` for a failed one
    pub job: Result<String, String>,
}

fn input_from_portal_error(error: PortalError) -> RolloverInput {
    match error {
        PortalError::AuthenticationRequired(reason) => RolloverInput::AuthFailed { reason },
        other => RolloverInput::Transient {
            reason: other.to_string(),
        },
    }
}

fn job_of(input: &RolloverInput, entry: &Rollover) -> Result<String, String> {
    match input {
        RolloverInput::NoLaterSlot => Ok("no_later_slot".to_string()),
        RolloverInput::RebookCommitted => Ok(format!("rebooked:{}", entry.booking_reference)),
        RolloverInput::Transient { reason } => Err(reason.clone()),
        RolloverInput::AuthFailed { reason } => Err(format!("authentication required: {}", reason)),
        RolloverInput::CancelFailed { reason } => Err(format!(
            "cancel failed after rebook; two bookings held: {}",
            reason
        )),
        other => Err(format!("unexpected cycle input: {:?}", other)),
    }
}

pub(crate) async fn run_rollover_cycle<P: PortalClient>(
    entry: &Rollover,
    portal: &P,
    gate: &QueueGate,
    store: &JsonStore,
    config: &EngineConfig,
    clock: &impl Clock,
) -> Result<RolloverCycleOutput, EngineError> {
    let finish = |input: RolloverInput, events: Vec<Event>| {
        let job = job_of(&input, entry);
        let (updated, effects) = entry.transition(input, clock);
        // Success detail needs the post-swap reference
        let job = match &job {
            Ok(detail) if detail.starts_with("rebooked:") => {
                Ok(format!("rebooked:{}", updated.booking_reference))
            }
            other => other.clone(),
        };
        Ok(RolloverCycleOutput {
            entry: updated,
            effects,
            events,
            job,
        })
    };

    // Queue admission gates every portal call in the cycle
    let (admission, events) = match gate.admit(portal, clock).await {
        Ok(result) => result,
        Err(error) => return finish(input_from_portal_error(error), Vec::new()),
    };

    if let Admission::WaitTooLong { estimated_wait } = admission {
        return finish(
            RolloverInput::Transient {
                reason: format!(
                    "queue wait of {}s exceeds the configured ceiling",
                    estimated_wait.as_secs()
                ),
            },
            events,
        );
    }

    // Has the target window opened up yet?
    let query = AvailabilityQuery {
        campground_id: entry.campground_id.clone(),
        range: entry.target_stay,
        guests: entry.guests,
        site_type: entry.site_type.clone(),
    };
    let sites = match tokio::time::timeout(config.portal_timeout, portal.check_availability(&query))
        .await
    {
        Err(_elapsed) => return finish(input_from_portal_error(PortalError::Timeout), events),
        Ok(Err(error)) => return finish(input_from_portal_error(error), events),
        Ok(Ok(sites)) => sites,
    };

    let bookable: Vec<&cw_core::Site> = sites
        .iter()
        .filter(|s| s.bookable)
        .filter(|s| {
            entry
                .site_type
                .as_deref()
                .is_none_or(|wanted| s.site_type == wanted)
        })
        .collect();
    let Some(site) = best_site(&bookable) else {
        return finish(RolloverInput::NoLaterSlot, events);
    };

    // Create the new booking first; a failure here leaves the old booking
    // untouched and the entry simply retries later
    let request = BookingRequest {
        campground_id: entry.campground_id.clone(),
        site_id: site.id.clone(),
        range: entry.target_stay,
        guests: entry.guests,
    };
    let confirmation =
        match tokio::time::timeout(config.portal_timeout, portal.create_booking(&request)).await {
            Err(_elapsed) => return finish(input_from_portal_error(PortalError::Timeout), events),
            Ok(Err(PortalError::BookingConflict(reason))) => {
                tracing::info!(rollover_id = %entry.id, reason = %reason, "target slot taken before booking");
                return finish(RolloverInput::NoLaterSlot, events);
            }
            Ok(Err(error)) => return finish(input_from_portal_error(error), events),
            Ok(Ok(confirmation)) => confirmation,
        };

    // Durable checkpoint before the cancel: a crash from here on is
    // recovered by reconciling the stored reference against the portal
    let (checkpointed, mut effects) = entry.transition(
        RolloverInput::RebookStarted {
            new_reference: confirmation.reference.clone(),
        },
        clock,
    );
    store.save_rollover(&checkpointed)?;

    let cancel_input = match tokio::time::timeout(
        config.portal_timeout,
        portal.cancel_booking(&entry.booking_reference),
    )
    .await
    {
        Ok(Ok(())) => RolloverInput::RebookCommitted,
        Ok(Err(error)) => RolloverInput::CancelFailed {
            reason: error.to_string(),
        },
        Err(_elapsed) => RolloverInput::CancelFailed {
            reason: PortalError::Timeout.to_string(),
        },
    };

    let job = job_of(&cancel_input, &checkpointed);
    let (updated, cancel_effects) = checkpointed.transition(cancel_input, clock);
    effects.extend(cancel_effects);
    let job = match &job {
        Ok(detail) if detail.starts_with("rebooked:") => {
            Ok(format!("rebooked:{}", updated.booking_reference))
        }
        other => other.clone(),
    };

    Ok(RolloverCycleOutput {
        entry: updated,
        effects,
        events,
        job,
    })
}

#[cfg(test)]
#[path = "rollover_executor_tests.rs"]
mod tests;
