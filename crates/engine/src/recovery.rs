// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup reconciliation
//!
//! A crash between booking-create and old-booking-cancel leaves a rollover
//! entry with a persisted checkpoint. Before any scheduling resumes, the
//! stored reference is reconciled against the portal: the dangling old
//! booking is cancelled once, completing the swap, or the entry is parked
//! as an anomaly for the user to resolve.

use crate::error::EngineError;
use cw_adapters::PortalClient;
use cw_core::{Clock, Effect, Rollover, RolloverInput, RolloverState};
use cw_storage::JsonStore;

/// Resolve every interrupted rebook. Returns the updated entries and the
/// effects (notifications, events) the caller must still execute.
pub async fn reconcile_pending_rebooks<P: PortalClient>(
    store: &JsonStore,
    portal: &P,
    clock: &impl Clock,
) -> Result<Vec<(Rollover, Vec<Effect>)>, EngineError> {
    let mut resolved = Vec::new();

    for entry in store.list_rollovers()? {
        if entry.state != RolloverState::Active {
            continue;
        }
        let Some(pending) = entry.pending_rebook.clone() else {
            continue;
        };

        tracing::info!(
            rollover_id = %entry.id,
            old_reference = %entry.booking_reference,
            new_reference = %pending.new_reference,
            "recovering interrupted rebook"
        );

        let input = match portal.cancel_booking(&entry.booking_reference).await {
            Ok(()) => RolloverInput::RebookCommitted,
            Err(error) => RolloverInput::CancelFailed {
                reason: format!("recovery cancel failed: {}", error),
            },
        };

        let (updated, effects) = entry.transition(input, clock);
        store.save_rollover(&updated)?;
        resolved.push((updated, effects));
    }

    Ok(resolved)
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
