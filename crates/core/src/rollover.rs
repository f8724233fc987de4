// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Advance-booking rollover state machine
//!
//! The portal only opens bookings inside a moving 180-day horizon. A rollover
//! entry holds a placeholder booking and walks it forward: once the target
//! dates become bookable, the executor creates the new booking *first* and
//! only then cancels the old one, so the account never holds zero bookings.
//!
//! If the cancel fails after the create succeeded, the account holds two
//! overlapping bookings. That is recorded as an explicit `Anomaly` state and
//! surfaced loudly — never silently discarded.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::booking::DateRange;
use crate::clock::Clock;
use crate::effect::{Effect, Event, LogLevel};
use crate::error::ValidationError;
use crate::notification::NotificationKind;

/// Persisted rollover state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RolloverState {
    /// Not scheduled; the user can activate it
    Inactive,
    /// Scheduled for periodic checks
    Active,
    /// The booking was rolled over; terminal
    Success,
    /// All attempts used without the target opening up; terminal
    Exhausted,
    /// Unexpected failure (auth loss); reactivation resumes without resetting counters
    Error { reason: String },
    /// Create succeeded but cancel failed: the account holds two bookings.
    /// Terminal pending user or operator attention.
    Anomaly {
        old_reference: String,
        new_reference: String,
        reason: String,
    },
}

impl RolloverState {
    /// Terminal states can never be activated or scheduled again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RolloverState::Success | RolloverState::Exhausted | RolloverState::Anomaly { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            RolloverState::Inactive => "inactive",
            RolloverState::Active => "active",
            RolloverState::Success => "success",
            RolloverState::Exhausted => "exhausted",
            RolloverState::Error { .. } => "error",
            RolloverState::Anomaly { .. } => "anomaly",
        }
    }
}

/// Result classification of the most recent cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloverResult {
    NoLaterSlot,
    Rebooked,
    Transient,
    AuthError,
    CancelFailed,
}

/// Durable checkpoint written after booking-create and before old-booking-cancel.
/// Present on restart ⇒ the process died inside the swap window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingRebook {
    pub new_reference: String,
    pub created_at: DateTime<Utc>,
}

/// Inputs folded into the state machine by the executor
#[derive(Debug, Clone, PartialEq)]
pub enum RolloverInput {
    Activate,
    Deactivate,
    /// The target dates are not bookable yet — the one input that consumes an attempt
    NoLaterSlot,
    /// Portal unreachable / timed out; retried on the normal schedule
    Transient { reason: String },
    /// New booking confirmed; checkpoint before cancelling the old one
    RebookStarted { new_reference: String },
    /// Old booking cancelled; complete the swap
    RebookCommitted,
    /// Old booking could not be cancelled after the new one was created
    CancelFailed { reason: String },
    /// Credentials no longer accepted by the portal
    AuthFailed { reason: String },
}

/// One advance-booking rollover task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rollover {
    pub id: String,
    pub name: String,
    pub campground_id: String,
    pub guests: u32,
    pub site_type: Option<String>,
    /// The placeholder stay currently held
    pub current_stay: DateRange,
    /// The stay the user actually wants, still outside the booking horizon
    pub target_stay: DateRange,
    pub booking_reference: String,
    /// Set exactly once, on success
    pub new_booking_reference: Option<String>,
    pub state: RolloverState,
    pub check_interval_minutes: u32,
    pub attempts: u32,
    pub max_attempts: u32,
    pub last_result: Option<RolloverResult>,
    pub success_date: Option<DateTime<Utc>>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub next_check_at: Option<DateTime<Utc>>,
    pub pending_rebook: Option<PendingRebook>,
    pub created_at: DateTime<Utc>,
}

impl Rollover {
    /// Create a new entry, active and due immediately
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        campground_id: impl Into<String>,
        guests: u32,
        current_stay: DateRange,
        target_stay: DateRange,
        booking_reference: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        let now = clock.now_utc();
        Self {
            id: id.into(),
            name: name.into(),
            campground_id: campground_id.into(),
            guests,
            site_type: None,
            current_stay,
            target_stay,
            booking_reference: booking_reference.into(),
            new_booking_reference: None,
            state: RolloverState::Active,
            check_interval_minutes: 30,
            attempts: 0,
            max_attempts: 10,
            last_result: None,
            success_date: None,
            last_checked_at: None,
            next_check_at: Some(now),
            pending_rebook: None,
            created_at: now,
        }
    }

    pub fn with_site_type(mut self, site_type: impl Into<String>) -> Self {
        self.site_type = Some(site_type.into());
        self
    }

    pub fn with_interval_minutes(mut self, minutes: u32) -> Self {
        self.check_interval_minutes = minutes;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyField { field: "name" });
        }
        if self.campground_id.is_empty() {
            return Err(ValidationError::EmptyField {
                field: "campground_id",
            });
        }
        if self.booking_reference.is_empty() {
            return Err(ValidationError::EmptyField {
                field: "booking_reference",
            });
        }
        if self.guests == 0 {
            return Err(ValidationError::NoGuests);
        }
        if !self.current_stay.is_ordered() {
            return Err(ValidationError::UnorderedDates {
                start: self.current_stay.start,
                end: self.current_stay.end,
            });
        }
        if !self.target_stay.is_ordered() {
            return Err(ValidationError::UnorderedDates {
                start: self.target_stay.start,
                end: self.target_stay.end,
            });
        }
        if self.check_interval_minutes == 0 {
            return Err(ValidationError::IntervalTooShort);
        }
        if self.max_attempts == 0 {
            return Err(ValidationError::NoAttempts);
        }
        Ok(())
    }

    /// Is this entry ready for dispatch? Terminal entries never are.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.state == RolloverState::Active
            && self.success_date.is_none()
            && self.next_check_at.is_some_and(|at| at <= now)
    }

    fn reschedule(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        Some(now + TimeDelta::minutes(i64::from(self.check_interval_minutes)))
    }

    /// Pure transition function - returns the new entry and effects
    pub fn transition(&self, input: RolloverInput, clock: &impl Clock) -> (Rollover, Vec<Effect>) {
        let now = clock.now_utc();
        let mut entry = self.clone();
        let mut effects = Vec::new();

        match (&self.state, input) {
            // Activation from any non-terminal state; counters are kept
            (RolloverState::Inactive | RolloverState::Error { .. }, RolloverInput::Activate) => {
                entry.state = RolloverState::Active;
                entry.next_check_at = Some(now);
            }

            (RolloverState::Active, RolloverInput::Deactivate) => {
                entry.state = RolloverState::Inactive;
                entry.next_check_at = None;
            }

            (RolloverState::Active, RolloverInput::NoLaterSlot) => {
                entry.attempts += 1;
                entry.last_checked_at = Some(now);
                entry.last_result = Some(RolloverResult::NoLaterSlot);

                if entry.attempts >= entry.max_attempts {
                    entry.state = RolloverState::Exhausted;
                    entry.next_check_at = None;
                    effects.push(Effect::Emit(Event::RolloverExhausted {
                        id: entry.id.clone(),
                        attempts: entry.attempts,
                    }));
                    effects.push(Effect::Notify {
                        kind: NotificationKind::RolloverExhausted,
                        title: format!("Rollover gave up: {}", entry.name),
                        body: format!(
                            "No slot for {} opened up after {} attempts",
                            entry.target_stay, entry.attempts
                        ),
                    });
                } else {
                    entry.next_check_at = entry.reschedule(now);
                    effects.push(Effect::Emit(Event::RolloverChecked {
                        id: entry.id.clone(),
                        attempts: entry.attempts,
                    }));
                }
            }

            (RolloverState::Active, RolloverInput::Transient { reason }) => {
                // Never counted against max_attempts
                entry.last_checked_at = Some(now);
                entry.last_result = Some(RolloverResult::Transient);
                entry.next_check_at = entry.reschedule(now);
                effects.push(Effect::Log {
                    level: LogLevel::Warn,
                    message: format!("rollover {} cycle failed: {}", entry.id, reason),
                });
            }

            (RolloverState::Active, RolloverInput::RebookStarted { new_reference }) => {
                entry.pending_rebook = Some(PendingRebook {
                    new_reference: new_reference.clone(),
                    created_at: now,
                });
                effects.push(Effect::Log {
                    level: LogLevel::Info,
                    message: format!(
                        "rollover {} created booking {}, cancelling {}",
                        entry.id, new_reference, entry.booking_reference
                    ),
                });
            }

            (RolloverState::Active, RolloverInput::RebookCommitted) => {
                let Some(pending) = entry.pending_rebook.take() else {
                    effects.push(Effect::Log {
                        level: LogLevel::Error,
                        message: format!(
                            "rollover {} commit without a pending rebook; ignoring",
                            entry.id
                        ),
                    });
                    return (entry, effects);
                };

                let old_reference = entry.booking_reference.clone();
                entry.booking_reference = pending.new_reference.clone();
                entry.new_booking_reference = Some(pending.new_reference.clone());
                entry.state = RolloverState::Success;
                entry.success_date = Some(now);
                entry.last_checked_at = Some(now);
                entry.last_result = Some(RolloverResult::Rebooked);
                entry.next_check_at = None;

                effects.push(Effect::Emit(Event::RolloverSucceeded {
                    id: entry.id.clone(),
                    old_reference: old_reference.clone(),
                    new_reference: pending.new_reference.clone(),
                }));
                effects.push(Effect::Notify {
                    kind: NotificationKind::RolloverSucceeded,
                    title: format!("Rebooked: {}", entry.name),
                    body: format!(
                        "Now holding {} for {} (was {})",
                        pending.new_reference, entry.target_stay, old_reference
                    ),
                });
            }

            (RolloverState::Active, RolloverInput::CancelFailed { reason }) => {
                let Some(pending) = entry.pending_rebook.take() else {
                    effects.push(Effect::Log {
                        level: LogLevel::Error,
                        message: format!(
                            "rollover {} cancel failure without a pending rebook; ignoring",
                            entry.id
                        ),
                    });
                    return (entry, effects);
                };

                let old_reference = entry.booking_reference.clone();
                entry.state = RolloverState::Anomaly {
                    old_reference: old_reference.clone(),
                    new_reference: pending.new_reference.clone(),
                    reason: reason.clone(),
                };
                entry.last_checked_at = Some(now);
                entry.last_result = Some(RolloverResult::CancelFailed);
                entry.next_check_at = None;

                effects.push(Effect::Emit(Event::RolloverAnomaly {
                    id: entry.id.clone(),
                    old_reference: old_reference.clone(),
                    new_reference: pending.new_reference.clone(),
                    reason: reason.clone(),
                }));
                effects.push(Effect::Notify {
                    kind: NotificationKind::DualBookingAnomaly,
                    title: format!("Action needed: two bookings held for {}", entry.name),
                    body: format!(
                        "Created {} but cancelling {} failed: {}. \
                         Cancel the old booking manually, then delete this entry.",
                        pending.new_reference, old_reference, reason
                    ),
                });
            }

            (RolloverState::Active, RolloverInput::AuthFailed { reason }) => {
                entry.state = RolloverState::Error {
                    reason: reason.clone(),
                };
                entry.last_checked_at = Some(now);
                entry.last_result = Some(RolloverResult::AuthError);
                entry.next_check_at = None;
                effects.push(Effect::Emit(Event::RolloverAuthRequired {
                    id: entry.id.clone(),
                    reason: reason.clone(),
                }));
                effects.push(Effect::Notify {
                    kind: NotificationKind::AuthRequired,
                    title: "Portal sign-in required".to_string(),
                    body: format!("Rollover \"{}\" is paused: {}", entry.name, reason),
                });
            }

            // Invalid transitions - no change
            (_, input) => {
                effects.push(Effect::Log {
                    level: LogLevel::Debug,
                    message: format!(
                        "rollover {} ignoring {:?} in state {}",
                        entry.id,
                        input,
                        entry.state.label()
                    ),
                });
            }
        }

        (entry, effects)
    }
}

#[cfg(test)]
#[path = "rollover_tests.rs"]
mod tests;
