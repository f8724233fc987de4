// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Availability watch state machine
//!
//! A watch is a recurring monitoring task for one campground and date range.
//! The executor performs the portal I/O and reduces it to a `CheckOutcome`;
//! applying the outcome here is pure and returns the updated watch plus the
//! effects the engine should perform.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::booking::{BookingConfirmation, DateRange, Site};
use crate::clock::Clock;
use crate::effect::{Effect, Event, LogLevel};
use crate::error::ValidationError;
use crate::notification::NotificationKind;

/// Result classification of the most recent check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckResult {
    Found,
    NotFound,
    Error,
}

impl std::fmt::Display for CheckResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckResult::Found => write!(f, "found"),
            CheckResult::NotFound => write!(f, "not_found"),
            CheckResult::Error => write!(f, "error"),
        }
    }
}

/// Result of an auto-book attempt inside a check
#[derive(Debug, Clone, PartialEq)]
pub enum BookingAttempt {
    Booked(BookingConfirmation),
    Failed { reason: String },
}

/// What one availability check observed, reduced by the executor
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Found {
        matching: usize,
        booking: Option<BookingAttempt>,
    },
    NotFound,
    Transient {
        reason: String,
    },
    AuthRequired {
        reason: String,
    },
}

/// A recurring availability-monitoring task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watch {
    pub id: String,
    pub name: String,
    pub campground_id: String,
    pub range: DateRange,
    pub guests: u32,
    pub site_type: Option<String>,
    pub max_price: Option<f64>,
    pub check_interval_minutes: u32,
    pub active: bool,
    pub auto_book: bool,
    pub notify_only: bool,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub next_check_at: Option<DateTime<Utc>>,
    pub last_result: Option<CheckResult>,
    pub found_count: u32,
    pub created_at: DateTime<Utc>,
}

impl Watch {
    /// Create a new watch, scheduled for an immediate first check
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        campground_id: impl Into<String>,
        range: DateRange,
        guests: u32,
        clock: &impl Clock,
    ) -> Self {
        let now = clock.now_utc();
        Self {
            id: id.into(),
            name: name.into(),
            campground_id: campground_id.into(),
            range,
            guests,
            site_type: None,
            max_price: None,
            check_interval_minutes: 30,
            active: true,
            auto_book: false,
            notify_only: false,
            last_checked_at: None,
            next_check_at: Some(now),
            last_result: None,
            found_count: 0,
            created_at: now,
        }
    }

    pub fn with_site_type(mut self, site_type: impl Into<String>) -> Self {
        self.site_type = Some(site_type.into());
        self
    }

    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    pub fn with_interval_minutes(mut self, minutes: u32) -> Self {
        self.check_interval_minutes = minutes;
        self
    }

    pub fn auto_booking(mut self) -> Self {
        self.auto_book = true;
        self
    }

    pub fn notify_only(mut self) -> Self {
        self.notify_only = true;
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
        if !self.range.is_ordered() {
            return Err(ValidationError::UnorderedDates {
                start: self.range.start,
                end: self.range.end,
            });
        }
        if self.guests == 0 {
            return Err(ValidationError::NoGuests);
        }
        if self.check_interval_minutes == 0 {
            return Err(ValidationError::IntervalTooShort);
        }
        if self.auto_book && self.notify_only {
            return Err(ValidationError::ConflictingModes);
        }
        if let Some(price) = self.max_price {
            if price <= 0.0 {
                return Err(ValidationError::NonPositivePrice);
            }
        }
        Ok(())
    }

    /// Is this watch ready for dispatch?
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.active && self.next_check_at.is_some_and(|at| at <= now)
    }

    /// Sites that satisfy every filter and can actually be booked
    pub fn matching_sites<'a>(&self, sites: &'a [Site]) -> Vec<&'a Site> {
        sites
            .iter()
            .filter(|s| s.bookable)
            .filter(|s| {
                self.site_type
                    .as_deref()
                    .is_none_or(|wanted| s.site_type == wanted)
            })
            .filter(|s| self.max_price.is_none_or(|max| s.price_per_night <= max))
            .collect()
    }

    /// Resume scheduling, due immediately
    pub fn activate(&self, clock: &impl Clock) -> Watch {
        Watch {
            active: true,
            next_check_at: Some(clock.now_utc()),
            ..self.clone()
        }
    }

    /// Suppress future scheduling; an in-progress check is not aborted
    pub fn deactivate(&self) -> Watch {
        Watch {
            active: false,
            next_check_at: None,
            ..self.clone()
        }
    }

    /// Pure transition: fold a check outcome into the watch.
    ///
    /// Timestamps and counters move here and nowhere else; the returned
    /// effects carry the events and notifications the engine should emit.
    pub fn apply_outcome(&self, outcome: CheckOutcome, clock: &impl Clock) -> (Watch, Vec<Effect>) {
        let now = clock.now_utc();
        let mut watch = self.clone();
        let mut effects = Vec::new();

        watch.last_checked_at = Some(now);
        watch.next_check_at = Some(now + TimeDelta::minutes(i64::from(self.check_interval_minutes)));

        match outcome {
            CheckOutcome::Found { matching, booking } => {
                watch.last_result = Some(CheckResult::Found);
                watch.found_count += 1;

                effects.push(Effect::Emit(Event::WatchFound {
                    id: watch.id.clone(),
                    campground_id: watch.campground_id.clone(),
                    matching,
                }));

                match booking {
                    Some(BookingAttempt::Booked(confirmation)) => {
                        // Purpose fulfilled: stop watching
                        watch.active = false;
                        watch.next_check_at = None;
                        effects.push(Effect::Emit(Event::BookingConfirmed {
                            watch_id: watch.id.clone(),
                            reference: confirmation.reference.clone(),
                            site_id: confirmation.site_id.clone(),
                        }));
                        effects.push(Effect::Notify {
                            kind: NotificationKind::BookingConfirmed,
                            title: format!("Booked: {}", watch.name),
                            body: format!(
                                "Reserved site {} ({}) — reference {}",
                                confirmation.site_id, watch.range, confirmation.reference
                            ),
                        });
                    }
                    Some(BookingAttempt::Failed { reason }) => {
                        effects.push(Effect::Emit(Event::BookingFailed {
                            watch_id: watch.id.clone(),
                            reason: reason.clone(),
                        }));
                        effects.push(Effect::Notify {
                            kind: NotificationKind::BookingFailed,
                            title: format!("Booking failed: {}", watch.name),
                            body: format!(
                                "A matching site was available but booking failed: {}",
                                reason
                            ),
                        });
                    }
                    None => {
                        if watch.notify_only {
                            effects.push(Effect::Notify {
                                kind: NotificationKind::WatchFound,
                                title: format!("Availability: {}", watch.name),
                                body: format!(
                                    "{} matching site(s) for {} at {}",
                                    matching, watch.range, watch.campground_id
                                ),
                            });
                        }
                    }
                }
            }

            CheckOutcome::NotFound => {
                watch.last_result = Some(CheckResult::NotFound);
            }

            CheckOutcome::Transient { reason } => {
                // Counted as a normal cycle; found_count untouched
                watch.last_result = Some(CheckResult::Error);
                effects.push(Effect::Log {
                    level: LogLevel::Warn,
                    message: format!("watch {} check failed: {}", watch.id, reason),
                });
            }

            CheckOutcome::AuthRequired { reason } => {
                // Halt until the user refreshes credentials and reactivates
                watch.last_result = Some(CheckResult::Error);
                watch.active = false;
                watch.next_check_at = None;
                effects.push(Effect::Emit(Event::WatchAuthRequired {
                    id: watch.id.clone(),
                    reason: reason.clone(),
                }));
                effects.push(Effect::Notify {
                    kind: NotificationKind::AuthRequired,
                    title: "Portal sign-in required".to_string(),
                    body: format!("Watch \"{}\" is paused: {}", watch.name, reason),
                });
            }
        }

        if let Some(result) = watch.last_result {
            effects.push(Effect::Emit(Event::WatchChecked {
                id: watch.id.clone(),
                result: result.to_string(),
                found_count: watch.found_count,
            }));
        }

        (watch, effects)
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
