// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Booking-domain types exchanged with the reservation portal

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An inclusive stay: arrival on `start`, departure on `end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of nights in the stay
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn is_ordered(&self) -> bool {
        self.start < self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A campsite offered by the portal for a queried stay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub site_type: String,
    pub price_per_night: f64,
    pub bookable: bool,
}

/// Parameters for an availability check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub campground_id: String,
    pub range: DateRange,
    pub guests: u32,
    pub site_type: Option<String>,
}

/// Parameters for creating a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub campground_id: String,
    pub site_id: String,
    pub range: DateRange,
    pub guests: u32,
}

/// A confirmed booking as reported by the portal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub reference: String,
    pub site_id: String,
    pub range: DateRange,
}

/// Pick the best candidate site: lowest nightly price, then lowest site id
pub fn best_site<'a>(sites: &[&'a Site]) -> Option<&'a Site> {
    sites.iter().copied().min_by(|a, b| {
        a.price_per_night
            .total_cmp(&b.price_per_night)
            .then_with(|| a.id.cmp(&b.id))
    })
}
