// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity validation errors
//!
//! Malformed entities are rejected at the command surface and never reach
//! the scheduler or an executor.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("date range is not ordered: {start} is not before {end}")]
    UnorderedDates { start: NaiveDate, end: NaiveDate },

    #[error("guests must be at least 1")]
    NoGuests,

    #[error("check interval must be at least one minute")]
    IntervalTooShort,

    #[error("auto-book and notify-only are mutually exclusive")]
    ConflictingModes,

    #[error("max attempts must be at least 1")]
    NoAttempts,

    #[error("max price must be greater than zero")]
    NonPositivePrice,

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("cannot activate a finished entry (state: {state})")]
    Finished { state: String },
}
