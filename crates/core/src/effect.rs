// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects and events for state machine orchestration
//!
//! State machines are pure: a transition returns the updated entity plus the
//! side effects it wants performed. The engine executes effects — publishing
//! events on the bus, fanning notifications out through the dispatcher, and
//! logging.

use crate::notification::NotificationKind;
use crate::queue_session::QueueStatus;
use serde::{Deserialize, Serialize};

/// Effects are side effects that state machines request
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Emit an event for other components to observe
    Emit(Event),
    /// Fan a message out through the notification dispatcher
    Notify {
        kind: NotificationKind,
        title: String,
        body: String,
    },
    /// Log a message
    Log { level: LogLevel, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Events emitted by state machines and the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Watch events
    WatchChecked {
        id: String,
        result: String,
        found_count: u32,
    },
    WatchFound {
        id: String,
        campground_id: String,
        matching: usize,
    },
    WatchAuthRequired {
        id: String,
        reason: String,
    },

    // Booking events (auto-book path)
    BookingConfirmed {
        watch_id: String,
        reference: String,
        site_id: String,
    },
    BookingFailed {
        watch_id: String,
        reason: String,
    },

    // Rollover events
    RolloverChecked {
        id: String,
        attempts: u32,
    },
    RolloverSucceeded {
        id: String,
        old_reference: String,
        new_reference: String,
    },
    RolloverExhausted {
        id: String,
        attempts: u32,
    },
    RolloverAnomaly {
        id: String,
        old_reference: String,
        new_reference: String,
        reason: String,
    },
    RolloverAuthRequired {
        id: String,
        reason: String,
    },

    // Queue session events
    QueueStatusChanged {
        status: QueueStatus,
        position: Option<u32>,
        estimated_wait_secs: Option<u64>,
    },

    // Notification events
    NotificationCreated {
        id: String,
        kind: NotificationKind,
        title: String,
    },
}

impl Event {
    /// Event name used for subscription pattern matching, e.g. `watch:found`
    pub fn name(&self) -> String {
        match self {
            Event::WatchChecked { .. } => "watch:checked",
            Event::WatchFound { .. } => "watch:found",
            Event::WatchAuthRequired { .. } => "watch:auth-required",
            Event::BookingConfirmed { .. } => "booking:confirmed",
            Event::BookingFailed { .. } => "booking:failed",
            Event::RolloverChecked { .. } => "rollover:checked",
            Event::RolloverSucceeded { .. } => "rollover:success",
            Event::RolloverExhausted { .. } => "rollover:exhausted",
            Event::RolloverAnomaly { .. } => "rollover:anomaly",
            Event::RolloverAuthRequired { .. } => "rollover:auth-required",
            Event::QueueStatusChanged { .. } => "queue:status",
            Event::NotificationCreated { .. } => "notification:created",
        }
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_are_namespaced() {
        let event = Event::WatchFound {
            id: "w-1".to_string(),
            campground_id: "cg-9".to_string(),
            matching: 2,
        };
        assert_eq!(event.name(), "watch:found");

        let event = Event::RolloverSucceeded {
            id: "r-1".to_string(),
            old_reference: "OLD".to_string(),
            new_reference: "NEW".to_string(),
        };
        assert_eq!(event.name(), "rollover:success");
    }

    #[test]
    fn events_round_trip_through_json() {
        let event = Event::QueueStatusChanged {
            status: QueueStatus::Waiting,
            position: Some(14),
            estimated_wait_secs: Some(420),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
