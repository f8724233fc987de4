// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Portal waiting-room session state
//!
//! The portal fronts busy booking windows with a virtual waiting room. One
//! session exists per authenticated account; it is process-transient and is
//! replaced wholesale whenever the portal reissues it.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::clock::Clock;

/// Admission status reported by the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Waiting,
    Active,
    Expired,
}

/// The account's admission state in the portal's waiting room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSession {
    pub status: QueueStatus,
    pub position: Option<u32>,
    pub estimated_wait: Option<Duration>,
    pub expires_at: DateTime<Utc>,
    pub joined_at: DateTime<Utc>,
}

impl QueueSession {
    /// Session produced by a queue-join handshake
    pub fn joined(
        status: QueueStatus,
        position: Option<u32>,
        estimated_wait: Option<Duration>,
        ttl: Duration,
        clock: &impl Clock,
    ) -> Self {
        let now = clock.now_utc();
        Self {
            status,
            position,
            estimated_wait,
            expires_at: now + TimeDelta::from_std(ttl).unwrap_or_default(),
            joined_at: now,
        }
    }

    /// Session updated by a refresh call; the portal restarts the TTL and
    /// reports fresh waiting-room coordinates
    pub fn refreshed(
        &self,
        status: QueueStatus,
        position: Option<u32>,
        estimated_wait: Option<Duration>,
        ttl: Duration,
        clock: &impl Clock,
    ) -> Self {
        Self {
            status,
            // Position only means something while waiting
            position: if status == QueueStatus::Waiting {
                position
            } else {
                None
            },
            estimated_wait: if status == QueueStatus::Waiting {
                estimated_wait
            } else {
                None
            },
            expires_at: clock.now_utc() + TimeDelta::from_std(ttl).unwrap_or_default(),
            joined_at: self.joined_at,
        }
    }

    /// Re-evaluate expiry against the clock
    pub fn tick(&self, clock: &impl Clock) -> Self {
        if self.status != QueueStatus::Expired && clock.now_utc() >= self.expires_at {
            Self {
                status: QueueStatus::Expired,
                ..self.clone()
            }
        } else {
            self.clone()
        }
    }

    /// May the account call availability/booking endpoints right now?
    pub fn is_admitted(&self) -> bool {
        self.status == QueueStatus::Active
    }

    /// Time left before the portal forgets this session (zero floor)
    pub fn expiry_remaining(&self, clock: &impl Clock) -> Duration {
        (self.expires_at - clock.now_utc())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Should the session be refreshed before it lapses mid-job?
    pub fn needs_refresh(&self, clock: &impl Clock, margin: Duration) -> bool {
        self.status == QueueStatus::Active && self.expiry_remaining(clock) <= margin
    }
}

#[cfg(test)]
#[path = "queue_session_tests.rs"]
mod tests;
