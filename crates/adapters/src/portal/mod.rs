// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reservation portal client
//!
//! The engine consumes this capability; the wire-level details of the real
//! portal (scraping, session cookies, OTP flows) live in whatever
//! implementation the daemon is wired with. Every call fails with a
//! distinguishable error kind so executors can classify outcomes.

use async_trait::async_trait;
use cw_core::{AvailabilityQuery, BookingConfirmation, BookingRequest, Site};
use std::time::Duration;
use thiserror::Error;

mod rest;
mod traced;

pub use rest::RestPortalClient;
pub use traced::TracedPortalClient;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePortalClient, PortalCall};

/// Errors from portal operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortalError {
    #[error("portal request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("portal server error: status {status}")]
    Server { status: u16 },
    #[error("authentication required: {0}")]
    AuthenticationRequired(String),
    #[error("booking conflict: {0}")]
    BookingConflict(String),
    #[error("invalid portal response: {0}")]
    InvalidResponse(String),
}

impl PortalError {
    /// Transient failures are retried on the normal schedule and never
    /// counted against an entry's attempts
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortalError::Timeout | PortalError::Network(_) | PortalError::Server { .. }
        )
    }
}

/// Admission phase reported by the portal's waiting room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuePhase {
    Waiting,
    Active,
}

/// Waiting-room ticket returned by join/refresh calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueTicket {
    pub phase: QueuePhase,
    pub position: Option<u32>,
    pub estimated_wait: Option<Duration>,
    pub ttl: Duration,
}

/// Adapter for the third-party reservation portal
#[async_trait]
pub trait PortalClient: Send + Sync + 'static {
    /// List sites available for the queried stay
    async fn check_availability(&self, query: &AvailabilityQuery)
        -> Result<Vec<Site>, PortalError>;

    /// Create a booking; returns the portal's reference
    async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, PortalError>;

    /// Cancel a booking by reference
    async fn cancel_booking(&self, reference: &str) -> Result<(), PortalError>;

    /// Join the waiting room (or learn we are already admitted)
    async fn join_queue(&self) -> Result<QueueTicket, PortalError>;

    /// Refresh the waiting-room session before it expires
    async fn refresh_queue(&self) -> Result<QueueTicket, PortalError>;
}
