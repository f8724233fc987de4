// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake portal client for testing

use super::{PortalClient, PortalError, QueuePhase, QueueTicket};
use async_trait::async_trait;
use cw_core::{AvailabilityQuery, BookingConfirmation, BookingRequest, Site};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded portal interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalCall {
    CheckAvailability { campground_id: String },
    CreateBooking { site_id: String },
    CancelBooking { reference: String },
    JoinQueue,
    RefreshQueue,
}

#[derive(Default)]
struct FakeInner {
    availability: VecDeque<Result<Vec<Site>, PortalError>>,
    bookings: VecDeque<Result<BookingConfirmation, PortalError>>,
    cancels: VecDeque<Result<(), PortalError>>,
    joins: VecDeque<Result<QueueTicket, PortalError>>,
    refreshes: VecDeque<Result<QueueTicket, PortalError>>,
    calls: Vec<PortalCall>,
    booking_counter: u32,
}

/// Scriptable fake portal.
///
/// Responses are consumed queue-style; when a queue is empty the fake falls
/// back to a benign default (no availability, instant queue admission,
/// generated booking references, successful cancels).
#[derive(Clone, Default)]
pub struct FakePortalClient {
    inner: Arc<Mutex<FakeInner>>,
}

impl FakePortalClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push_availability(&self, result: Result<Vec<Site>, PortalError>) {
        self.lock().availability.push_back(result);
    }

    pub fn push_booking(&self, result: Result<BookingConfirmation, PortalError>) {
        self.lock().bookings.push_back(result);
    }

    pub fn push_cancel(&self, result: Result<(), PortalError>) {
        self.lock().cancels.push_back(result);
    }

    pub fn push_join(&self, result: Result<QueueTicket, PortalError>) {
        self.lock().joins.push_back(result);
    }

    pub fn push_refresh(&self, result: Result<QueueTicket, PortalError>) {
        self.lock().refreshes.push_back(result);
    }

    /// All recorded interactions, in call order
    pub fn calls(&self) -> Vec<PortalCall> {
        self.lock().calls.clone()
    }

    /// Count of availability checks performed
    pub fn availability_calls(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, PortalCall::CheckAvailability { .. }))
            .count()
    }

    fn admitted_ticket() -> QueueTicket {
        QueueTicket {
            phase: QueuePhase::Active,
            position: None,
            estimated_wait: None,
            ttl: Duration::from_secs(300),
        }
    }
}

#[async_trait]
impl PortalClient for FakePortalClient {
    async fn check_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<Site>, PortalError> {
        let mut inner = self.lock();
        inner.calls.push(PortalCall::CheckAvailability {
            campground_id: query.campground_id.clone(),
        });
        inner.availability.pop_front().unwrap_or_else(|| Ok(vec![]))
    }

    async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, PortalError> {
        let mut inner = self.lock();
        inner.calls.push(PortalCall::CreateBooking {
            site_id: request.site_id.clone(),
        });
        match inner.bookings.pop_front() {
            Some(result) => result,
            None => {
                inner.booking_counter += 1;
                Ok(BookingConfirmation {
                    reference: format!("FAKE-{}", inner.booking_counter),
                    site_id: request.site_id.clone(),
                    range: request.range,
                })
            }
        }
    }

    async fn cancel_booking(&self, reference: &str) -> Result<(), PortalError> {
        let mut inner = self.lock();
        inner.calls.push(PortalCall::CancelBooking {
            reference: reference.to_string(),
        });
        inner.cancels.pop_front().unwrap_or(Ok(()))
    }

    async fn join_queue(&self) -> Result<QueueTicket, PortalError> {
        let mut inner = self.lock();
        inner.calls.push(PortalCall::JoinQueue);
        inner
            .joins
            .pop_front()
            .unwrap_or_else(|| Ok(Self::admitted_ticket()))
    }

    async fn refresh_queue(&self) -> Result<QueueTicket, PortalError> {
        let mut inner = self.lock();
        inner.calls.push(PortalCall::RefreshQueue);
        inner
            .refreshes
            .pop_front()
            .unwrap_or_else(|| Ok(Self::admitted_ticket()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
