// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing decorator for portal clients

use super::{PortalClient, PortalError, QueueTicket};
use async_trait::async_trait;
use cw_core::{AvailabilityQuery, BookingConfirmation, BookingRequest, Site};

/// Wraps a portal client and logs every call with timing and outcome
#[derive(Clone)]
pub struct TracedPortalClient<P> {
    inner: P,
}

impl<P: PortalClient> TracedPortalClient<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    async fn traced<T, F>(&self, op: &'static str, fut: F) -> Result<T, PortalError>
    where
        F: std::future::Future<Output = Result<T, PortalError>>,
    {
        let start = std::time::Instant::now();
        let result = fut.await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => tracing::debug!(op, elapsed_ms, "portal call ok"),
            Err(e) => tracing::warn!(op, elapsed_ms, error = %e, "portal call failed"),
        }
        result
    }
}

#[async_trait]
impl<P: PortalClient> PortalClient for TracedPortalClient<P> {
    async fn check_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<Site>, PortalError> {
        self.traced("check_availability", self.inner.check_availability(query))
            .await
    }

    async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, PortalError> {
        self.traced("create_booking", self.inner.create_booking(request))
            .await
    }

    async fn cancel_booking(&self, reference: &str) -> Result<(), PortalError> {
        self.traced("cancel_booking", self.inner.cancel_booking(reference))
            .await
    }

    async fn join_queue(&self) -> Result<QueueTicket, PortalError> {
        self.traced("join_queue", self.inner.join_queue()).await
    }

    async fn refresh_queue(&self) -> Result<QueueTicket, PortalError> {
        self.traced("refresh_queue", self.inner.refresh_queue()).await
    }
}
