// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue session gating
//!
//! The portal's waiting room issues one session per authenticated account.
//! Every executor asks the gate for admission before touching availability
//! or booking endpoints; the join/refresh handshake is serialized behind an
//! async mutex while admitted portal calls run concurrently outside it.

use cw_adapters::{PortalClient, PortalError, QueuePhase, QueueTicket};
use cw_core::{Clock, EngineConfig, Event, QueueSession, QueueStatus};
use std::time::Duration;
use tokio::sync::Mutex;

/// Outcome of an admission request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// The account is in; availability/booking calls may proceed
    Admitted,
    /// Estimated wait exceeds the configured ceiling; reschedule instead
    WaitTooLong { estimated_wait: Duration },
}

/// Shared admission gate, one per account
pub struct QueueGate {
    session: Mutex<Option<QueueSession>>,
    wait_ceiling: Duration,
    poll_interval: Duration,
    refresh_margin: Duration,
}

impl QueueGate {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            session: Mutex::new(None),
            wait_ceiling: config.queue_wait_ceiling,
            poll_interval: config.queue_poll_interval,
            refresh_margin: config.queue_refresh_margin,
        }
    }

    fn status_of(ticket: &QueueTicket) -> QueueStatus {
        match ticket.phase {
            QueuePhase::Waiting => QueueStatus::Waiting,
            QueuePhase::Active => QueueStatus::Active,
        }
    }

    fn status_event(session: &QueueSession) -> Event {
        Event::QueueStatusChanged {
            status: session.status,
            position: session.position,
            estimated_wait_secs: session.estimated_wait.map(|d| d.as_secs()),
        }
    }

    /// Block until the account is admitted, or abandon when the portal's
    /// estimated wait exceeds the ceiling. Returned events report status
    /// changes for bus subscribers.
    pub async fn admit(
        &self,
        portal: &impl PortalClient,
        clock: &impl Clock,
    ) -> Result<(Admission, Vec<Event>), PortalError> {
        let mut slot = self.session.lock().await;
        let mut events = Vec::new();
        let wait_started = clock.now();

        loop {
            // Drop a lapsed session; the handshake below reissues it
            let current = match slot.take() {
                Some(session) if session.tick(clock).status == QueueStatus::Expired => None,
                other => other,
            };

            match current {
                None => {
                    let ticket = portal.join_queue().await?;
                    let session = QueueSession::joined(
                        Self::status_of(&ticket),
                        ticket.position,
                        ticket.estimated_wait,
                        ticket.ttl,
                        clock,
                    );
                    events.push(Self::status_event(&session));
                    *slot = Some(session);
                }

                Some(session) if session.is_admitted() => {
                    if session.needs_refresh(clock, self.refresh_margin) {
                        let ticket = portal.refresh_queue().await?;
                        let refreshed = session.refreshed(
                            Self::status_of(&ticket),
                            ticket.position,
                            ticket.estimated_wait,
                            ticket.ttl,
                            clock,
                        );
                        events.push(Self::status_event(&refreshed));
                        *slot = Some(refreshed);
                        continue;
                    }
                    *slot = Some(session);
                    return Ok((Admission::Admitted, events));
                }

                Some(session) => {
                    // Still waiting: abandon rather than camp on the queue
                    // when the portal says it will take too long
                    let estimated = session.estimated_wait.unwrap_or_default();
                    if estimated > self.wait_ceiling
                        || clock.now().duration_since(wait_started) > self.wait_ceiling
                    {
                        *slot = Some(session);
                        return Ok((
                            Admission::WaitTooLong {
                                estimated_wait: estimated,
                            },
                            events,
                        ));
                    }

                    tokio::time::sleep(self.poll_interval).await;
                    let ticket = portal.refresh_queue().await?;
                    let refreshed = session.refreshed(
                        Self::status_of(&ticket),
                        ticket.position,
                        ticket.estimated_wait,
                        ticket.ttl,
                        clock,
                    );
                    if refreshed.status != session.status || refreshed.position != session.position
                    {
                        events.push(Self::status_event(&refreshed));
                    }
                    *slot = Some(refreshed);
                }
            }
        }
    }

    /// Periodic upkeep from the scheduler tick: expire lapsed sessions and
    /// refresh an active one proactively before it runs out mid-job.
    pub async fn maintain(&self, portal: &impl PortalClient, clock: &impl Clock) -> Vec<Event> {
        let mut slot = self.session.lock().await;
        let mut events = Vec::new();

        let Some(session) = slot.take() else {
            return events;
        };

        let ticked = session.tick(clock);
        if ticked.status == QueueStatus::Expired {
            tracing::debug!("queue session expired");
            events.push(Self::status_event(&ticked));
            return events;
        }

        if ticked.needs_refresh(clock, self.refresh_margin) {
            match portal.refresh_queue().await {
                Ok(ticket) => {
                    let refreshed = ticked.refreshed(
                        Self::status_of(&ticket),
                        ticket.position,
                        ticket.estimated_wait,
                        ticket.ttl,
                        clock,
                    );
                    *slot = Some(refreshed);
                    return events;
                }
                Err(error) => {
                    tracing::warn!(error = %error, "queue session refresh failed");
                }
            }
        }

        *slot = Some(ticked);
        events
    }

    /// Current session, if any
    pub async fn status(&self, clock: &impl Clock) -> Option<QueueSession> {
        let slot = self.session.lock().await;
        slot.as_ref().map(|s| s.tick(clock))
    }

    /// Discard the session (logout)
    pub async fn logout(&self) {
        let mut slot = self.session.lock().await;
        *slot = None;
    }
}

#[cfg(test)]
#[path = "queue_gate_tests.rs"]
mod tests;
