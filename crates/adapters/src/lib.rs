// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: the reservation portal and notification channels

pub mod notify;
pub mod portal;

pub use notify::{build_channel, ChannelAdapter, DesktopNotifier, EmailChannel, NotifyError};
pub use portal::{
    PortalClient, PortalError, QueuePhase, QueueTicket, RestPortalClient, TracedPortalClient,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use notify::{DeliveredMessage, FakeChannel};
#[cfg(any(test, feature = "test-support"))]
pub use portal::{FakePortalClient, PortalCall};
