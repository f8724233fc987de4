// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cw-storage: JSON entity store and the append-only job journal
//!
//! The store gives read-after-write consistency for the process's own
//! writes; nothing here migrates schemas or encrypts at rest.

mod journal;
mod store;

pub use journal::{Journal, JournalError};
pub use store::{JsonStore, StorageError};
