// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use thiserror::Error;

/// Errors that can occur in the engine runtime
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] cw_storage::StorageError),

    #[error("journal error: {0}")]
    Journal(#[from] cw_storage::JournalError),

    #[error("{0}")]
    Validation(#[from] cw_core::ValidationError),

    #[error("portal error: {0}")]
    Portal(#[from] cw_adapters::PortalError),

    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("not found: {kind}/{id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} {id} is already running")]
    AlreadyRunning { kind: &'static str, id: String },

    #[error("{0}")]
    Rejected(String),
}
