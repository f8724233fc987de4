// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job log records
//!
//! Every executor run produces exactly one record. Records are immutable
//! once written; the storage journal appends and never rewrites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::clock::Clock;

/// The kind of background job a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    WatchCheck,
    RolloverCheck,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::WatchCheck => write!(f, "watch_check"),
            JobKind::RolloverCheck => write!(f, "rollover_check"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Completed,
    Failed,
}

/// Immutable record of one executor run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub kind: JobKind,
    pub target_id: String,
    pub status: JobStatus,
    pub detail: Option<String>,
    pub error: Option<String>,
    pub duration_ms: u64,
    pub recorded_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn completed(
        id: impl Into<String>,
        kind: JobKind,
        target_id: impl Into<String>,
        detail: impl Into<String>,
        duration: Duration,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            target_id: target_id.into(),
            status: JobStatus::Completed,
            detail: Some(detail.into()),
            error: None,
            duration_ms: duration.as_millis() as u64,
            recorded_at: clock.now_utc(),
        }
    }

    pub fn failed(
        id: impl Into<String>,
        kind: JobKind,
        target_id: impl Into<String>,
        error: impl Into<String>,
        duration: Duration,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            target_id: target_id.into(),
            status: JobStatus::Failed,
            detail: None,
            error: Some(error.into()),
            duration_ms: duration.as_millis() as u64,
            recorded_at: clock.now_utc(),
        }
    }
}
