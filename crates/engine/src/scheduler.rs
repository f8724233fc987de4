// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Candidate selection and the in-flight registry
//!
//! `plan` is a pure function over the loaded entities; the in-flight
//! registry enforces the single-flight rule: at most one executor per
//! entity id at any instant, across scheduled ticks and execute-now
//! commands alike.

use chrono::{DateTime, Utc};
use cw_core::{JobKind, Rollover, Watch};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Identity of one job execution target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub kind: JobKind,
    pub id: String,
}

impl JobKey {
    pub fn watch(id: impl Into<String>) -> Self {
        Self {
            kind: JobKind::WatchCheck,
            id: id.into(),
        }
    }

    pub fn rollover(id: impl Into<String>) -> Self {
        Self {
            kind: JobKind::RolloverCheck,
            id: id.into(),
        }
    }
}

/// One admitted job, ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub key: JobKey,
    pub due_at: DateTime<Utc>,
}

/// Select due jobs: active, due, not already running, earliest due first
/// (entity id as tie-break), truncated to the available capacity.
pub fn plan(
    watches: &[Watch],
    rollovers: &[Rollover],
    in_flight: &HashSet<JobKey>,
    now: DateTime<Utc>,
    capacity: usize,
) -> Vec<Dispatch> {
    let mut candidates: Vec<Dispatch> = Vec::new();

    for watch in watches {
        if !watch.is_due(now) {
            continue;
        }
        let Some(due_at) = watch.next_check_at else {
            continue;
        };
        candidates.push(Dispatch {
            key: JobKey::watch(watch.id.as_str()),
            due_at,
        });
    }

    for rollover in rollovers {
        if !rollover.is_due(now) {
            continue;
        }
        let Some(due_at) = rollover.next_check_at else {
            continue;
        };
        candidates.push(Dispatch {
            key: JobKey::rollover(rollover.id.as_str()),
            due_at,
        });
    }

    candidates.retain(|c| !in_flight.contains(&c.key));
    candidates.sort_by(|a, b| a.due_at.cmp(&b.due_at).then_with(|| a.key.id.cmp(&b.key.id)));
    candidates.truncate(capacity);
    candidates
}

/// Registry of currently executing entity ids
#[derive(Clone, Default)]
pub struct InFlight {
    inner: Arc<Mutex<HashSet<JobKey>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a key for execution. Returns `None` when the entity already
    /// has a running executor.
    pub fn try_begin(&self, key: JobKey) -> Option<InFlightGuard> {
        let mut set = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if set.contains(&key) {
            return None;
        }
        set.insert(key.clone());
        Some(InFlightGuard {
            key,
            inner: Arc::clone(&self.inner),
        })
    }

    pub fn snapshot(&self) -> HashSet<JobKey> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases the claim on drop, whatever the executor's outcome
pub struct InFlightGuard {
    key: JobKey,
    inner: Arc<Mutex<HashSet<JobKey>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
