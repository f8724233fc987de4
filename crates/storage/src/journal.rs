// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only job journal
//!
//! One JSONL line per executor run. Entries are immutable; the file is only
//! ever appended to and fsynced per write.

use cw_core::JobRecord;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable append-only log of job records
pub struct Journal {
    file: File,
    path: PathBuf,
    sequence: u64,
}

impl Journal {
    /// Open or create a journal at the given path
    pub fn open(path: &Path) -> Result<Self, JournalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        // Count existing entries to set the sequence number
        let reader = BufReader::new(File::open(path)?);
        let sequence = reader.lines().count() as u64;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            sequence,
        })
    }

    /// Append a record, returning its sequence number
    pub fn append(&mut self, record: &JobRecord) -> Result<u64, JournalError> {
        self.sequence += 1;
        let line = serde_json::to_string(record)?;
        writeln!(self.file, "{}", line)?;
        self.file.sync_all()?;
        Ok(self.sequence)
    }

    /// Current sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Replay every record in append order
    pub fn replay(path: &Path) -> Result<Vec<JobRecord>, JournalError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }

        Ok(records)
    }

    /// The most recent `limit` records, oldest first
    pub fn tail(&self, limit: usize) -> Result<Vec<JobRecord>, JournalError> {
        let mut records = Self::replay(&self.path)?;
        if records.len() > limit {
            records.drain(..records.len() - limit);
        }
        Ok(records)
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
