// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON file-based entity storage

use cw_core::{DeliveryRecord, NotificationMessage, Provider, Rollover, Watch};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not found: {kind}/{id}")]
    NotFound { kind: String, id: String },
}

const WATCHES: &str = "watches";
const ROLLOVERS: &str = "rollovers";
const PROVIDERS: &str = "providers";
const NOTIFICATIONS: &str = "notifications";
const DELIVERIES: &str = "deliveries";

/// JSON file-based storage, one file per entity under `<base>/<kind>/<id>.json`
#[derive(Clone)]
pub struct JsonStore {
    base_path: PathBuf,
}

impl JsonStore {
    /// Open a store at the given path
    pub fn open(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Open a throwaway store for testing
    pub fn open_temp() -> Result<Self, StorageError> {
        let temp_dir = std::env::temp_dir().join(format!("cw-test-{}", uuid::Uuid::new_v4()));
        Self::open(temp_dir)
    }

    /// Save a value to storage
    pub fn save<T: Serialize>(&self, kind: &str, id: &str, data: &T) -> Result<(), StorageError> {
        let path = self.path_for(kind, id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&path, json)?;
        Ok(())
    }

    /// Load a value from storage
    pub fn load<T: DeserializeOwned>(&self, kind: &str, id: &str) -> Result<T, StorageError> {
        let path = self.path_for(kind, id);
        if !path.exists() {
            return Err(StorageError::NotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            });
        }
        let json = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Delete a value from storage
    pub fn delete(&self, kind: &str, id: &str) -> Result<(), StorageError> {
        let path = self.path_for(kind, id);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// List all IDs of a given kind
    pub fn list_ids(&self, kind: &str) -> Result<Vec<String>, StorageError> {
        let dir = self.base_path.join(kind);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                if let Some(stem) = path.file_stem() {
                    ids.push(stem.to_string_lossy().to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Check if a value exists
    pub fn exists(&self, kind: &str, id: &str) -> bool {
        self.path_for(kind, id).exists()
    }

    fn path_for(&self, kind: &str, id: &str) -> PathBuf {
        self.base_path.join(kind).join(format!("{}.json", id))
    }

    fn load_all<T: DeserializeOwned>(&self, kind: &str) -> Result<Vec<T>, StorageError> {
        let mut items = Vec::new();
        for id in self.list_ids(kind)? {
            items.push(self.load(kind, &id)?);
        }
        Ok(items)
    }

    // Typed helpers

    pub fn save_watch(&self, watch: &Watch) -> Result<(), StorageError> {
        self.save(WATCHES, &watch.id, watch)
    }

    pub fn load_watch(&self, id: &str) -> Result<Watch, StorageError> {
        self.load(WATCHES, id)
    }

    pub fn delete_watch(&self, id: &str) -> Result<(), StorageError> {
        self.delete(WATCHES, id)
    }

    pub fn list_watches(&self) -> Result<Vec<Watch>, StorageError> {
        self.load_all(WATCHES)
    }

    pub fn save_rollover(&self, rollover: &Rollover) -> Result<(), StorageError> {
        self.save(ROLLOVERS, &rollover.id, rollover)
    }

    pub fn load_rollover(&self, id: &str) -> Result<Rollover, StorageError> {
        self.load(ROLLOVERS, id)
    }

    pub fn delete_rollover(&self, id: &str) -> Result<(), StorageError> {
        self.delete(ROLLOVERS, id)
    }

    pub fn list_rollovers(&self) -> Result<Vec<Rollover>, StorageError> {
        self.load_all(ROLLOVERS)
    }

    pub fn save_provider(&self, provider: &Provider) -> Result<(), StorageError> {
        self.save(PROVIDERS, &provider.id, provider)
    }

    pub fn list_providers(&self) -> Result<Vec<Provider>, StorageError> {
        self.load_all(PROVIDERS)
    }

    pub fn save_notification(&self, message: &NotificationMessage) -> Result<(), StorageError> {
        self.save(NOTIFICATIONS, &message.id, message)
    }

    pub fn load_notification(&self, id: &str) -> Result<NotificationMessage, StorageError> {
        self.load(NOTIFICATIONS, id)
    }

    pub fn delete_notification(&self, id: &str) -> Result<(), StorageError> {
        self.delete(NOTIFICATIONS, id)
    }

    /// All notifications, newest first
    pub fn list_notifications(&self) -> Result<Vec<NotificationMessage>, StorageError> {
        let mut messages: Vec<NotificationMessage> = self.load_all(NOTIFICATIONS)?;
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    pub fn save_delivery(&self, record: &DeliveryRecord) -> Result<(), StorageError> {
        self.save(DELIVERIES, &record.id, record)
    }

    pub fn list_deliveries(&self) -> Result<Vec<DeliveryRecord>, StorageError> {
        self.load_all(DELIVERIES)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
