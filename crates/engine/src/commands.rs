// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command surface exposed to the CLI and other frontends
//!
//! Every command resolves to a `{ success, data?, error? }` envelope.

use cw_core::DateRange;
use serde::{Deserialize, Serialize};

fn default_interval() -> u32 {
    30
}

fn default_max_attempts() -> u32 {
    10
}

/// Creation parameters for a watch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchSpec {
    pub name: String,
    pub campground_id: String,
    pub range: DateRange,
    pub guests: u32,
    #[serde(default)]
    pub site_type: Option<String>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default = "default_interval")]
    pub check_interval_minutes: u32,
    #[serde(default)]
    pub auto_book: bool,
    #[serde(default)]
    pub notify_only: bool,
}

/// Creation parameters for a rollover entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloverSpec {
    pub name: String,
    pub campground_id: String,
    pub guests: u32,
    #[serde(default)]
    pub site_type: Option<String>,
    pub current_stay: DateRange,
    pub target_stay: DateRange,
    pub booking_reference: String,
    #[serde(default = "default_interval")]
    pub check_interval_minutes: u32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Commands accepted by the runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    WatchCreate { spec: WatchSpec },
    WatchList,
    WatchGet { id: String },
    WatchActivate { id: String },
    WatchDeactivate { id: String },
    WatchDelete { id: String },
    WatchCheckNow { id: String },

    RolloverCreate { spec: RolloverSpec },
    RolloverList,
    RolloverGet { id: String },
    RolloverActivate { id: String },
    RolloverDeactivate { id: String },
    RolloverDelete { id: String },
    RolloverRunNow { id: String },

    QueueStatus,

    NotificationList { unread_only: bool },
    NotificationMarkRead { id: String },
    NotificationDelete { id: String },

    JobList { limit: usize },
}

/// Result envelope returned for every command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandOutcome {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn commands_round_trip_through_json() {
        let command = Command::WatchCreate {
            spec: WatchSpec {
                name: "Trip".to_string(),
                campground_id: "cg-1".to_string(),
                range: DateRange::new(
                    NaiveDate::from_ymd_opt(2026, 7, 3).unwrap(),
                    NaiveDate::from_ymd_opt(2026, 7, 6).unwrap(),
                ),
                guests: 2,
                site_type: None,
                max_price: Some(40.0),
                check_interval_minutes: 5,
                auto_book: false,
                notify_only: true,
            },
        };

        let json = serde_json::to_string(&command).unwrap();
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(command, back);
    }

    #[test]
    fn spec_defaults_apply_when_fields_are_omitted() {
        let spec: WatchSpec = serde_json::from_str(
            r#"{
                "name": "Trip",
                "campground_id": "cg-1",
                "range": { "start": "2026-07-03", "end": "2026-07-06" },
                "guests": 2
            }"#,
        )
        .unwrap();

        assert_eq!(spec.check_interval_minutes, 30);
        assert!(!spec.auto_book);
        assert!(!spec.notify_only);
    }

    #[test]
    fn error_envelope_skips_the_data_field() {
        let outcome = CommandOutcome::err("watch not found");
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(!json.contains("data"));
        assert!(json.contains("watch not found"));
    }
}
