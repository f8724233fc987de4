// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! cw: command-line client for the Camp Warden daemon

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod output;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use client::Client;
use cw_core::DateRange;
use cw_daemon::protocol::{Request, Response};
use cw_engine::{Command, RolloverSpec, WatchSpec};
use output::print_outcome;

#[derive(Parser)]
#[command(name = "cw", about = "Camp Warden: campground booking automation", version)]
struct Cli {
    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Availability watches
    Watch {
        #[command(subcommand)]
        action: WatchAction,
    },
    /// Advance-booking rollovers
    Rollover {
        #[command(subcommand)]
        action: RolloverAction,
    },
    /// Portal waiting-room status
    Queue {
        #[command(subcommand)]
        action: QueueAction,
    },
    /// In-app notifications
    Notify {
        #[command(subcommand)]
        action: NotifyAction,
    },
    /// Job log
    Jobs {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Stream engine events
    Events {
        #[arg(long, default_value = "*")]
        pattern: String,
    },
    /// Daemon control
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
}

#[derive(Subcommand)]
enum WatchAction {
    /// Create a watch (active immediately)
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        campground: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long, default_value_t = 2)]
        guests: u32,
        #[arg(long)]
        site_type: Option<String>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long, default_value_t = 30)]
        interval_minutes: u32,
        #[arg(long)]
        auto_book: bool,
        #[arg(long)]
        notify_only: bool,
    },
    /// List watches
    Ls,
    /// Show one watch
    Show { id: String },
    /// Resume scheduling
    Activate { id: String },
    /// Suppress future scheduling
    Deactivate { id: String },
    /// Run a check immediately, bypassing the schedule
    CheckNow { id: String },
    /// Delete a watch
    Rm { id: String },
}

#[derive(Subcommand)]
enum RolloverAction {
    /// Create a rollover entry (active immediately)
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        campground: String,
        #[arg(long, default_value_t = 2)]
        guests: u32,
        #[arg(long)]
        site_type: Option<String>,
        #[arg(long)]
        booking_ref: String,
        #[arg(long)]
        current_start: NaiveDate,
        #[arg(long)]
        current_end: NaiveDate,
        #[arg(long)]
        target_start: NaiveDate,
        #[arg(long)]
        target_end: NaiveDate,
        #[arg(long, default_value_t = 30)]
        interval_minutes: u32,
        #[arg(long, default_value_t = 10)]
        max_attempts: u32,
    },
    /// List rollover entries
    Ls,
    /// Show one entry
    Show { id: String },
    /// Resume scheduling
    Activate { id: String },
    /// Suppress future scheduling
    Deactivate { id: String },
    /// Run a cycle immediately, bypassing the schedule
    RunNow { id: String },
    /// Delete an entry
    Rm { id: String },
}

#[derive(Subcommand)]
enum QueueAction {
    /// Show the waiting-room session
    Status,
}

#[derive(Subcommand)]
enum NotifyAction {
    /// List notifications
    Ls {
        #[arg(long)]
        unread: bool,
    },
    /// Mark a notification read
    Read { id: String },
    /// Delete a notification
    Rm { id: String },
}

#[derive(Subcommand)]
enum DaemonAction {
    /// Start cwd in the background
    Start,
    /// Ask the daemon to shut down
    Stop,
    /// Check whether the daemon responds
    Status,
}

const WATCH_COLUMNS: &[&str] = &[
    "id",
    "name",
    "campground_id",
    "active",
    "last_result",
    "found_count",
    "next_check_at",
];
const ROLLOVER_COLUMNS: &[&str] = &[
    "id",
    "name",
    "booking_reference",
    "attempts",
    "max_attempts",
    "next_check_at",
];
const NOTIFY_COLUMNS: &[&str] = &["id", "kind", "title", "read", "created_at"];
const JOB_COLUMNS: &[&str] = &["kind", "target_id", "status", "detail", "error", "duration_ms"];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let exit = run(cli).await?;
    std::process::exit(exit)
}

async fn run(cli: Cli) -> Result<i32> {
    let client = Client::for_current_account()?;

    let (command, columns): (Command, Option<&[&str]>) = match cli.command {
        Commands::Watch { action } => match action {
            WatchAction::Add {
                name,
                campground,
                start,
                end,
                guests,
                site_type,
                max_price,
                interval_minutes,
                auto_book,
                notify_only,
            } => (
                Command::WatchCreate {
                    spec: WatchSpec {
                        name,
                        campground_id: campground,
                        range: DateRange::new(start, end),
                        guests,
                        site_type,
                        max_price,
                        check_interval_minutes: interval_minutes,
                        auto_book,
                        notify_only,
                    },
                },
                None,
            ),
            WatchAction::Ls => (Command::WatchList, Some(WATCH_COLUMNS)),
            WatchAction::Show { id } => (Command::WatchGet { id }, None),
            WatchAction::Activate { id } => (Command::WatchActivate { id }, None),
            WatchAction::Deactivate { id } => (Command::WatchDeactivate { id }, None),
            WatchAction::CheckNow { id } => (Command::WatchCheckNow { id }, None),
            WatchAction::Rm { id } => (Command::WatchDelete { id }, None),
        },

        Commands::Rollover { action } => match action {
            RolloverAction::Add {
                name,
                campground,
                guests,
                site_type,
                booking_ref,
                current_start,
                current_end,
                target_start,
                target_end,
                interval_minutes,
                max_attempts,
            } => (
                Command::RolloverCreate {
                    spec: RolloverSpec {
                        name,
                        campground_id: campground,
                        guests,
                        site_type,
                        current_stay: DateRange::new(current_start, current_end),
                        target_stay: DateRange::new(target_start, target_end),
                        booking_reference: booking_ref,
                        check_interval_minutes: interval_minutes,
                        max_attempts,
                    },
                },
                None,
            ),
            RolloverAction::Ls => (Command::RolloverList, Some(ROLLOVER_COLUMNS)),
            RolloverAction::Show { id } => (Command::RolloverGet { id }, None),
            RolloverAction::Activate { id } => (Command::RolloverActivate { id }, None),
            RolloverAction::Deactivate { id } => (Command::RolloverDeactivate { id }, None),
            RolloverAction::RunNow { id } => (Command::RolloverRunNow { id }, None),
            RolloverAction::Rm { id } => (Command::RolloverDelete { id }, None),
        },

        Commands::Queue {
            action: QueueAction::Status,
        } => (Command::QueueStatus, None),

        Commands::Notify { action } => match action {
            NotifyAction::Ls { unread } => (
                Command::NotificationList {
                    unread_only: unread,
                },
                Some(NOTIFY_COLUMNS),
            ),
            NotifyAction::Read { id } => (Command::NotificationMarkRead { id }, None),
            NotifyAction::Rm { id } => (Command::NotificationDelete { id }, None),
        },

        Commands::Jobs { limit } => (Command::JobList { limit }, Some(JOB_COLUMNS)),

        Commands::Events { pattern } => {
            client
                .subscribe(&pattern, |event| {
                    match serde_json::to_string(&event) {
                        Ok(json) => println!("{}  {}", event.name(), json),
                        Err(_) => println!("{}", event.name()),
                    }
                })
                .await?;
            return Ok(0);
        }

        Commands::Daemon { action } => return daemon_action(&client, action).await,
    };

    let outcome = client.command(command).await?;
    Ok(print_outcome(&outcome, cli.json, columns))
}

async fn daemon_action(client: &Client, action: DaemonAction) -> Result<i32> {
    match action {
        DaemonAction::Start => {
            // Already running?
            if client.request(Request::Ping).await.is_ok() {
                println!("daemon already running");
                return Ok(0);
            }
            let exe = std::env::current_exe()?;
            let cwd = exe
                .parent()
                .map(|dir| dir.join("cwd"))
                .filter(|p| p.exists())
                .unwrap_or_else(|| "cwd".into());
            std::process::Command::new(cwd).spawn()?;
            println!("daemon starting");
            Ok(0)
        }

        DaemonAction::Stop => match client.request(Request::Shutdown).await? {
            Response::ShuttingDown => {
                println!("daemon stopping");
                Ok(0)
            }
            other => bail!("unexpected response: {:?}", other),
        },

        DaemonAction::Status => match client.request(Request::Ping).await {
            Ok(Response::Pong) => {
                println!("daemon running");
                Ok(0)
            }
            Ok(other) => bail!("unexpected response: {:?}", other),
            Err(_) => {
                println!("daemon not running");
                Ok(1)
            }
        },
    }
}
