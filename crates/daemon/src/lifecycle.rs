// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: path resolution, startup, recovery, shutdown

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use cw_adapters::{PortalError, RestPortalClient, TracedPortalClient};
use cw_core::{
    ChannelConfig, ConfigError, EngineConfig, EventLog, Provider, SystemClock, UuidIdGen,
};
use cw_engine::{EngineError, NotificationDispatcher, Runtime, RuntimeDeps};
use cw_storage::{Journal, JournalError, JsonStore, StorageError};
use fs2::FileExt;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::info;

/// Daemon runtime with concrete adapter types
pub type DaemonRuntime = Runtime<TracedPortalClient<RestPortalClient>, SystemClock, UuidIdGen>;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("another daemon already holds {0}")]
    AlreadyRunning(PathBuf),
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),
    #[error("portal error: {0}")]
    Portal(#[from] PortalError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Daemon path configuration, one state directory per portal account
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
    pub store_path: PathBuf,
    pub journal_path: PathBuf,
    pub events_path: PathBuf,
    pub config_path: PathBuf,
}

impl Config {
    /// Resolve paths for an account. Precedence for the base directory:
    /// `CW_STATE_DIR`, then `$HOME/.local/state/cw`.
    pub fn for_account(account: &str) -> Result<Self, LifecycleError> {
        let base = match std::env::var_os("CW_STATE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = std::env::var_os("HOME").ok_or(LifecycleError::MissingEnv("HOME"))?;
                PathBuf::from(home).join(".local/state/cw")
            }
        };
        let state_dir = base.join(account_hash(account));
        Ok(Self {
            socket_path: state_dir.join("cwd.sock"),
            lock_path: state_dir.join("cwd.pid"),
            log_path: state_dir.join("cwd.log"),
            store_path: state_dir.join("store"),
            journal_path: state_dir.join("journal.jsonl"),
            events_path: state_dir.join("events.jsonl"),
            config_path: state_dir.join("config.toml"),
            state_dir,
        })
    }
}

/// Stable short identifier for an account name
fn account_hash(account: &str) -> String {
    let digest = Sha256::digest(account.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex[..12].to_string()
}

/// Daemon state during operation
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): held to maintain the exclusive pid-file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub listener: UnixListener,
    pub runtime: DaemonRuntime,
    pub engine_config: EngineConfig,
    pub shutdown_requested: bool,
}

/// Start the daemon: lock the state dir, load configuration and state,
/// reconcile interrupted rebooks, and bind the socket.
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Exclusive pid-file lock guards against a second daemon for this account
    let mut lock_file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(|_| LifecycleError::AlreadyRunning(config.lock_path.clone()))?;
    writeln!(lock_file, "{}", std::process::id())?;

    let engine_config = EngineConfig::load(&config.config_path)?;

    let portal_url =
        std::env::var("CW_PORTAL_URL").map_err(|_| LifecycleError::MissingEnv("CW_PORTAL_URL"))?;
    let portal_token = std::env::var("CW_PORTAL_TOKEN").ok();
    let portal = TracedPortalClient::new(RestPortalClient::new(
        portal_url,
        portal_token,
        engine_config.portal_timeout,
    )?);

    let store = JsonStore::open(&config.store_path)?;
    let journal = Journal::open(&config.journal_path)?;
    let providers = load_providers(&store)?;
    let dispatcher =
        NotificationDispatcher::new(&providers, engine_config.notify_retry_limit);

    let runtime = Runtime::new(
        RuntimeDeps {
            portal: Arc::new(portal),
            store,
            journal,
            dispatcher,
            config: engine_config.clone(),
        },
        SystemClock,
        UuidIdGen,
    );

    // Resolve any rebook interrupted by a crash before scheduling resumes
    runtime.recover().await?;

    // Audit every event to the state dir
    spawn_event_logger(&runtime, config.events_path.clone());

    // Remove a stale socket from an unclean shutdown
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)?;

    info!(
        state_dir = %config.state_dir.display(),
        tick_interval = ?engine_config.tick_interval,
        "daemon started"
    );

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        listener,
        runtime,
        engine_config,
        shutdown_requested: false,
    })
}

/// Providers come from the store; a fresh install gets the desktop channel
fn load_providers(store: &JsonStore) -> Result<Vec<Provider>, StorageError> {
    let providers = store.list_providers()?;
    if !providers.is_empty() {
        return Ok(providers);
    }
    let default = Provider {
        id: "desktop".to_string(),
        name: "Desktop".to_string(),
        enabled: true,
        config: ChannelConfig::Desktop {},
    };
    store.save_provider(&default)?;
    Ok(vec![default])
}

fn spawn_event_logger(runtime: &DaemonRuntime, path: PathBuf) {
    let mut rx = runtime.bus().set_global_handler();
    tokio::spawn(async move {
        let mut log = match EventLog::open(path) {
            Ok(log) => log,
            Err(error) => {
                tracing::error!(error = %error, "failed to open event log");
                return;
            }
        };
        while let Some(event) = rx.recv().await {
            use cw_core::Clock;
            if let Err(error) = log.append(event, SystemClock.now_utc()) {
                tracing::warn!(error = %error, "failed to append event");
            }
        }
    });
}

/// Remove the socket and pid files on graceful shutdown
pub fn cleanup(config: &Config) {
    for path in [&config.socket_path, &config.lock_path] {
        if let Err(error) = std::fs::remove_file(path) {
            if error.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %error, "cleanup failed");
            }
        }
    }
}
