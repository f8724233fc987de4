// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Camp Warden daemon (cwd)
//!
//! Background process that polls campground availability, runs the
//! cancel-and-rebook cycles, and serves the command socket.

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use cw_daemon::lifecycle::{self, Config};
use cw_daemon::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let account = std::env::var("CW_ACCOUNT").unwrap_or_else(|_| "default".to_string());
    let config = Config::for_account(&account)?;
    std::fs::create_dir_all(&config.state_dir)?;

    // File logging; RUST_LOG filters as usual
    let appender = tracing_appender::rolling::never(
        &config.state_dir,
        config
            .log_path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("cwd.log")),
    );
    let (writer, _log_guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .with_ansi(false)
        .init();

    info!(account = %account, "starting cwd");

    let mut daemon = match lifecycle::startup(&config).await {
        Ok(daemon) => daemon,
        Err(error) => {
            error!(error = %error, "failed to start daemon");
            return Err(error.into());
        }
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut tick = tokio::time::interval(daemon.engine_config.tick_interval);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(socket = %config.socket_path.display(), "daemon ready");

    // Signal readiness to a waiting parent (CLI `daemon start`)
    println!("READY");

    loop {
        tokio::select! {
            // Client connections
            result = daemon.listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        match server::handle_connection(&mut daemon, stream).await {
                            Ok(true) => break,
                            Ok(false) => {}
                            Err(error) => error!(error = %error, "connection error"),
                        }
                    }
                    Err(error) => error!(error = %error, "accept error"),
                }
            }

            // Scheduler tick: dispatched jobs run detached
            _ = tick.tick() => {
                match daemon.runtime.run_tick().await {
                    Ok(handles) => {
                        if !handles.is_empty() {
                            tracing::debug!(jobs = handles.len(), "tick dispatched jobs");
                        }
                    }
                    Err(error) => error!(error = %error, "tick failed"),
                }
            }

            _ = sigterm.recv() => {
                info!("received SIGTERM");
                break;
            }

            _ = sigint.recv() => {
                info!("received SIGINT");
                break;
            }
        }
    }

    info!("shutting down");
    lifecycle::cleanup(&config);
    Ok(())
}
