// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket client for talking to the daemon

use anyhow::{bail, Context, Result};
use cw_core::Event;
use cw_daemon::lifecycle::Config;
use cw_daemon::protocol::{self, Request, Response, DEFAULT_TIMEOUT};
use cw_engine::{Command, CommandOutcome};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixStream;

pub struct Client {
    socket_path: PathBuf,
}

impl Client {
    /// Client for the account selected by `CW_ACCOUNT` (default "default")
    pub fn for_current_account() -> Result<Self> {
        let account = std::env::var("CW_ACCOUNT").unwrap_or_else(|_| "default".to_string());
        let config = Config::for_account(&account)?;
        Ok(Self {
            socket_path: config.socket_path,
        })
    }

    async fn connect(&self) -> Result<UnixStream> {
        UnixStream::connect(&self.socket_path).await.with_context(|| {
            format!(
                "cannot reach the daemon at {} (is `cw daemon start` running?)",
                self.socket_path.display()
            )
        })
    }

    /// Send one request and read one response
    pub async fn request(&self, request: Request) -> Result<Response> {
        let stream = self.connect().await?;
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        protocol::write_request(&mut writer, &request, DEFAULT_TIMEOUT).await?;
        let response = protocol::read_response(&mut reader, DEFAULT_TIMEOUT).await?;
        Ok(response)
    }

    /// Run a command and unwrap its envelope
    pub async fn command(&self, command: Command) -> Result<CommandOutcome> {
        match self.request(Request::Command { command }).await? {
            Response::Command { outcome } => Ok(outcome),
            Response::Error { message } => bail!("daemon error: {}", message),
            other => bail!("unexpected response: {:?}", other),
        }
    }

    /// Stream events matching the pattern, invoking the callback per event.
    /// Runs until the daemon closes the connection or the process is
    /// interrupted.
    pub async fn subscribe(&self, pattern: &str, mut on_event: impl FnMut(Event)) -> Result<()> {
        let stream = self.connect().await?;
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        protocol::write_request(
            &mut writer,
            &Request::Subscribe {
                pattern: pattern.to_string(),
            },
            DEFAULT_TIMEOUT,
        )
        .await?;

        match protocol::read_response(&mut reader, DEFAULT_TIMEOUT).await? {
            Response::Subscribed => {}
            other => bail!("unexpected response: {:?}", other),
        }

        // No timeout here: events arrive whenever the engine produces them
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                return Ok(());
            }
            match protocol::decode::<Response>(&line)? {
                Response::Event { event } => on_event(event),
                other => bail!("unexpected response: {:?}", other),
            }
        }
    }
}
