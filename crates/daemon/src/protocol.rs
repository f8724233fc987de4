// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol: newline-delimited JSON over a Unix socket

use cw_engine::{Command, CommandOutcome};
use cw_core::Event;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};

pub const PROTOCOL_VERSION: &str = "1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client → daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Hello { version: String },
    Ping,
    Command { command: Command },
    /// Stream matching events until the connection closes
    Subscribe { pattern: String },
    Shutdown,
}

/// Daemon → client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Hello { version: String },
    Pong,
    Command { outcome: CommandOutcome },
    Subscribed,
    Event { event: Event },
    ShuttingDown,
    Error { message: String },
}

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request timeout")]
    Timeout,
    #[error("connection closed")]
    ConnectionClosed,
}

/// Encode a message as one JSON line
pub fn encode<T: Serialize>(value: &T) -> Result<String, ProtocolError> {
    let mut line = serde_json::to_string(value)?;
    line.push('\n');
    Ok(line)
}

/// Decode a message from one JSON line
pub fn decode<T: DeserializeOwned>(line: &str) -> Result<T, ProtocolError> {
    Ok(serde_json::from_str(line.trim_end())?)
}

async fn read_line<R>(reader: &mut R, timeout: Duration) -> Result<String, ProtocolError>
where
    R: AsyncBufReadExt + Unpin,
{
    let mut line = String::new();
    let read = tokio::time::timeout(timeout, reader.read_line(&mut line))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    if read == 0 {
        return Err(ProtocolError::ConnectionClosed);
    }
    Ok(line)
}

/// Read one request with a timeout
pub async fn read_request<R>(reader: &mut R, timeout: Duration) -> Result<Request, ProtocolError>
where
    R: AsyncBufReadExt + Unpin,
{
    let line = read_line(reader, timeout).await?;
    decode(&line)
}

/// Read one response with a timeout
pub async fn read_response<R>(reader: &mut R, timeout: Duration) -> Result<Response, ProtocolError>
where
    R: AsyncBufReadExt + Unpin,
{
    let line = read_line(reader, timeout).await?;
    decode(&line)
}

/// Write one request with a timeout
pub async fn write_request<W>(
    writer: &mut W,
    request: &Request,
    timeout: Duration,
) -> Result<(), ProtocolError>
where
    W: AsyncWriteExt + Unpin,
{
    let line = encode(request)?;
    tokio::time::timeout(timeout, writer.write_all(line.as_bytes()))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    Ok(())
}

/// Write one response with a timeout
pub async fn write_response<W>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError>
where
    W: AsyncWriteExt + Unpin,
{
    let line = encode(response)?;
    tokio::time::timeout(timeout, writer.write_all(line.as_bytes()))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    Ok(())
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
