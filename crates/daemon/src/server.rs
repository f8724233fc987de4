// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling

use tokio::io::BufReader;
use tokio::net::UnixStream;
use tracing::{debug, error};

use crate::lifecycle::DaemonState;
use crate::protocol::{
    self, ProtocolError, Request, Response, DEFAULT_TIMEOUT, PROTOCOL_VERSION,
};
use cw_core::{EventPattern, SubscriberId, Subscription, UuidIdGen};
use cw_core::IdGen;

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Handle a single client connection.
///
/// Returns `true` when the client requested a daemon shutdown.
pub async fn handle_connection(
    daemon: &mut DaemonState,
    stream: UnixStream,
) -> Result<bool, ServerError> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(request) => request,
        Err(ProtocolError::Timeout) => {
            error!("request read timeout");
            return Err(ServerError::Protocol(ProtocolError::Timeout));
        }
        Err(ProtocolError::ConnectionClosed) => {
            debug!("client disconnected before sending a request");
            return Ok(false);
        }
        Err(error) => {
            error!(error = %error, "failed to read request");
            return Err(ServerError::Protocol(error));
        }
    };

    debug!(request = ?request, "received request");

    match request {
        Request::Hello { version: _ } => {
            let response = Response::Hello {
                version: PROTOCOL_VERSION.to_string(),
            };
            protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
            Ok(false)
        }

        Request::Ping => {
            protocol::write_response(&mut writer, &Response::Pong, DEFAULT_TIMEOUT).await?;
            Ok(false)
        }

        Request::Command { command } => {
            let outcome = daemon.runtime.handle_command(command).await;
            protocol::write_response(
                &mut writer,
                &Response::Command { outcome },
                DEFAULT_TIMEOUT,
            )
            .await?;
            Ok(false)
        }

        Request::Subscribe { pattern } => {
            let id = format!("conn-{}", UuidIdGen.next());
            let mut rx = daemon.runtime.bus().subscribe(Subscription::new(
                id.clone(),
                vec![EventPattern::new(&pattern)],
                "socket subscriber",
            ));
            protocol::write_response(&mut writer, &Response::Subscribed, DEFAULT_TIMEOUT).await?;

            // Stream until the client hangs up or the bus closes
            while let Some(event) = rx.recv().await {
                let response = Response::Event { event };
                if protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
                    .await
                    .is_err()
                {
                    break;
                }
            }
            daemon.runtime.bus().unsubscribe(&SubscriberId(id));
            Ok(false)
        }

        Request::Shutdown => {
            protocol::write_response(&mut writer, &Response::ShuttingDown, DEFAULT_TIMEOUT)
                .await?;
            daemon.shutdown_requested = true;
            Ok(true)
        }
    }
}
