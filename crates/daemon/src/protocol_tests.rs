// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol unit tests

use super::*;
use cw_engine::CommandOutcome;

#[test]
fn encode_decode_roundtrip_request() {
    let request = Request::Command {
        command: Command::WatchList,
    };

    let encoded = encode(&request).expect("encode failed");
    assert!(encoded.ends_with('\n'));
    let decoded: Request = decode(&encoded).expect("decode failed");

    assert_eq!(request, decoded);
}

#[test]
fn encode_decode_roundtrip_response() {
    let response = Response::Command {
        outcome: CommandOutcome::ok(serde_json::json!({ "id": "w-1" })),
    };

    let encoded = encode(&response).expect("encode failed");
    let decoded: Response = decode(&encoded).expect("decode failed");

    assert_eq!(response, decoded);
}

#[test]
fn requests_are_tagged_json() {
    let encoded = encode(&Request::Ping).unwrap();
    assert_eq!(encoded.trim_end(), r#"{"type":"ping"}"#);
}

#[test]
fn garbage_fails_to_decode() {
    let result: Result<Request, _> = decode("not json at all");
    assert!(result.is_err());
}

#[tokio::test]
async fn read_request_over_a_buffered_pipe() {
    let (client, server) = tokio::io::duplex(1024);
    let (server_read, _server_write) = tokio::io::split(server);
    let (_client_read, mut client_write) = tokio::io::split(client);

    write_request(&mut client_write, &Request::Ping, DEFAULT_TIMEOUT)
        .await
        .unwrap();

    let mut reader = tokio::io::BufReader::new(server_read);
    let request = read_request(&mut reader, DEFAULT_TIMEOUT).await.unwrap();
    assert_eq!(request, Request::Ping);
}

#[tokio::test]
async fn closed_connection_is_distinguished_from_timeout() {
    let (client, server) = tokio::io::duplex(1024);
    let (server_read, _server_write) = tokio::io::split(server);
    drop(client);

    let mut reader = tokio::io::BufReader::new(server_read);
    let result = read_request(&mut reader, DEFAULT_TIMEOUT).await;
    assert!(matches!(result, Err(ProtocolError::ConnectionClosed)));
}
