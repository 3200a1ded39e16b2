//! End-to-end tests against a local WebSocket server
//!
//! These use real sockets and real time, with a short reconnect delay.

mod common;

use common::{wait_until, MockWsServer};
use serde_json::{json, Value};
use sessionsockets::{ConnectionStatus, MessageBuffer, SendOutcome, SessionClient};
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn client_for(server: &MockWsServer, messages: &MessageBuffer<Value>) -> SessionClient<Value> {
    sessionsockets::builder()
        .session_id("s1")
        .sink(messages.clone())
        .base_url(server.ws_url())
        .query_param("user_id", "u1")
        .reconnect_delay(Duration::from_millis(250))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_queued_messages_reach_server_after_handshake() {
    let server = MockWsServer::start().await;
    let messages = MessageBuffer::new();
    let client = client_for(&server, &messages);

    assert_eq!(client.send(json!({"id": "m1"})), SendOutcome::Queued);
    assert_eq!(client.send(json!({"id": "m2"})), SendOutcome::Queued);
    client.connect();

    assert!(wait_until(WAIT, || client.is_connected()).await);
    assert!(wait_until(WAIT, || server.received().len() == 2).await);
    assert_eq!(
        server.received(),
        vec![r#"{"id":"m1"}"#.to_string(), r#"{"id":"m2"}"#.to_string()]
    );
    assert_eq!(
        server.request_uris(),
        vec!["/ws/session?session_id=s1&user_id=u1".to_string()]
    );

    assert_eq!(client.send(json!({"id": "m3"})), SendOutcome::Sent);
    assert!(wait_until(WAIT, || server.received().len() == 3).await);

    client.disconnect();
}

#[tokio::test]
async fn test_inbound_batches_land_in_sink() {
    let server = MockWsServer::start().await;
    let messages = MessageBuffer::new();
    let client = client_for(&server, &messages);
    let mut len = messages.subscribe();

    client.connect();
    assert!(wait_until(WAIT, || client.is_connected()).await);

    server.push("not json");
    server.push(r#"[{"id":"a"},{"id":"b"}]"#);

    tokio::time::timeout(WAIT, len.wait_for(|len| *len == 2))
        .await
        .expect("batch not delivered")
        .unwrap();
    assert_eq!(messages.snapshot(), vec![json!({"id": "a"}), json!({"id": "b"})]);
    assert!(client.is_connected());
    assert_eq!(client.metrics().parse_failures, 1);

    client.disconnect();
}

#[tokio::test]
async fn test_reconnects_after_server_closes_and_flushes_backlog() {
    let server = MockWsServer::start().await;
    let messages = MessageBuffer::new();
    let client = client_for(&server, &messages);

    client.connect();
    assert!(wait_until(WAIT, || client.is_connected()).await);

    server.drop_connections();
    assert!(
        wait_until(WAIT, || client.status() == Some(ConnectionStatus::Disconnected)).await
    );
    assert_eq!(client.send(json!({"id": "while-down"})), SendOutcome::Queued);

    assert!(wait_until(WAIT, || server.accepted() == 2).await);
    assert!(wait_until(WAIT, || server.received().len() == 1).await);
    assert_eq!(server.received(), vec![r#"{"id":"while-down"}"#.to_string()]);
    assert_eq!(client.queue_len(), 0);

    client.disconnect();
}

#[tokio::test]
async fn test_disconnect_stops_reconnecting() {
    let server = MockWsServer::start().await;
    let messages = MessageBuffer::new();
    let client = client_for(&server, &messages);

    client.connect();
    assert!(wait_until(WAIT, || client.is_connected()).await);

    client.disconnect();
    assert_eq!(client.status(), None);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(server.accepted(), 1);
    assert_eq!(client.status(), None);
}

#[tokio::test]
async fn test_unreachable_server_keeps_retrying() {
    // Bind and immediately drop to get a port nothing listens on
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let messages: MessageBuffer<Value> = MessageBuffer::new();
    let client = sessionsockets::builder()
        .session_id("s1")
        .sink(messages.clone())
        .base_url(format!("ws://{}", addr))
        .reconnect_delay(Duration::from_millis(50))
        .build()
        .unwrap();

    client.send(json!({"id": "kept"}));
    client.connect();

    assert!(wait_until(WAIT, || client.metrics().reconnect_count >= 2).await);
    assert_eq!(client.queue_len(), 1);

    client.disconnect();
}
