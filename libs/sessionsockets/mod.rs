//! # SessionSockets
//!
//! A reconnecting session client over WebSocket.
//!
//! ## Features
//!
//! - **Never loses outbound messages**: sends made while the socket is down are queued and flushed in order on the next open
//! - **Automatic reconnection**: one pending timer at a time, fixed 3s delay by default, pluggable strategies
//! - **Shared inbound sink**: delivered batches are appended to a caller-owned, observable buffer
//! - **Pluggable transport**: tokio-tungstenite in production, scripted sockets in tests

pub mod traits;
pub mod core;

// Re-export all traits
pub use traits::*;

// Re-export core client functionality
pub use self::core::{
    builder, client, config, connection_state, queue, timer,
    builder::{states, SessionClientBuilder},
    client::{Metrics, SendOutcome, SessionClient, SessionMessage},
    config::{ws_base_from_http, ClientConfig, DEFAULT_API_BASE_PATH, SESSION_ENDPOINT_PATH},
    connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionStatus},
    tungstenite::TungsteniteTransport,
};
