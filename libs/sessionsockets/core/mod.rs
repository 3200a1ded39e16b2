//! # SessionSockets core
//!
//! The reconnecting client and its parts:
//!
//! - **connection_state**: lock-free status and counters
//! - **queue**: outbound FIFO
//! - **timer**: single pending reconnect
//! - **client**: the orchestrator tying socket events, queue, timer and sink together
//! - **tungstenite**: the production transport
//!
//! ## Example
//!
//! ```rust,ignore
//! use sessionsockets::{MessageBuffer, SendOutcome};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> sessionsockets::Result<()> {
//!     let messages = MessageBuffer::new();
//!     let client = sessionsockets::builder()
//!         .session_id("s1")
//!         .sink(messages.clone())
//!         .build()?;
//!
//!     // Queued until the socket opens, then flushed in order
//!     assert_eq!(client.send(json!({"id": "m1"})), SendOutcome::Queued);
//!     client.connect();
//!
//!     let mut len = messages.subscribe();
//!     while len.changed().await.is_ok() {
//!         println!("{} messages", *len.borrow());
//!     }
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod connection_state;
pub mod queue;
pub mod timer;
pub mod tungstenite;

// Re-export main types
pub use builder::{states, SessionClientBuilder};
pub use client::{Metrics, SendOutcome, SessionClient, SessionMessage};
pub use config::{ws_base_from_http, ClientConfig, DEFAULT_API_BASE_PATH, SESSION_ENDPOINT_PATH};
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionStatus};
pub use queue::OutboundQueue;
pub use timer::ReconnectTimer;
pub use tungstenite::TungsteniteTransport;

// Re-export traits for convenience
pub use crate::traits::*;

/// Create a new session client builder
pub fn builder() -> SessionClientBuilder<builder::states::NoSession, builder::states::NoSink, ()> {
    SessionClientBuilder::new()
}
