//! # SessionSockets Traits
//!
//! Seams between the reconnecting client and the outside world:
//!
//! - **Transport / Socket**: open a connection, send raw frames, report lifecycle events
//! - **MessageSink**: where delivered messages go
//! - **ReconnectionStrategy**: how long to wait before re-dialling
//! - **WsMessage** plus the JSON frame codec

pub mod error;
pub mod parser;
pub mod reconnect;
pub mod sink;
pub mod transport;

pub use error::{Result, SessionSocketError};
pub use parser::{decode_batch, encode_frame, WsMessage};
pub use reconnect::{
    ExponentialBackoff, FixedDelay, NeverReconnect, ReconnectionStrategy, DEFAULT_RECONNECT_DELAY,
};
pub use sink::{MessageBuffer, MessageSink};
pub use transport::{Socket, SocketEvent, SocketEvents, SocketId, Transport};
