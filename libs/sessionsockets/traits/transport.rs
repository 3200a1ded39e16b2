//! Transport seam
//!
//! The client never talks to a network library directly. It asks a
//! [`Transport`] to open a [`Socket`] and learns about the socket's life
//! through [`SocketEvents`]:
//!
//! ```text
//! SessionClient ──open(url)──> Transport ──> Socket (send / close / is_open)
//!       ^                                       │
//!       └────────── SocketEvents::emit ─────────┘
//!                  Open | Message | Close | Error
//! ```
//!
//! Events carry the id of the socket that produced them. Once the client
//! tears a socket down, events still in flight from it are ignored.

use crate::error::Result;
use crate::parser::WsMessage;
use std::fmt;
use std::sync::Weak;

/// Identifier of one socket instance within a client
pub type SocketId = u64;

/// Lifecycle event reported by a socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Handshake finished, the socket is ready
    Open,
    /// A data frame arrived
    Message(WsMessage),
    /// The socket is closed (by either side or after a failure)
    Close,
    /// The transport reported an error; a close normally follows
    Error(String),
}

/// Receiver side of socket events (implemented by the client)
pub(crate) trait SocketEventHandler: Send + Sync {
    fn on_socket_event(&self, id: SocketId, event: SocketEvent);
}

/// Handle a socket uses to report its lifecycle back to the client
///
/// Holds only a weak reference, so a socket task outliving its client
/// does not keep the client alive.
#[derive(Clone)]
pub struct SocketEvents {
    id: SocketId,
    handler: Weak<dyn SocketEventHandler>,
}

impl SocketEvents {
    pub(crate) fn new(id: SocketId, handler: Weak<dyn SocketEventHandler>) -> Self {
        Self { id, handler }
    }

    /// Id of the socket these events belong to
    pub fn id(&self) -> SocketId {
        self.id
    }

    /// Deliver an event; returns false if the client no longer exists
    pub fn emit(&self, event: SocketEvent) -> bool {
        match self.handler.upgrade() {
            Some(handler) => {
                handler.on_socket_event(self.id, event);
                true
            }
            None => false,
        }
    }

    pub fn opened(&self) -> bool {
        self.emit(SocketEvent::Open)
    }

    pub fn message(&self, frame: WsMessage) -> bool {
        self.emit(SocketEvent::Message(frame))
    }

    pub fn closed(&self) -> bool {
        self.emit(SocketEvent::Close)
    }

    pub fn error(&self, reason: impl Into<String>) -> bool {
        self.emit(SocketEvent::Error(reason.into()))
    }
}

impl fmt::Debug for SocketEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketEvents").field("id", &self.id).finish()
    }
}

/// Factory for sockets
///
/// Implementations must never emit events synchronously from inside
/// [`Transport::open`], [`Socket::send`] or [`Socket::close`]; the client
/// holds its state lock while calling them.
pub trait Transport: Send + Sync + 'static {
    /// Start connecting to `url` and return the socket immediately
    ///
    /// `Open` (or `Error`/`Close`) is reported later through `events`.
    /// An `Err` here means the attempt could not even be started.
    fn open(&self, url: &str, events: SocketEvents) -> Result<Box<dyn Socket>>;
}

/// A single bidirectional channel
pub trait Socket: Send {
    /// Whether the socket is ready to carry frames
    fn is_open(&self) -> bool;

    /// Raw send primitive; an `Err` is a delivery failure
    fn send(&mut self, frame: WsMessage) -> Result<()>;

    /// Close the socket; the `Close` event is reported asynchronously
    fn close(&mut self);
}
