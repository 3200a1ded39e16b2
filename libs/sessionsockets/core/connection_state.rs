use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Connection status of a session client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    /// A socket was opened and the handshake is in progress
    Connecting,
    /// The socket is open and frames flow
    Connected,
    /// The socket closed; a reconnect is usually pending
    Disconnected,
    /// The transport reported an error; a forced close follows
    Error,
}

impl ConnectionStatus {
    fn to_u8(self) -> u8 {
        match self {
            ConnectionStatus::Connecting => 1,
            ConnectionStatus::Connected => 2,
            ConnectionStatus::Disconnected => 3,
            ConnectionStatus::Error => 4,
        }
    }

    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(ConnectionStatus::Connecting),
            2 => Some(ConnectionStatus::Connected),
            3 => Some(ConnectionStatus::Disconnected),
            4 => Some(ConnectionStatus::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Error => "error",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const NO_STATUS: u8 = 0;

/// Lock-free holder for an optional [`ConnectionStatus`]
///
/// `None` means the client is inert: never connected, or torn down by
/// `disconnect()`.
#[derive(Debug)]
pub struct AtomicConnectionState {
    value: AtomicU8,
}

impl AtomicConnectionState {
    pub fn new(status: Option<ConnectionStatus>) -> Self {
        Self {
            value: AtomicU8::new(status.map_or(NO_STATUS, ConnectionStatus::to_u8)),
        }
    }

    #[inline]
    pub fn get(&self) -> Option<ConnectionStatus> {
        ConnectionStatus::from_u8(self.value.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, status: ConnectionStatus) {
        self.value.store(status.to_u8(), Ordering::Release);
    }

    #[inline]
    pub fn clear(&self) {
        self.value.store(NO_STATUS, Ordering::Release);
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.get() == Some(ConnectionStatus::Connected)
    }
}

impl Default for AtomicConnectionState {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Counters kept by the client
#[derive(Debug, Default)]
pub struct AtomicMetrics {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    reconnect_count: AtomicU64,
    parse_failures: AtomicU64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_received(&self, count: u64) {
        self.messages_received.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_reconnects(&self) {
        self.reconnect_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_parse_failures(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    pub fn reconnect_count(&self) -> u64 {
        self.reconnect_count.load(Ordering::Relaxed)
    }

    pub fn parse_failures(&self) -> u64 {
        self.parse_failures.load(Ordering::Relaxed)
    }
}
