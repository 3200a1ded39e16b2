use thiserror::Error;

/// Main error type for sessionsockets
///
/// None of these reach callers of the ordinary client surface: a failed
/// delivery demotes the message to the queue and a transport failure turns
/// into a scheduled reconnect. They show up in logs and in the return values
/// of the transport and codec seams.
#[derive(Error, Debug)]
pub enum SessionSocketError {
    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Connection closed unexpectedly
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Outbound message could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Inbound frame could not be decoded
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Socket is not open
    #[error("Not connected")]
    NotConnected,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Endpoint URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Generic error
    #[error("Error: {0}")]
    Other(String),
}

/// Result type for sessionsockets operations
pub type Result<T> = std::result::Result<T, SessionSocketError>;
