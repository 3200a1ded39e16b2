use crate::error::{Result, SessionSocketError};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A single WebSocket frame payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    Text(String),
    Binary(Vec<u8>),
}

impl WsMessage {
    /// Get the message as text, if it is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WsMessage::Text(s) => Some(s),
            WsMessage::Binary(_) => None,
        }
    }

    /// Raw payload bytes, whatever the frame kind
    pub fn payload(&self) -> &[u8] {
        match self {
            WsMessage::Text(s) => s.as_bytes(),
            WsMessage::Binary(b) => b,
        }
    }
}

/// Serialize one outbound message into one JSON text frame
pub fn encode_frame<M: Serialize>(message: &M) -> Result<WsMessage> {
    serde_json::to_string(message)
        .map(WsMessage::Text)
        .map_err(|e| SessionSocketError::Serialization(e.to_string()))
}

/// Decode an inbound frame into a batch of messages
///
/// The payload must be a JSON array. A bare object is rejected even if it
/// would decode as a single message.
pub fn decode_batch<M: DeserializeOwned>(frame: &WsMessage) -> Result<Vec<M>> {
    let value: serde_json::Value = serde_json::from_slice(frame.payload())
        .map_err(|e| SessionSocketError::ParseError(e.to_string()))?;

    if !value.is_array() {
        return Err(SessionSocketError::ParseError(format!(
            "expected a JSON array, got {}",
            json_kind(&value)
        )));
    }

    serde_json::from_value(value).map_err(|e| SessionSocketError::ParseError(e.to_string()))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
