//! WebSocket event codec.
//!
//! Inbound frames (client → server) are JSON objects whose `type` field picks
//! the event kind; a missing `type` means a chat message:
//!
//! ```text
//! {"message": "hi"}                        chat
//! {"type": "typing", "is_typing": true}    typing indicator
//! {"type": "read", "message_ids": [1, 2]}  read receipt
//! ```
//!
//! Outbound frames (server → client) are tagged with `message`,
//! `typing_event`, `read_event` or `error`.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while decoding an inbound frame
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The frame is not valid JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// The frame is JSON but not an object
    #[error("event must be a JSON object")]
    NotAnObject,

    /// The `type` field is not a string
    #[error("event type must be a string")]
    InvalidType,

    /// The `type` field names an event this server does not know
    #[error("unknown event type: {0}")]
    UnknownType(String),

    /// A required field is missing or has the wrong type
    #[error("invalid {kind} event: {reason}")]
    InvalidPayload { kind: &'static str, reason: String },
}

/// Event received from a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum InboundEvent {
    /// Chat message to persist and broadcast
    #[serde(rename = "chat")]
    Chat { message: String },
    /// Typing indicator
    #[serde(rename = "typing")]
    Typing { is_typing: bool },
    /// Read receipt for a set of message ids
    #[serde(rename = "read")]
    Read { message_ids: Vec<i64> },
}

#[derive(Deserialize)]
struct ChatPayload {
    message: String,
}

#[derive(Deserialize)]
struct TypingPayload {
    is_typing: bool,
}

#[derive(Deserialize)]
struct ReadPayload {
    message_ids: Vec<i64>,
}

fn payload<T: DeserializeOwned>(kind: &'static str, fields: Map<String, Value>) -> Result<T, CodecError> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| CodecError::InvalidPayload {
        kind,
        reason: e.to_string(),
    })
}

impl InboundEvent {
    /// Decode an inbound text frame
    pub fn decode(text: &str) -> Result<Self, CodecError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| CodecError::InvalidJson(e.to_string()))?;
        let Value::Object(mut fields) = value else {
            return Err(CodecError::NotAnObject);
        };

        let kind = match fields.remove("type") {
            None | Some(Value::Null) => None,
            Some(Value::String(kind)) => Some(kind),
            Some(_) => return Err(CodecError::InvalidType),
        };

        match kind.as_deref() {
            None | Some("chat") | Some("message") => {
                let ChatPayload { message } = payload("chat", fields)?;
                Ok(Self::Chat { message })
            }
            Some("typing") => {
                let TypingPayload { is_typing } = payload("typing", fields)?;
                Ok(Self::Typing { is_typing })
            }
            Some("read") => {
                let ReadPayload { message_ids } = payload("read", fields)?;
                Ok(Self::Read { message_ids })
            }
            Some(other) => Err(CodecError::UnknownType(other.to_string())),
        }
    }

    /// Encode for sending to a server
    pub fn encode(&self) -> String {
        encode_total(self)
    }
}

/// A persisted chat message as seen by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessagePayload {
    /// Message body
    pub message: String,
    /// Sender display name
    pub sender: String,
    pub sender_id: i64,
    pub message_id: i64,
    /// Server timestamp, Unix milliseconds (UTC)
    pub timestamp: i64,
    /// Direct rooms only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<i64>,
}

/// Event delivered to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundEvent {
    #[serde(rename = "message")]
    Message(ChatMessagePayload),
    #[serde(rename = "typing_event")]
    Typing { user_id: i64, is_typing: bool },
    #[serde(rename = "read_event")]
    Read { user_id: i64, message_ids: Vec<i64> },
    #[serde(rename = "error")]
    Error { error: String },
}

impl OutboundEvent {
    /// Error event addressed to the originating session only
    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }

    /// Encode for sending to a client
    pub fn encode(&self) -> String {
        encode_total(self)
    }

    /// Decode an outbound frame (client side)
    pub fn decode(text: &str) -> Result<Self, CodecError> {
        serde_json::from_str(text).map_err(|e| CodecError::InvalidJson(e.to_string()))
    }
}

/// Serialize an internally built event.
///
/// These types only hold strings, integers, booleans and integer lists, so
/// serialization cannot fail.
fn encode_total<T: Serialize>(event: &T) -> String {
    serde_json::to_string(event).unwrap_or_else(|e| {
        tracing::error!("Failed to encode event: {}", e);
        String::from(r#"{"type":"error","error":"internal error"}"#)
    })
}
