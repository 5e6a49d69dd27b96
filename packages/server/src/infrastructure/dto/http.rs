//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// A live room and how many sessions are joined under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    /// Room key, e.g. `material_{uuid}` or `direct_{low}_{high}`
    pub room: String,
    pub members: usize,
}

/// One persisted chat message in a history listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessageDto {
    pub message_id: i64,
    pub message: String,
    pub sender: String,
    pub sender_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<i64>,
    /// Unix milliseconds (UTC)
    pub timestamp: i64,
    /// RFC 3339 rendering of `timestamp`
    pub created_at: String,
}

/// Recent messages of a room, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHistoryDto {
    pub room: String,
    pub messages: Vec<HistoryMessageDto>,
}

/// Direct messages sent or received by one user, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectInboxDto {
    pub user_id: i64,
    pub messages: Vec<HistoryMessageDto>,
}

/// Request body for posting a message over HTTP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMessageRequest {
    pub message: String,
}
