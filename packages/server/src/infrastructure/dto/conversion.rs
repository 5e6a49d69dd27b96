//! Conversion logic between DTOs and domain entities.

use classchat_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatMessage, RoomKey, RoomSnapshot, UserId};
use crate::infrastructure::dto::{
    http::{DirectInboxDto, HistoryMessageDto, MessageHistoryDto, RoomSummaryDto},
    websocket::{ChatMessagePayload, OutboundEvent},
};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&ChatMessage> for ChatMessagePayload {
    fn from(model: &ChatMessage) -> Self {
        Self {
            message: model.body.as_str().to_string(),
            sender: model.sender.display_name.clone(),
            sender_id: model.sender.user_id.value(),
            message_id: model.id.value(),
            timestamp: model.created_at.value(),
            recipient_id: model.recipient.map(|id| id.value()),
        }
    }
}

impl From<&ChatMessage> for OutboundEvent {
    fn from(model: &ChatMessage) -> Self {
        Self::Message(ChatMessagePayload::from(model))
    }
}

impl From<ChatMessage> for HistoryMessageDto {
    fn from(model: ChatMessage) -> Self {
        Self {
            message_id: model.id.value(),
            sender: model.sender.display_name,
            sender_id: model.sender.user_id.value(),
            recipient_id: model.recipient.map(|id| id.value()),
            timestamp: model.created_at.value(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
            message: model.body.into_string(),
        }
    }
}

impl From<RoomSnapshot> for RoomSummaryDto {
    fn from(snapshot: RoomSnapshot) -> Self {
        Self {
            room: snapshot.room.to_string(),
            members: snapshot.members,
        }
    }
}

impl MessageHistoryDto {
    /// Build a history listing from store output
    pub fn new(room: RoomKey, messages: Vec<ChatMessage>) -> Self {
        Self {
            room: room.to_string(),
            messages: messages.into_iter().map(HistoryMessageDto::from).collect(),
        }
    }
}

impl DirectInboxDto {
    /// Build an inbox listing from store output
    pub fn new(user_id: UserId, messages: Vec<ChatMessage>) -> Self {
        Self {
            user_id: user_id.value(),
            messages: messages.into_iter().map(HistoryMessageDto::from).collect(),
        }
    }
}
