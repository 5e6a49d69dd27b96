//! Message formatting utilities for client display.

use classchat_server::infrastructure::dto::websocket::{ChatMessagePayload, OutboundEvent};
use classchat_shared::time::timestamp_to_rfc3339;

const RULE: &str = "------------------------------------------------------------";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the banner shown after the handshake succeeds
    pub fn format_connected(room: &str) -> String {
        format!(
            "\n============================================================\n\
             Joined {}\n\
             Type messages and press Enter to send. /help lists commands.\n\
             ============================================================\n",
            room
        )
    }

    /// Format any event received from the server
    pub fn format_event(event: &OutboundEvent) -> String {
        match event {
            OutboundEvent::Message(payload) => Self::format_chat_message(payload),
            OutboundEvent::Typing { user_id, is_typing } => {
                Self::format_typing(*user_id, *is_typing)
            }
            OutboundEvent::Read {
                user_id,
                message_ids,
            } => Self::format_read(*user_id, message_ids),
            OutboundEvent::Error { error } => Self::format_error(error),
        }
    }

    /// Format a chat message
    ///
    /// # Arguments
    ///
    /// * `payload` - The message as delivered by the server
    ///
    /// # Returns
    ///
    /// A formatted string with sender, body, id and send time
    pub fn format_chat_message(payload: &ChatMessagePayload) -> String {
        format!(
            "\n\n{}\n@{}: {}\n#{} sent at {}\n{}\n",
            RULE,
            payload.sender,
            payload.message,
            payload.message_id,
            timestamp_to_rfc3339(payload.timestamp),
            RULE
        )
    }

    pub fn format_typing(user_id: i64, is_typing: bool) -> String {
        if is_typing {
            format!("\n… user {} is typing\n", user_id)
        } else {
            format!("\n… user {} stopped typing\n", user_id)
        }
    }

    pub fn format_read(user_id: i64, message_ids: &[i64]) -> String {
        let ids: Vec<String> = message_ids.iter().map(|id| format!("#{}", id)).collect();
        format!("\n✓ user {} read {}\n", user_id, ids.join(", "))
    }

    pub fn format_error(error: &str) -> String {
        format!("\n! {}\n", error)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }

    /// List of input commands
    pub fn format_help() -> String {
        "\nCommands:\n  \
         /typing on|off     send a typing indicator\n  \
         /read <id>...      mark messages as read\n  \
         /help              show this list\n\
         Anything else is sent as a chat message.\n"
            .to_string()
    }
}
