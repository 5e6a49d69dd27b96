//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use std::fmt;

use classchat_server::infrastructure::dto::websocket::InboundEvent;

use crate::error::ClientError;

/// Room the client connects to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomSelector {
    /// Group chat of a material (UUID)
    Material(String),
    /// Direct chat with another user
    Direct(i64),
}

impl fmt::Display for RoomSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Material(id) => write!(f, "material:{}", id),
            Self::Direct(id) => write!(f, "direct:{}", id),
        }
    }
}

/// WebSocket URL of `room` on the server at `base_url`, with the token as a
/// query parameter
pub fn connect_url(base_url: &str, room: &RoomSelector, token: &str) -> String {
    let base = base_url.trim_end_matches('/');
    match room {
        RoomSelector::Material(id) => format!("{}/ws/material/{}/?token={}", base, id, token),
        RoomSelector::Direct(id) => format!("{}/ws/direct/{}/?token={}", base, id, token),
    }
}

/// One line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Send this event to the server
    Send(InboundEvent),
    /// Show the command list
    Help,
    /// Unusable command, with the reason
    Invalid(String),
}

/// Parse a line of user input.
///
/// `/typing on|off` and `/read <id>...` are commands; anything else is a chat
/// message.
pub fn parse_input(line: &str) -> Input {
    let Some(command) = line.strip_prefix('/') else {
        return Input::Send(InboundEvent::Chat {
            message: line.to_string(),
        });
    };

    let mut words = command.split_whitespace();
    match words.next() {
        Some("typing") => match (words.next(), words.next()) {
            (Some("on"), None) => Input::Send(InboundEvent::Typing { is_typing: true }),
            (Some("off"), None) => Input::Send(InboundEvent::Typing { is_typing: false }),
            _ => Input::Invalid("usage: /typing on|off".to_string()),
        },
        Some("read") => {
            let ids: Result<Vec<i64>, _> = words.map(str::parse::<i64>).collect();
            match ids {
                Ok(ids) if !ids.is_empty() => Input::Send(InboundEvent::Read { message_ids: ids }),
                _ => Input::Invalid("usage: /read <message_id>...".to_string()),
            }
        }
        Some("help") => Input::Help,
        _ => Input::Invalid(format!("unknown command '/{}', try /help", command)),
    }
}

/// Check if the client should exit immediately based on the error type.
///
/// Handshake rejections are final (4xx). A 5xx rejection means the server
/// could not check access right now, so it is retried like a lost connection.
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(error, ClientError::HandshakeRejected(status) if (400..500).contains(status))
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    if should_exit_immediately(error) {
        return false;
    }

    current_attempt < max_attempts
}
