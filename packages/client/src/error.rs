//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server refused the handshake (bad token, no access, unknown room)
    #[error("Server rejected the connection with HTTP {0}")]
    HandshakeRejected(u16),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}
