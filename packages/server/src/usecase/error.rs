//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{RepositoryError, ValueObjectError, VerifyError};

/// Handshake rejection.
///
/// Mapped to an HTTP status before the WebSocket upgrade; never sent over a socket.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// No credential, or the credential did not verify
    #[error("authentication failed: {0}")]
    Unauthenticated(VerifyError),

    /// The caller is not a participant of the material room
    #[error("user {user_id} is not a participant of material {material_id}")]
    Forbidden { user_id: i64, material_id: String },

    /// The material does not exist
    #[error("material not found: {0}")]
    MaterialNotFound(String),

    /// The direct room peer does not exist
    #[error("user not found: {0}")]
    PeerNotFound(i64),

    /// A direct room needs two different users
    #[error("cannot open a direct room with yourself")]
    SelfDirect,

    /// A collaborator could not answer
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl From<VerifyError> for ConnectError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::LookupFailed(reason) => Self::Unavailable(reason),
            other => Self::Unauthenticated(other),
        }
    }
}

impl From<RepositoryError> for ConnectError {
    fn from(e: RepositoryError) -> Self {
        Self::Unavailable(e.to_string())
    }
}

/// Chat message rejection; the session stays open
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    #[error("Message cannot be empty")]
    EmptyBody,

    #[error("Message cannot exceed {max} characters (got {actual})")]
    BodyTooLong { max: usize, actual: usize },

    /// The message store failed; nothing was broadcast
    #[error("Message could not be saved")]
    StoreFailed(String),
}

impl From<ValueObjectError> for SendMessageError {
    fn from(e: ValueObjectError) -> Self {
        match e {
            ValueObjectError::MessageBodyTooLong { max, actual } => {
                Self::BodyTooLong { max, actual }
            }
            _ => Self::EmptyBody,
        }
    }
}

/// History lookup failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GetMessageHistoryError {
    #[error(transparent)]
    Access(#[from] ConnectError),

    #[error("history unavailable: {0}")]
    StoreFailed(String),
}

/// HTTP message creation failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PostMessageError {
    #[error(transparent)]
    Access(#[from] ConnectError),

    #[error(transparent)]
    Rejected(#[from] SendMessageError),
}
