//! Domain layer for the chat subsystem.
//!
//! This module contains business rules that are independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod room_registry;
pub mod session;
pub mod value_object;

pub use entity::{ChatMessage, Identity, NewChatMessage, RoomKey, RoomTarget, Session};
pub use error::{RepositoryError, SessionStateError, ValueObjectError, VerifyError};
pub use factory::SessionIdFactory;
pub use repository::{AuthorizationOracle, IdentityVerifier, MessageStore, UserDirectory};
pub use room_registry::{PusherChannel, RoomRegistry, RoomSnapshot};
pub use session::SessionState;
pub use value_object::{
    MAX_MESSAGE_BODY_CHARS, MaterialId, MessageBody, MessageId, SessionId, Timestamp, UserId,
};

#[cfg(test)]
pub use repository::{
    MockAuthorizationOracle, MockIdentityVerifier, MockMessageStore, MockUserDirectory,
};
