//! External collaborator traits.
//!
//! ドメイン層が必要とする外部サービスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! None of these results are cached by the core: authorization is asked again
//! at every handshake.

use async_trait::async_trait;

use super::{
    ChatMessage, Identity, MaterialId, NewChatMessage, RepositoryError, RoomKey, UserId,
    VerifyError,
};

/// Turns a bearer credential into a verified identity
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify `token` and return the identity it belongs to
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError>;
}

/// Read access to the classroom backend's users
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a user's identity
    async fn find(&self, user_id: UserId) -> Result<Option<Identity>, RepositoryError>;

    /// Whether the user exists
    async fn exists(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        Ok(self.find(user_id).await?.is_some())
    }
}

/// Answers material room membership questions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorizationOracle: Send + Sync {
    /// Whether the material exists at all
    async fn material_exists(&self, material_id: MaterialId) -> Result<bool, RepositoryError>;

    /// Whether `user_id` is enrolled in the classroom owning `material_id`, or teaches it
    async fn is_material_member(
        &self,
        user_id: UserId,
        material_id: MaterialId,
    ) -> Result<bool, RepositoryError>;
}

/// Durable, append-only chat message record
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message, assigning its identifier and server timestamp
    async fn append(&self, message: NewChatMessage) -> Result<ChatMessage, RepositoryError>;

    /// The most recent `limit` messages of a room, oldest first
    async fn recent(&self, room: RoomKey, limit: usize)
    -> Result<Vec<ChatMessage>, RepositoryError>;

    /// The most recent `limit` direct messages sent or received by `user_id`,
    /// across every peer, oldest first
    async fn direct_inbox(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;
}
