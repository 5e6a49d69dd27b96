//! Domain factories for creating value objects.

use super::SessionId;

/// Factory for generating SessionId instances.
///
/// This factory encapsulates the logic for generating new session identifiers,
/// separating the generation concern from the validation logic in SessionId.
pub struct SessionIdFactory;

impl SessionIdFactory {
    /// Generate a new SessionId with a random UUID v4.
    pub fn generate() -> SessionId {
        SessionId::from_uuid(uuid::Uuid::new_v4())
    }
}
