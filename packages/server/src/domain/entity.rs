//! Core domain models for the chat subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::value_object::{MaterialId, MessageBody, MessageId, SessionId, Timestamp, UserId};

/// Verified user identity, fixed for the lifetime of a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User identifier
    pub user_id: UserId,
    /// Display name shown next to messages
    pub display_name: String,
}

impl Identity {
    /// Create a new identity
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }
}

/// Room requested by a client at connection time, before authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomTarget {
    /// `/material/{material_id}/`
    Material(MaterialId),
    /// `/direct/{other_user_id}/`
    Direct(UserId),
}

/// Key of a broadcast scope in the room registry.
///
/// Rooms are derived, never stored: a key exists in the registry only while
/// at least one session is joined under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomKey {
    /// Group chat of a course material
    Material(MaterialId),
    /// Two-party chat; `low < high` always holds
    Direct { low: UserId, high: UserId },
}

impl RoomKey {
    /// Material room key
    pub fn material(material_id: MaterialId) -> Self {
        Self::Material(material_id)
    }

    /// Canonical direct room key for two users.
    ///
    /// `RoomKey::direct(a, b) == RoomKey::direct(b, a)` for every pair.
    pub fn direct(a: UserId, b: UserId) -> Self {
        if a <= b {
            Self::Direct { low: a, high: b }
        } else {
            Self::Direct { low: b, high: a }
        }
    }

    /// Resolve a requested target into a room key from the caller's point of view
    pub fn resolve(target: RoomTarget, caller: UserId) -> Self {
        match target {
            RoomTarget::Material(material_id) => Self::material(material_id),
            RoomTarget::Direct(peer) => Self::direct(caller, peer),
        }
    }

    /// The other participant of a direct room, if `user` is one of its members
    pub fn direct_peer_of(&self, user: UserId) -> Option<UserId> {
        match *self {
            Self::Direct { low, high } if low == user => Some(high),
            Self::Direct { low, high } if high == user => Some(low),
            _ => None,
        }
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Material(material_id) => write!(f, "material_{}", material_id),
            Self::Direct { low, high } => write!(f, "direct_{}_{}", low, high),
        }
    }
}

/// A joined connection: who is connected, and to which room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub identity: Identity,
    pub room: RoomKey,
}

/// A chat message about to be appended to the message store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatMessage {
    pub room: RoomKey,
    pub sender: Identity,
    /// Set for direct rooms only
    pub recipient: Option<UserId>,
    pub body: MessageBody,
}

impl NewChatMessage {
    /// Build a message sent by `sender` into `room`.
    ///
    /// For direct rooms the recipient is the other member of the room.
    pub fn new(room: RoomKey, sender: Identity, body: MessageBody) -> Self {
        let recipient = room.direct_peer_of(sender.user_id);
        Self {
            room,
            sender,
            recipient,
            body,
        }
    }
}

/// A persisted chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub room: RoomKey,
    pub sender: Identity,
    pub recipient: Option<UserId>,
    pub body: MessageBody,
    pub created_at: Timestamp,
}

impl ChatMessage {
    /// Complete a new message with the identifier and timestamp assigned by the store
    pub fn from_new(message: NewChatMessage, id: MessageId, created_at: Timestamp) -> Self {
        Self {
            id,
            room: message.room,
            sender: message.sender,
            recipient: message.recipient,
            body: message.body,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(id: i64) -> UserId {
        UserId::new(id).unwrap()
    }

    #[test]
    fn test_direct_room_key_is_symmetric() {
        // テスト項目: 2 人のユーザーの順序に関係なく同じダイレクトルームになる
        // given (前提条件):
        let pairs = [(1, 2), (2, 1), (7, 300), (300, 7), (5, 5)];

        for (a, b) in pairs {
            // when (操作):
            let ab = RoomKey::direct(user(a), user(b));
            let ba = RoomKey::direct(user(b), user(a));

            // then (期待する結果):
            assert_eq!(ab, ba);
        }
    }

    #[test]
    fn test_direct_room_key_orders_numerically() {
        // テスト項目: ダイレクトルームのキーは数値の小さい ID が先になる
        // when (操作):
        let key = RoomKey::direct(user(10), user(9));

        // then (期待する結果):
        assert_eq!(
            key,
            RoomKey::Direct {
                low: user(9),
                high: user(10)
            }
        );
        assert_eq!(key.to_string(), "direct_9_10");
    }

    #[test]
    fn test_resolve_direct_target_from_both_sides() {
        // テスト項目: 双方のルート指定が同じルームキーに解決される
        // given (前提条件):
        let u1 = user(1);
        let u2 = user(2);

        // when (操作):
        let from_u1 = RoomKey::resolve(RoomTarget::Direct(u2), u1);
        let from_u2 = RoomKey::resolve(RoomTarget::Direct(u1), u2);

        // then (期待する結果):
        assert_eq!(from_u1, from_u2);
    }

    #[test]
    fn test_material_room_key_display() {
        // テスト項目: 教材ルームのキーが material_{uuid} と表示される
        // given (前提条件):
        let uuid = Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();

        // when (操作):
        let key = RoomKey::material(MaterialId::from_uuid(uuid));

        // then (期待する結果):
        assert_eq!(
            key.to_string(),
            "material_67e55044-10b1-426f-9247-bb680e5fe0c8"
        );
    }

    #[test]
    fn test_new_chat_message_sets_recipient_for_direct_room() {
        // テスト項目: ダイレクトルームのメッセージには受信者が設定される
        // given (前提条件):
        let room = RoomKey::direct(user(1), user(2));
        let sender = Identity::new(user(2), "bob");
        let body = MessageBody::new("hi".to_string()).unwrap();

        // when (操作):
        let message = NewChatMessage::new(room, sender, body);

        // then (期待する結果):
        assert_eq!(message.recipient, Some(user(1)));
    }

    #[test]
    fn test_new_chat_message_has_no_recipient_for_material_room() {
        // テスト項目: 教材ルームのメッセージには受信者が設定されない
        // given (前提条件):
        let room = RoomKey::material(MaterialId::from_uuid(Uuid::new_v4()));
        let sender = Identity::new(user(1), "alice");
        let body = MessageBody::new("hi".to_string()).unwrap();

        // when (操作):
        let message = NewChatMessage::new(room, sender, body);

        // then (期待する結果):
        assert_eq!(message.recipient, None);
    }
}
