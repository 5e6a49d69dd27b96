//! UseCase: タイピング通知・既読通知の中継
//!
//! Neither signal is persisted. Both are delivered to every other session of
//! the sender's room and may be dropped for slow receivers.

use std::sync::Arc;

use crate::{
    domain::{RoomRegistry, Session},
    infrastructure::dto::websocket::OutboundEvent,
};

/// シグナル中継のユースケース
pub struct RelaySignalUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl RelaySignalUseCase {
    /// 新しい RelaySignalUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// タイピング状態を中継し、配信できたセッション数を返す
    pub async fn typing(&self, session: &Session, is_typing: bool) -> usize {
        let event = OutboundEvent::Typing {
            user_id: session.identity.user_id.value(),
            is_typing,
        };
        self.relay(session, event).await
    }

    /// 既読通知を中継し、配信できたセッション数を返す
    ///
    /// An empty id list is relayed as is.
    pub async fn read(&self, session: &Session, message_ids: Vec<i64>) -> usize {
        let event = OutboundEvent::Read {
            user_id: session.identity.user_id.value(),
            message_ids,
        };
        self.relay(session, event).await
    }

    async fn relay(&self, session: &Session, event: OutboundEvent) -> usize {
        self.registry
            .broadcast(&session.room, &event.encode(), Some(&session.id))
            .await
    }
}
