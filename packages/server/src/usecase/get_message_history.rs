//! UseCase: メッセージ履歴取得
//!
//! 履歴の閲覧には WebSocket 接続と同じ認証・認可が必要です。

use std::sync::Arc;

use crate::domain::{ChatMessage, MessageStore, RoomKey, RoomTarget};

use super::{connect_participant::ConnectParticipantUseCase, error::GetMessageHistoryError};

/// Upper bound for a requested page size
pub const MAX_HISTORY_LIMIT: usize = 200;

/// Recent messages of one room, oldest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHistory {
    pub room: RoomKey,
    pub messages: Vec<ChatMessage>,
}

/// メッセージ履歴取得のユースケース
pub struct GetMessageHistoryUseCase {
    connect: Arc<ConnectParticipantUseCase>,
    store: Arc<dyn MessageStore>,
    default_limit: usize,
}

impl GetMessageHistoryUseCase {
    /// 新しい GetMessageHistoryUseCase を作成
    pub fn new(
        connect: Arc<ConnectParticipantUseCase>,
        store: Arc<dyn MessageStore>,
        default_limit: usize,
    ) -> Self {
        Self {
            connect,
            store,
            default_limit: default_limit.clamp(1, MAX_HISTORY_LIMIT),
        }
    }

    /// 履歴取得を実行
    ///
    /// `limit` is clamped to `1..=MAX_HISTORY_LIMIT`; `None` uses the default.
    pub async fn execute(
        &self,
        token: Option<&str>,
        target: RoomTarget,
        limit: Option<usize>,
    ) -> Result<MessageHistory, GetMessageHistoryError> {
        let admission = self.connect.execute(token, target).await?;
        let limit = limit
            .unwrap_or(self.default_limit)
            .clamp(1, MAX_HISTORY_LIMIT);

        let messages = self
            .store
            .recent(admission.room, limit)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load history of {}: {}", admission.room, e);
                GetMessageHistoryError::StoreFailed(e.to_string())
            })?;

        Ok(MessageHistory {
            room: admission.room,
            messages,
        })
    }
}
