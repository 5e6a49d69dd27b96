//! UseCase: ダイレクトメッセージ受信箱の取得
//!
//! 呼び出したユーザーが送受信したダイレクトメッセージを、相手を問わず
//! 古い順に返します。

use std::sync::Arc;

use crate::domain::{ChatMessage, Identity, MessageStore};

use super::{
    connect_participant::ConnectParticipantUseCase, error::GetMessageHistoryError,
    get_message_history::MAX_HISTORY_LIMIT,
};

/// Direct messages involving one user, oldest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectInbox {
    pub owner: Identity,
    pub messages: Vec<ChatMessage>,
}

/// 受信箱取得のユースケース
pub struct GetDirectInboxUseCase {
    connect: Arc<ConnectParticipantUseCase>,
    store: Arc<dyn MessageStore>,
    default_limit: usize,
}

impl GetDirectInboxUseCase {
    /// 新しい GetDirectInboxUseCase を作成
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

    /// 受信箱取得を実行
    ///
    /// Only authentication is needed: every message returned involves the caller.
    pub async fn execute(
        &self,
        token: Option<&str>,
        limit: Option<usize>,
    ) -> Result<DirectInbox, GetMessageHistoryError> {
        let owner = self.connect.authenticate(token).await?;
        let limit = limit
            .unwrap_or(self.default_limit)
            .clamp(1, MAX_HISTORY_LIMIT);

        let messages = self
            .store
            .direct_inbox(owner.user_id, limit)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load direct inbox of user {}: {}", owner.user_id, e);
                GetMessageHistoryError::StoreFailed(e.to_string())
            })?;

        Ok(DirectInbox { owner, messages })
    }
}
