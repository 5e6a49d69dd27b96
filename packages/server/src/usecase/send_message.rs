//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 本文の検証 → 永続化 → ルーム全員（送信者を含む）へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 保存されていないメッセージが他の参加者に見えないことを保証
//! - 空・長すぎる本文が保存も配信もされないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：送信者を含む全員が同じ message_id を受け取る
//! - 異常系：空本文、上限超過、保存失敗
//! - エッジケース：他のルームには配信されない

use std::sync::Arc;

use crate::{
    domain::{
        ChatMessage, Identity, MessageBody, MessageStore, NewChatMessage, RoomKey, RoomRegistry,
        Session,
    },
    infrastructure::dto::websocket::OutboundEvent,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    store: Arc<dyn MessageStore>,
    registry: Arc<dyn RoomRegistry>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(store: Arc<dyn MessageStore>, registry: Arc<dyn RoomRegistry>) -> Self {
        Self { store, registry }
    }

    /// メッセージ送信を実行
    ///
    /// The message is broadcast only after the store has accepted it, and the
    /// sender's own sessions receive it as well.
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 保存されたメッセージ
    /// * `Err(SendMessageError)` - 検証または保存に失敗（ブロードキャストなし）
    pub async fn execute(
        &self,
        session: &Session,
        text: String,
    ) -> Result<ChatMessage, SendMessageError> {
        self.send_as(&session.identity, session.room, text).await
    }

    /// 接続を持たない送信者（HTTP API）としてメッセージを送信
    ///
    /// Same validation, persistence and broadcast as [`Self::execute`].
    pub async fn send_as(
        &self,
        sender: &Identity,
        room: RoomKey,
        text: String,
    ) -> Result<ChatMessage, SendMessageError> {
        // 1. 本文の検証
        let body = MessageBody::new(text)?;

        // 2. 永続化
        let new_message = NewChatMessage::new(room, sender.clone(), body);
        let stored = self.store.append(new_message).await.map_err(|e| {
            tracing::error!(
                "Failed to store message from user {} in {}: {}",
                sender.user_id,
                room,
                e
            );
            SendMessageError::StoreFailed(e.to_string())
        })?;

        // 3. ブロードキャスト
        let payload = OutboundEvent::from(&stored).encode();
        let delivered = self.registry.broadcast(&room, &payload, None).await;
        tracing::debug!(
            "Message {} broadcast to {} session(s) in {}",
            stored.id,
            delivered,
            room
        );

        Ok(stored)
    }
}
