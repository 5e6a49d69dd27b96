//! UseCase: HTTP API からのメッセージ投稿
//!
//! 接続と同じ認証・認可を行い、WebSocket からの送信と同じく保存後に
//! ルームの接続中セッションへ配信します。

use std::sync::Arc;

use crate::domain::{ChatMessage, RoomTarget};

use super::{
    connect_participant::ConnectParticipantUseCase, error::PostMessageError,
    send_message::SendMessageUseCase,
};

/// メッセージ投稿のユースケース
pub struct PostMessageUseCase {
    connect: Arc<ConnectParticipantUseCase>,
    send_message: Arc<SendMessageUseCase>,
}

impl PostMessageUseCase {
    /// 新しい PostMessageUseCase を作成
    pub fn new(
        connect: Arc<ConnectParticipantUseCase>,
        send_message: Arc<SendMessageUseCase>,
    ) -> Self {
        Self {
            connect,
            send_message,
        }
    }

    /// メッセージ投稿を実行
    pub async fn execute(
        &self,
        token: Option<&str>,
        target: RoomTarget,
        text: String,
    ) -> Result<ChatMessage, PostMessageError> {
        let admission = self.connect.execute(token, target).await?;
        let stored = self
            .send_message
            .send_as(&admission.identity, admission.room, text)
            .await?;
        Ok(stored)
    }
}
