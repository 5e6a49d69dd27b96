//! UseCase: 接続中セッションの受信イベント処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ChatSession::handle_text() / handle_binary() メソッド
//! - 受信フレームのデコードと各ユースケースへの振り分け
//!
//! ### なぜこのテストが必要か
//! - 不正なフレームでセッションが切断されず、送信者にだけエラーが返ることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：チャット、タイピング、既読
//! - 異常系：不正 JSON、未知の type、空本文、バイナリフレーム

use std::sync::Arc;

use crate::{
    domain::{ChatMessage, RoomRegistry, Session},
    infrastructure::dto::websocket::{InboundEvent, OutboundEvent},
};

use super::{relay_signal::RelaySignalUseCase, send_message::SendMessageUseCase};

/// Result of handling one inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A chat message was stored and broadcast
    Sent(ChatMessage),
    /// A typing or read signal reached `delivered` other sessions
    Relayed { delivered: usize },
    /// The frame was refused; an `error` event went to this session only
    Rejected(String),
}

/// Inbound event dispatcher of one joined session
pub struct ChatSession {
    session: Session,
    send_message: Arc<SendMessageUseCase>,
    relay_signal: Arc<RelaySignalUseCase>,
    registry: Arc<dyn RoomRegistry>,
}

impl ChatSession {
    pub fn new(
        session: Session,
        send_message: Arc<SendMessageUseCase>,
        relay_signal: Arc<RelaySignalUseCase>,
        registry: Arc<dyn RoomRegistry>,
    ) -> Self {
        Self {
            session,
            send_message,
            relay_signal,
            registry,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// テキストフレームを処理
    pub async fn handle_text(&self, text: &str) -> FrameOutcome {
        let event = match InboundEvent::decode(text) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Session {} sent a malformed event: {}", self.session.id, e);
                return self.reject(e.to_string()).await;
            }
        };

        match event {
            InboundEvent::Chat { message } => {
                match self.send_message.execute(&self.session, message).await {
                    Ok(stored) => FrameOutcome::Sent(stored),
                    Err(e) => self.reject(e.to_string()).await,
                }
            }
            InboundEvent::Typing { is_typing } => FrameOutcome::Relayed {
                delivered: self.relay_signal.typing(&self.session, is_typing).await,
            },
            InboundEvent::Read { message_ids } => FrameOutcome::Relayed {
                delivered: self.relay_signal.read(&self.session, message_ids).await,
            },
        }
    }

    /// バイナリフレームを処理（テキストのみ対応）
    pub async fn handle_binary(&self) -> FrameOutcome {
        self.reject("Binary frames are not supported".to_string())
            .await
    }

    async fn reject(&self, error: String) -> FrameOutcome {
        let payload = OutboundEvent::error(error.clone()).encode();
        if !self
            .registry
            .push_to(&self.session.room, &self.session.id, &payload)
            .await
        {
            tracing::debug!(
                "Could not deliver error event to session {}",
                self.session.id
            );
        }
        FrameOutcome::Rejected(error)
    }
}
