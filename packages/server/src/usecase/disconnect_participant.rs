//! UseCase: 参加者切断処理
//!
//! 切断は何度呼んでも安全です（2 回目以降は何もしません）。

use std::sync::Arc;

use crate::domain::{RoomRegistry, Session};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// 参加者切断を実行
    ///
    /// Returns `false` when the session was already gone (left earlier, or
    /// reaped as a slow consumer).
    pub async fn execute(&self, session: &Session) -> bool {
        self.registry.leave(&session.room, &session.id).await
    }
}
