//! UseCase: ルーム一覧取得

use std::sync::Arc;

use crate::domain::{RoomRegistry, RoomSnapshot};

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl GetRoomsUseCase {
    /// 新しい GetRoomsUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// 現在セッションが参加しているルームの一覧を返す
    pub async fn execute(&self) -> Vec<RoomSnapshot> {
        self.registry.rooms().await
    }
}
