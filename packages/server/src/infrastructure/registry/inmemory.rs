//! InMemory RoomRegistry 実装
//!
//! ## 責務
//!
//! - ルームごとに接続中セッションの `PusherChannel` を管理
//! - ルーム内へのメッセージ配信（broadcast, push_to）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `PusherChannel` を受け取り、メッセージ送信に使用します。
//!
//! All membership changes and broadcast iteration happen under one mutex.
//! Delivery uses `try_send`, so the lock is never held across an await on a
//! receiver. A session whose buffer is full or closed is removed on the spot;
//! dropping its sender ends its pusher loop, which closes the connection.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::error::TrySendError};

use crate::domain::{PusherChannel, RoomKey, RoomRegistry, RoomSnapshot, SessionId};

type Members = HashMap<SessionId, PusherChannel>;

/// In-process room registry
#[derive(Default)]
pub struct InMemoryRoomRegistry {
    /// Key: room key, Value: joined sessions
    rooms: Mutex<HashMap<RoomKey, Members>>,
}

impl InMemoryRoomRegistry {
    /// 新しい InMemoryRoomRegistry を作成
    pub fn new() -> Self {
        Self::default()
    }
}

/// Remove the given sessions from a room, dropping the room once it is empty
fn reap(rooms: &mut HashMap<RoomKey, Members>, room: &RoomKey, stale: &[SessionId]) {
    if stale.is_empty() {
        return;
    }
    if let Some(members) = rooms.get_mut(room) {
        for session_id in stale {
            members.remove(session_id);
        }
        if members.is_empty() {
            rooms.remove(room);
        }
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn join(&self, room: RoomKey, session_id: SessionId, sender: PusherChannel) {
        let mut rooms = self.rooms.lock().await;
        rooms.entry(room).or_default().insert(session_id, sender);
        tracing::debug!("Session '{}' joined room '{}'", session_id, room);
    }

    async fn leave(&self, room: &RoomKey, session_id: &SessionId) -> bool {
        let mut rooms = self.rooms.lock().await;
        let Some(members) = rooms.get_mut(room) else {
            return false;
        };
        let removed = members.remove(session_id).is_some();
        if members.is_empty() {
            rooms.remove(room);
            tracing::debug!("Room '{}' is empty and was dropped", room);
        }
        if removed {
            tracing::debug!("Session '{}' left room '{}'", session_id, room);
        }
        removed
    }

    async fn broadcast(
        &self,
        room: &RoomKey,
        content: &str,
        exclude: Option<&SessionId>,
    ) -> usize {
        let mut rooms = self.rooms.lock().await;
        let Some(members) = rooms.get(room) else {
            return 0;
        };

        let mut delivered = 0;
        let mut stale = Vec::new();
        for (session_id, sender) in members {
            if exclude == Some(session_id) {
                continue;
            }
            // ブロードキャストでは一部の送信失敗を許容
            match sender.try_send(content.to_string()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        "Outbound buffer of session '{}' is full, dropping it from room '{}'",
                        session_id,
                        room
                    );
                    stale.push(*session_id);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(
                        "Session '{}' is gone, reaping it from room '{}'",
                        session_id,
                        room
                    );
                    stale.push(*session_id);
                }
            }
        }

        reap(&mut rooms, room, &stale);
        delivered
    }

    async fn push_to(&self, room: &RoomKey, session_id: &SessionId, content: &str) -> bool {
        let mut rooms = self.rooms.lock().await;
        let Some(sender) = rooms.get(room).and_then(|members| members.get(session_id)) else {
            return false;
        };

        match sender.try_send(content.to_string()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to push to session '{}': {}", session_id, e);
                reap(&mut rooms, room, &[*session_id]);
                false
            }
        }
    }

    async fn member_count(&self, room: &RoomKey) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.get(room).map_or(0, HashMap::len)
    }

    async fn rooms(&self) -> Vec<RoomSnapshot> {
        let rooms = self.rooms.lock().await;
        let mut snapshot: Vec<RoomSnapshot> = rooms
            .iter()
            .map(|(room, members)| RoomSnapshot {
                room: *room,
                members: members.len(),
            })
            .collect();
        snapshot.sort_by_key(|s| s.room.to_string());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MaterialId, SessionIdFactory, UserId};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - join / leave によるルーム管理（空になったルームの削除、leave の冪等性）
    // - broadcast: 送信者の除外、一部の受信者が失敗しても他へ配信されること
    // - 遅い受信者（バッファ満杯）や切断済みの受信者がルームから除去されること
    // ========================================

    fn material_room() -> RoomKey {
        RoomKey::material(MaterialId::from_uuid(uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_join_creates_room_and_leave_drops_it() {
        // テスト項目: 最初の join でルームが作られ、最後の leave で削除される
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let room = material_room();
        let session = SessionIdFactory::generate();
        let (tx, _rx) = mpsc::channel(8);

        // when (操作):
        registry.join(room, session, tx).await;
        let count_after_join = registry.member_count(&room).await;
        let removed = registry.leave(&room, &session).await;

        // then (期待する結果):
        assert_eq!(count_after_join, 1);
        assert!(removed);
        assert_eq!(registry.member_count(&room).await, 0);
        assert!(registry.rooms().await.is_empty());
    }

    #[tokio::test]
    async fn test_leave_twice_is_noop() {
        // テスト項目: 同じセッションで 2 回 leave しても 2 回目は何もしない
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let room = material_room();
        let session = SessionIdFactory::generate();
        let (tx, _rx) = mpsc::channel(8);
        registry.join(room, session, tx).await;

        // when (操作):
        let first = registry.leave(&room, &session).await;
        let second = registry.leave(&room, &session).await;

        // then (期待する結果):
        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn test_leave_unknown_room_is_noop() {
        // テスト項目: 存在しないルームからの leave はエラーにならない
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();

        // when (操作):
        let removed = registry
            .leave(&material_room(), &SessionIdFactory::generate())
            .await;

        // then (期待する結果):
        assert!(!removed);
    }

    #[tokio::test]
    async fn test_broadcast_excludes_sender() {
        // テスト項目: 除外指定したセッション以外の全員に配信される
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let room = material_room();
        let alice = SessionIdFactory::generate();
        let bob = SessionIdFactory::generate();
        let (tx_alice, mut rx_alice) = mpsc::channel(8);
        let (tx_bob, mut rx_bob) = mpsc::channel(8);
        registry.join(room, alice, tx_alice).await;
        registry.join(room, bob, tx_bob).await;

        // when (操作):
        let delivered = registry.broadcast(&room, "typing", Some(&alice)).await;

        // then (期待する結果):
        assert_eq!(delivered, 1);
        assert_eq!(rx_bob.recv().await, Some("typing".to_string()));
        assert!(rx_alice.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_without_exclude_reaches_everyone() {
        // テスト項目: 除外なしのブロードキャストは送信者を含む全員に届く
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let room = material_room();
        let (tx1, mut rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        registry.join(room, SessionIdFactory::generate(), tx1).await;
        registry.join(room, SessionIdFactory::generate(), tx2).await;

        // when (操作):
        let delivered = registry.broadcast(&room, "hello", None).await;

        // then (期待する結果):
        assert_eq!(delivered, 2);
        assert_eq!(rx1.recv().await, Some("hello".to_string()));
        assert_eq!(rx2.recv().await, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_does_not_cross_rooms() {
        // テスト項目: 別のルームのセッションには配信されない
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let room_a = material_room();
        let room_b = RoomKey::direct(UserId::new(1).unwrap(), UserId::new(2).unwrap());
        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);
        registry.join(room_a, SessionIdFactory::generate(), tx_a).await;
        registry.join(room_b, SessionIdFactory::generate(), tx_b).await;

        // when (操作):
        registry.broadcast(&room_a, "only a", None).await;

        // then (期待する結果):
        assert_eq!(rx_a.recv().await, Some("only a".to_string()));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_reaps_closed_session_and_keeps_delivering() {
        // テスト項目: 切断済みの受信者がいても他の受信者には配信され、切断済みは除去される
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let room = material_room();
        let gone = SessionIdFactory::generate();
        let alive = SessionIdFactory::generate();
        let (tx_gone, rx_gone) = mpsc::channel(8);
        let (tx_alive, mut rx_alive) = mpsc::channel(8);
        registry.join(room, gone, tx_gone).await;
        registry.join(room, alive, tx_alive).await;
        drop(rx_gone);

        // when (操作):
        let delivered = registry.broadcast(&room, "still here", None).await;

        // then (期待する結果):
        assert_eq!(delivered, 1);
        assert_eq!(rx_alive.recv().await, Some("still here".to_string()));
        assert_eq!(registry.member_count(&room).await, 1);
        assert!(!registry.leave(&room, &gone).await);
    }

    #[tokio::test]
    async fn test_broadcast_drops_slow_consumer() {
        // テスト項目: バッファが満杯の遅い受信者はルームから切り離され、チャンネルが閉じる
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let room = material_room();
        let slow = SessionIdFactory::generate();
        let fast = SessionIdFactory::generate();
        let (tx_slow, mut rx_slow) = mpsc::channel(1);
        let (tx_fast, mut rx_fast) = mpsc::channel(8);
        registry.join(room, slow, tx_slow).await;
        registry.join(room, fast, tx_fast).await;

        // when (操作):
        registry.broadcast(&room, "first", None).await;
        let delivered = registry.broadcast(&room, "second", None).await;

        // then (期待する結果):
        assert_eq!(delivered, 1);
        assert_eq!(registry.member_count(&room).await, 1);
        assert_eq!(rx_fast.recv().await, Some("first".to_string()));
        assert_eq!(rx_fast.recv().await, Some("second".to_string()));
        // 遅い受信者はバッファ済みの分だけ受け取り、その後チャンネルが閉じる
        assert_eq!(rx_slow.recv().await, Some("first".to_string()));
        assert_eq!(rx_slow.recv().await, None);
    }

    #[tokio::test]
    async fn test_broadcast_to_empty_room() {
        // テスト項目: 誰もいないルームへのブロードキャストはエラーにならない
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();

        // when (操作):
        let delivered = registry.broadcast(&material_room(), "nobody", None).await;

        // then (期待する結果):
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_push_to_single_session() {
        // テスト項目: 特定のセッションにだけメッセージを送信できる
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let room = material_room();
        let alice = SessionIdFactory::generate();
        let bob = SessionIdFactory::generate();
        let (tx_alice, mut rx_alice) = mpsc::channel(8);
        let (tx_bob, mut rx_bob) = mpsc::channel(8);
        registry.join(room, alice, tx_alice).await;
        registry.join(room, bob, tx_bob).await;

        // when (操作):
        let pushed = registry.push_to(&room, &alice, "error").await;
        let missing = registry
            .push_to(&room, &SessionIdFactory::generate(), "error")
            .await;

        // then (期待する結果):
        assert!(pushed);
        assert!(!missing);
        assert_eq!(rx_alice.recv().await, Some("error".to_string()));
        assert!(rx_bob.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_concurrent_joins_are_not_lost() {
        // テスト項目: 同じルームへの同時 join がすべて登録される
        // given (前提条件):
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let room = material_room();
        let mut receivers = Vec::new();
        let mut handles = Vec::new();

        // when (操作):
        for _ in 0..50 {
            let (tx, rx) = mpsc::channel(8);
            receivers.push(rx);
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.join(room, SessionIdFactory::generate(), tx).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // then (期待する結果):
        assert_eq!(registry.member_count(&room).await, 50);
        assert_eq!(registry.broadcast(&room, "all", None).await, 50);
    }

    #[tokio::test]
    async fn test_rooms_snapshot() {
        // テスト項目: 現在のルーム一覧と人数を取得できる
        // given (前提条件):
        let registry = InMemoryRoomRegistry::new();
        let direct = RoomKey::direct(UserId::new(2).unwrap(), UserId::new(1).unwrap());
        let (tx1, _rx1) = mpsc::channel(8);
        let (tx2, _rx2) = mpsc::channel(8);
        registry.join(direct, SessionIdFactory::generate(), tx1).await;
        registry.join(direct, SessionIdFactory::generate(), tx2).await;

        // when (操作):
        let rooms = registry.rooms().await;

        // then (期待する結果):
        assert_eq!(
            rooms,
            vec![RoomSnapshot {
                room: direct,
                members: 2
            }]
        );
    }
}
