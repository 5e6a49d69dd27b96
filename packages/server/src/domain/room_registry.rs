//! Room registry trait 定義
//!
//! 接続中のセッションをルームごとに管理し、ルーム内へのメッセージ配信を行う
//! インターフェースです。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{RoomKey, SessionId};

/// Outbound delivery handle of one session.
///
/// Bounded: a receiver that lets its buffer fill up is treated as gone.
pub type PusherChannel = mpsc::Sender<String>;

/// Live room statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room: RoomKey,
    pub members: usize,
}

/// In-process mapping of room key to the sessions joined under it
#[async_trait]
pub trait RoomRegistry: Send + Sync {
    /// Register a session under `room`, creating the room entry if needed
    async fn join(&self, room: RoomKey, session_id: SessionId, sender: PusherChannel);

    /// Remove a session. Returns `false` if it was not registered.
    ///
    /// Empty rooms are dropped.
    async fn leave(&self, room: &RoomKey, session_id: &SessionId) -> bool;

    /// Deliver `content` to every session in `room` except `exclude`.
    ///
    /// Never blocks on a receiver and never fails: sessions that cannot take
    /// the frame are reaped. Returns the number of sessions reached.
    async fn broadcast(&self, room: &RoomKey, content: &str, exclude: Option<&SessionId>)
    -> usize;

    /// Deliver `content` to one session. Returns `false` if it could not be delivered.
    async fn push_to(&self, room: &RoomKey, session_id: &SessionId, content: &str) -> bool;

    /// Number of sessions currently joined under `room`
    async fn member_count(&self, room: &RoomKey) -> usize;

    /// Snapshot of every live room
    async fn rooms(&self) -> Vec<RoomSnapshot>;
}
