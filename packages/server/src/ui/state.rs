//! Shared application state.

use std::sync::Arc;

use crate::{
    domain::RoomRegistry,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, GetDirectInboxUseCase,
        GetMessageHistoryUseCase, GetRoomsUseCase, PostMessageUseCase, RelaySignalUseCase,
        SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectParticipantUseCase（ハンドシェイクとルーム登録）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（ルームからの登録解除）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// SendMessageUseCase（メッセージの保存と配信）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// RelaySignalUseCase（タイピング・既読の中継）
    pub relay_signal_usecase: Arc<RelaySignalUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetMessageHistoryUseCase（履歴取得）
    pub get_message_history_usecase: Arc<GetMessageHistoryUseCase>,
    /// GetDirectInboxUseCase（ダイレクトメッセージ受信箱の取得）
    pub get_direct_inbox_usecase: Arc<GetDirectInboxUseCase>,
    /// PostMessageUseCase（HTTP からの投稿）
    pub post_message_usecase: Arc<PostMessageUseCase>,
    /// RoomRegistry（セッションごとのエラー通知に使用）
    pub registry: Arc<dyn RoomRegistry>,
    /// Capacity of each session's outbound queue
    pub outbound_buffer: usize,
}
