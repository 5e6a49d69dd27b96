//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod chat_session;
pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod get_direct_inbox;
pub mod get_message_history;
pub mod get_rooms;
pub mod post_message;
pub mod relay_signal;
pub mod send_message;

pub use chat_session::{ChatSession, FrameOutcome};
pub use connect_participant::{Admission, ConnectParticipantUseCase};
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, GetMessageHistoryError, PostMessageError, SendMessageError};
pub use get_direct_inbox::{DirectInbox, GetDirectInboxUseCase};
pub use get_message_history::{GetMessageHistoryUseCase, MessageHistory};
pub use get_rooms::GetRoomsUseCase;
pub use post_message::PostMessageUseCase;
pub use relay_signal::RelaySignalUseCase;
pub use send_message::SendMessageUseCase;
