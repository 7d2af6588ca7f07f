//! UseCase layer
//!
//! Orchestrates the domain through the `RoomRepository` and `MessagePusher`
//! seams. Frames are built by the UI layer and passed in as JSON strings.

pub mod connect_participant;
pub mod create_room;
pub mod disconnect_participant;
pub mod error;
pub mod get_relay_stats;
pub mod get_room_detail;
pub mod get_room_messages;
pub mod get_rooms;
pub mod join_room;
pub mod notify_typing;
pub mod send_message;

pub use connect_participant::ConnectParticipantUseCase;
pub use create_room::CreateRoomUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{
    ConnectError, CreateRoomError, GetRoomDetailError, GetRoomMessagesError, JoinRoomError,
    NotifyTypingError, SendMessageError,
};
pub use get_relay_stats::GetRelayStatsUseCase;
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_room_messages::GetRoomMessagesUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::JoinRoomUseCase;
pub use notify_typing::NotifyTypingUseCase;
pub use send_message::SendMessageUseCase;
