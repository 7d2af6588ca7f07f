//! Server state shared by every handler and connection session.

use std::sync::Arc;

use crate::{
    config::ServerConfig,
    domain::{MessagePusher, RoomRepository},
    usecase::{
        ConnectParticipantUseCase, CreateRoomUseCase, DisconnectParticipantUseCase,
        GetRelayStatsUseCase, GetRoomDetailUseCase, GetRoomMessagesUseCase, GetRoomsUseCase,
        JoinRoomUseCase, NotifyTypingUseCase, SendMessageUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// CreateRoomUseCase（ルーム作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// GetRoomMessagesUseCase（メッセージ履歴取得のユースケース）
    pub get_room_messages_usecase: Arc<GetRoomMessagesUseCase>,
    /// GetRelayStatsUseCase（統計取得のユースケース）
    pub get_relay_stats_usecase: Arc<GetRelayStatsUseCase>,
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// NotifyTypingUseCase（入力中通知のユースケース）
    pub notify_typing_usecase: Arc<NotifyTypingUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub config: ServerConfig,
}

impl AppState {
    /// Wire every use case to the same repository and message pusher
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        config: ServerConfig,
    ) -> Self {
        Self {
            create_room_usecase: Arc::new(CreateRoomUseCase::new(repository.clone())),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(repository.clone())),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(repository.clone())),
            get_room_messages_usecase: Arc::new(GetRoomMessagesUseCase::new(
                repository.clone(),
                config.history_capacity,
            )),
            get_relay_stats_usecase: Arc::new(GetRelayStatsUseCase::new(repository.clone())),
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                config.replay_count,
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            notify_typing_usecase: Arc::new(NotifyTypingUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                repository,
                message_pusher,
            )),
            config,
        }
    }
}
