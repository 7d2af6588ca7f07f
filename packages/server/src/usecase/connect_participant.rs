//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::resolve() / execute() / build_room_info() メソッド
//! - 接続の登録と user_joined のブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 存在しないルーム・メンバーへの接続が登録前に拒否されることを保証
//! - 同じメンバーの二重接続を防ぐ
//! - 新しく接続したメンバーに最新 10 件の履歴が再送されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加済みメンバーの接続
//! - 異常系：存在しないルーム、存在しないメンバー、二重接続
//! - エッジケース：履歴が再送件数より多い場合

use std::sync::Arc;

use crate::domain::{
    BroadcastReport, ChatMessage, Member, MemberId, MessagePushError, MessagePusher,
    PusherChannel, Room, RoomId, RoomRepository,
};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// 接続直後に再送する履歴の件数
    replay_count: usize,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        replay_count: usize,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            replay_count,
        }
    }

    /// 接続先のルームとメンバーを解決
    ///
    /// # Arguments
    ///
    /// * `room_id` - ルーム ID（未検証の文字列）
    /// * `member_id` - メンバー ID（未検証の文字列）
    ///
    /// # Returns
    ///
    /// * `Ok((RoomId, Member))` - 解決したルーム ID とメンバー（Domain Model）
    /// * `Err(ConnectError)` - ルームまたはメンバーが存在しない
    pub async fn resolve(
        &self,
        room_id: &str,
        member_id: &str,
    ) -> Result<(RoomId, Member), ConnectError> {
        let room_id =
            RoomId::new(room_id.to_string()).map_err(|_| ConnectError::RoomNotFound)?;
        // ルームの存在を先に確認し、エラーの種類を区別する
        self.repository.get_room(&room_id).await?;

        let member_id =
            MemberId::new(member_id.to_string()).map_err(|_| ConnectError::MemberNotFound)?;
        let member = self.repository.find_member(&room_id, &member_id).await?;

        Ok((room_id, member))
    }

    /// 参加者接続を実行（接続ハンドルをルームに登録）
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 登録後のルームのメンバー数
    /// * `Err(ConnectError)` - 登録失敗
    pub async fn execute(
        &self,
        room_id: &RoomId,
        member_id: &MemberId,
        connection: PusherChannel,
    ) -> Result<usize, ConnectError> {
        let member_count = self
            .repository
            .attach_connection(room_id, member_id, connection)
            .await?;
        tracing::info!(
            "Member '{}' connected to room '{}' ({} members)",
            member_id.as_str(),
            room_id.as_str(),
            member_count
        );
        Ok(member_count)
    }

    /// room_info 用のスナップショットを構築
    ///
    /// # Returns
    ///
    /// ルームのスナップショットと、再送する最新の履歴（古い順）
    pub async fn build_room_info(
        &self,
        room_id: &RoomId,
    ) -> Result<(Room, Vec<ChatMessage>), ConnectError> {
        let room = self.repository.get_room(room_id).await?;
        let recent_messages = room.recent_messages(self.replay_count);
        Ok((room, recent_messages))
    }

    /// 参加者が join したことを自分以外の接続にブロードキャスト
    pub async fn broadcast_participant_joined(
        &self,
        room_id: &RoomId,
        member_id: &MemberId,
        message: &str,
    ) -> BroadcastReport {
        self.message_pusher
            .broadcast(room_id, message, Some(member_id))
            .await
    }

    /// 特定の接続だけにフレームを送信（room_info、pong、error）
    pub async fn send_private(
        &self,
        connection: &PusherChannel,
        message: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(connection, message).await
    }
}
