//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() / broadcast_participant_left() /
//!   delete_room_if_empty() メソッド
//!
//! ### なぜこのテストが必要か
//! - 切断時にメンバーと接続が同時に削除されることを保証
//! - 最後のメンバーが切断したルームが削除されることを確認
//! - 既に強制退出させられたメンバーの切断でもエラーにならないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の切断と残りのメンバーへの通知
//! - エッジケース：最後の参加者の切断（ルーム削除）、強制退出済みのメンバー、削除済みのルーム

use std::sync::Arc;

use crate::domain::{
    BroadcastReport, Departure, MemberId, MessagePusher, RepositoryError, RoomId, RoomRepository,
};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 参加者切断を実行（メンバーと接続を同時に削除）
    ///
    /// # Returns
    ///
    /// 削除されたメンバー（既に削除済みなら `None`）と残りのメンバー数。
    /// ルームが既に存在しない場合も `remaining = 0` として扱う。
    pub async fn execute(&self, room_id: &RoomId, member_id: &MemberId) -> Departure {
        match self.repository.remove_member(room_id, member_id).await {
            Ok(departure) => {
                tracing::info!(
                    "Member '{}' left room '{}' ({} remaining)",
                    member_id.as_str(),
                    room_id.as_str(),
                    departure.remaining
                );
                departure
            }
            Err(RepositoryError::RoomNotFound(_)) => {
                tracing::debug!(
                    "Room '{}' already deleted when member '{}' left",
                    room_id.as_str(),
                    member_id.as_str()
                );
                Departure {
                    member: None,
                    remaining: 0,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to remove member '{}' from room '{}': {}",
                    member_id.as_str(),
                    room_id.as_str(),
                    e
                );
                Departure {
                    member: None,
                    remaining: 0,
                }
            }
        }
    }

    /// 参加者が left したことを残りの接続にブロードキャスト
    pub async fn broadcast_participant_left(
        &self,
        room_id: &RoomId,
        message: &str,
    ) -> BroadcastReport {
        self.message_pusher.broadcast(room_id, message, None).await
    }

    /// メンバーがいなくなったルームを削除
    pub async fn delete_room_if_empty(&self, room_id: &RoomId) -> bool {
        self.repository.delete_if_empty(room_id).await
    }
}
