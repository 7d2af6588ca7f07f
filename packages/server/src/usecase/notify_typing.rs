//! UseCase: 入力中通知処理
//!
//! 入力中の状態は保存せず、送信者以外の接続にそのまま中継します。

use std::sync::Arc;

use crate::domain::{BroadcastReport, MemberId, MessagePusher, RoomId, RoomRepository};

use super::error::NotifyTypingError;

/// 入力中通知のユースケース
pub struct NotifyTypingUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl NotifyTypingUseCase {
    /// 新しい NotifyTypingUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 入力中通知を実行
    ///
    /// 送信者がまだルームのメンバーである場合のみ、送信者以外にブロードキャストする。
    pub async fn execute(
        &self,
        room_id: &RoomId,
        member_id: &MemberId,
        message: &str,
    ) -> Result<BroadcastReport, NotifyTypingError> {
        self.repository.find_member(room_id, member_id).await?;
        Ok(self
            .message_pusher
            .broadcast(room_id, message, Some(member_id))
            .await)
    }
}
