//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() / broadcast_message() メソッド
//!
//! ### なぜこのテストが必要か
//! - メッセージが履歴に追加され、送信者を含むルーム全員に届くことを保証
//! - 空のメッセージや退出済みメンバーからのメッセージが履歴に残らないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ送信とブロードキャスト（送信者にもエコーされる）
//! - 異常系：空のメッセージ、メンバーでない送信者

use std::sync::Arc;

use crate::domain::{
    BroadcastReport, ChatMessage, MemberId, MessageContent, MessagePusher, RoomId,
    RoomRepository,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// メッセージを履歴に追加
    ///
    /// # Arguments
    ///
    /// * `room_id` - ルーム ID（Domain Model）
    /// * `author_id` - 送信者のメンバー ID（Domain Model）
    /// * `content` - メッセージ本文（未検証の文字列）
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 履歴に追加されたメッセージ（Domain Model）
    /// * `Err(SendMessageError)` - 送信失敗
    pub async fn execute(
        &self,
        room_id: &RoomId,
        author_id: &MemberId,
        content: String,
    ) -> Result<ChatMessage, SendMessageError> {
        let content = MessageContent::new(content)?;
        let message = self
            .repository
            .add_message(room_id, author_id, content)
            .await?;
        Ok(message)
    }

    /// メッセージを送信者を含むルーム全員にブロードキャスト
    pub async fn broadcast_message(&self, room_id: &RoomId, message: &str) -> BroadcastReport {
        self.message_pusher.broadcast(room_id, message, None).await
    }
}
