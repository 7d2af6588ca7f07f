//! UseCase: メッセージ履歴取得処理

use std::sync::Arc;

use crate::domain::{ChatMessage, RoomId, RoomRepository};

use super::error::GetRoomMessagesError;

/// メッセージ履歴取得のユースケース
pub struct GetRoomMessagesUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// 返す履歴の最大件数
    limit: usize,
}

impl GetRoomMessagesUseCase {
    /// 新しい GetRoomMessagesUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>, limit: usize) -> Self {
        Self { repository, limit }
    }

    /// メッセージ履歴取得を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ChatMessage>)` - 古い順のメッセージ（最大 `limit` 件）
    /// * `Err(GetRoomMessagesError)` - ルームが存在しない
    pub async fn execute(&self, room_id: String) -> Result<Vec<ChatMessage>, GetRoomMessagesError> {
        let room_id = RoomId::new(room_id).map_err(|_| GetRoomMessagesError::RoomNotFound)?;
        self.repository
            .recent_messages(&room_id, self.limit)
            .await
            .map_err(|_| GetRoomMessagesError::RoomNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MessageContent, RoomName, Username},
        infrastructure::repository::InMemoryRoomRepository,
    };

    #[tokio::test]
    async fn test_get_room_messages_returns_latest_within_limit() {
        // テスト項目: 上限件数までの最新メッセージが古い順に返される
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::default());
        let (room, creator) = repository
            .create_room(
                RoomName::new("Standup".to_string()).unwrap(),
                Username::new("alice".to_string()).unwrap(),
            )
            .await
            .unwrap();
        for i in 0..5 {
            repository
                .add_message(
                    &room.id,
                    &creator.id,
                    MessageContent::new(format!("message {i}")).unwrap(),
                )
                .await
                .unwrap();
        }
        let usecase = GetRoomMessagesUseCase::new(repository, 3);

        // when (操作):
        let messages = usecase.execute(room.id.as_str().to_string()).await.unwrap();

        // then (期待する結果):
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["message 2", "message 3", "message 4"]);
    }

    #[tokio::test]
    async fn test_get_room_messages_not_found() {
        // テスト項目: 存在しないルームは RoomNotFound になる
        // given (前提条件):
        let usecase = GetRoomMessagesUseCase::new(Arc::new(InMemoryRoomRepository::default()), 50);

        // when (操作):
        let result = usecase.execute("nonexistent".to_string()).await;

        // then (期待する結果):
        assert_eq!(result, Err(GetRoomMessagesError::RoomNotFound));
    }
}
