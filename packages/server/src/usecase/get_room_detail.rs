//! UseCase: ルーム詳細取得処理

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomRepository};

use super::error::GetRoomDetailError;

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    /// 新しい GetRoomDetailUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// ルーム詳細取得を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - ルーム ID（未検証の文字列）
    ///
    /// # Returns
    ///
    /// * `Ok(Room)` - ルームのスナップショット（Domain Model）
    /// * `Err(GetRoomDetailError)` - ルームが存在しない
    pub async fn execute(&self, room_id: String) -> Result<Room, GetRoomDetailError> {
        let room_id = RoomId::new(room_id).map_err(|_| GetRoomDetailError::RoomNotFound)?;
        self.repository
            .get_room(&room_id)
            .await
            .map_err(|_| GetRoomDetailError::RoomNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{RoomName, Username},
        infrastructure::repository::InMemoryRoomRepository,
    };

    #[tokio::test]
    async fn test_get_room_detail_success() {
        // テスト項目: 既存ルームの詳細が取得できる
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::default());
        let (room, creator) = repository
            .create_room(
                RoomName::new("Standup".to_string()).unwrap(),
                Username::new("alice".to_string()).unwrap(),
            )
            .await
            .unwrap();
        let usecase = GetRoomDetailUseCase::new(repository);

        // when (操作):
        let result = usecase.execute(room.id.as_str().to_string()).await;

        // then (期待する結果):
        let detail = result.unwrap();
        assert_eq!(detail.name.as_str(), "Standup");
        assert_eq!(detail.member_list(), vec![creator]);
    }

    #[tokio::test]
    async fn test_get_room_detail_not_found() {
        // テスト項目: 存在しないルームは RoomNotFound になる
        // given (前提条件):
        let usecase = GetRoomDetailUseCase::new(Arc::new(InMemoryRoomRepository::default()));

        // when (操作):
        let result = usecase.execute("nonexistent".to_string()).await;

        // then (期待する結果):
        assert!(matches!(result, Err(GetRoomDetailError::RoomNotFound)));
    }
}
