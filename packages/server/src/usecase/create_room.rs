//! UseCase: ルーム作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 作成者が唯一のメンバー（is_creator = true）として登録されることを保証
//! - 不正な入力（空のルーム名・ユーザー名）がレジストリに届かないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム作成
//! - 異常系：空白のみのルーム名、長すぎるユーザー名

use std::sync::Arc;

use crate::domain::{Member, Room, RoomName, RoomRepository, Username};

use super::error::CreateRoomError;

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// ルーム作成を実行
    ///
    /// # Arguments
    ///
    /// * `room_name` - ルーム名（未検証の文字列）
    /// * `username` - 作成者のユーザー名（未検証の文字列）
    ///
    /// # Returns
    ///
    /// * `Ok((Room, Member))` - 作成されたルームと作成者（Domain Model）
    /// * `Err(CreateRoomError)` - 入力不正、または ID の割り当て失敗
    pub async fn execute(
        &self,
        room_name: String,
        username: String,
    ) -> Result<(Room, Member), CreateRoomError> {
        // 1. String → Domain Model
        let room_name = RoomName::new(room_name)?;
        let username = Username::new(username)?;

        // 2. Repository 経由でルームを作成
        let (room, creator) = self.repository.create_room(room_name, username).await?;

        Ok((room, creator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::ValueObjectError, infrastructure::repository::InMemoryRoomRepository};

    fn create_usecase() -> (CreateRoomUseCase, Arc<InMemoryRoomRepository>) {
        let repository = Arc::new(InMemoryRoomRepository::default());
        (CreateRoomUseCase::new(repository.clone()), repository)
    }

    #[tokio::test]
    async fn test_create_room_success() {
        // テスト項目: ルームが作成され、作成者が唯一のメンバーになる
        // given (前提条件):
        let (usecase, repository) = create_usecase();

        // when (操作):
        let result = usecase
            .execute("Standup".to_string(), " alice ".to_string())
            .await;

        // then (期待する結果):
        let (room, creator) = result.unwrap();
        assert_eq!(room.name.as_str(), "Standup");
        assert_eq!(creator.username.as_str(), "alice");
        assert!(creator.is_creator);

        let members = repository.list_members(&room.id).await.unwrap();
        assert_eq!(members, vec![creator]);
    }

    #[tokio::test]
    async fn test_create_room_with_blank_name() {
        // テスト項目: 空白のみのルーム名ではルームが作成されない
        // given (前提条件):
        let (usecase, repository) = create_usecase();

        // when (操作):
        let result = usecase.execute("   ".to_string(), "alice".to_string()).await;

        // then (期待する結果):
        assert_eq!(
            result.map(|_| ()),
            Err(CreateRoomError::InvalidInput(ValueObjectError::Empty(
                "room name"
            )))
        );
        assert!(repository.get_rooms().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_room_with_too_long_username() {
        // テスト項目: 長すぎるユーザー名ではルームが作成されない
        // given (前提条件):
        let (usecase, _repository) = create_usecase();

        // when (操作):
        let result = usecase.execute("Standup".to_string(), "a".repeat(100)).await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(CreateRoomError::InvalidInput(ValueObjectError::TooLong { .. }))
        ));
    }
}
