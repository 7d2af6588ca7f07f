//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - ユーザー名がルーム内で大文字小文字を区別せず一意であることを保証
//! - 存在しないルームへの参加が拒否されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：既存ルームへの参加
//! - 異常系：大文字小文字のみ異なるユーザー名、存在しないルーム、不正な形式の ID

use std::sync::Arc;

use crate::domain::{Member, Room, RoomId, RoomRepository, Username};

use super::error::JoinRoomError;

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// ルーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 参加するルームの ID（未検証の文字列）
    /// * `username` - 参加者のユーザー名（未検証の文字列）
    ///
    /// # Returns
    ///
    /// * `Ok((Room, Member))` - 参加後のルームと新しいメンバー（Domain Model）
    /// * `Err(JoinRoomError)` - 参加失敗
    pub async fn execute(
        &self,
        room_id: String,
        username: String,
    ) -> Result<(Room, Member), JoinRoomError> {
        // 形式が不正な ID のルームは存在しない
        let room_id = RoomId::new(room_id).map_err(|_| JoinRoomError::RoomNotFound)?;
        let username = Username::new(username)?;

        let (room, member) = self.repository.join_room(&room_id, username).await?;

        Ok((room, member))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{RoomName, ValueObjectError},
        infrastructure::repository::InMemoryRoomRepository,
    };

    async fn create_room(repository: &InMemoryRoomRepository) -> Room {
        let (room, _) = repository
            .create_room(
                RoomName::new("Standup".to_string()).unwrap(),
                Username::new("alice".to_string()).unwrap(),
            )
            .await
            .unwrap();
        room
    }

    #[tokio::test]
    async fn test_join_room_success() {
        // テスト項目: 既存ルームに参加でき、作成者ではないメンバーとして登録される
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::default());
        let room = create_room(&repository).await;
        let usecase = JoinRoomUseCase::new(repository.clone());

        // when (操作):
        let result = usecase
            .execute(room.id.as_str().to_string(), "bob".to_string())
            .await;

        // then (期待する結果):
        let (joined_room, member) = result.unwrap();
        assert_eq!(joined_room.id, room.id);
        assert_eq!(joined_room.member_count(), 2);
        assert_eq!(member.username.as_str(), "bob");
        assert!(!member.is_creator);
    }

    #[tokio::test]
    async fn test_join_room_username_taken_case_insensitive() {
        // テスト項目: 大文字小文字のみ異なるユーザー名は UsernameTaken になる
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::default());
        let room = create_room(&repository).await;
        let usecase = JoinRoomUseCase::new(repository.clone());

        // when (操作):
        let result = usecase
            .execute(room.id.as_str().to_string(), "ALICE".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(
            result.map(|_| ()),
            Err(JoinRoomError::UsernameTaken("ALICE".to_string()))
        );
    }

    #[tokio::test]
    async fn test_join_room_not_found() {
        // テスト項目: 存在しないルーム、不正な形式のルーム ID はどちらも RoomNotFound になる
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::default());
        let usecase = JoinRoomUseCase::new(repository);

        // when (操作):
        let missing = usecase
            .execute("abcdef123456".to_string(), "bob".to_string())
            .await;
        let malformed = usecase
            .execute("../etc".to_string(), "bob".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(missing.map(|_| ()), Err(JoinRoomError::RoomNotFound));
        assert_eq!(malformed.map(|_| ()), Err(JoinRoomError::RoomNotFound));
    }

    #[tokio::test]
    async fn test_join_room_blank_username() {
        // テスト項目: 空のユーザー名は InvalidInput になる
        // given (前提条件):
        let repository = Arc::new(InMemoryRoomRepository::default());
        let room = create_room(&repository).await;
        let usecase = JoinRoomUseCase::new(repository);

        // when (操作):
        let result = usecase
            .execute(room.id.as_str().to_string(), "".to_string())
            .await;

        // then (期待する結果):
        assert_eq!(
            result.map(|_| ()),
            Err(JoinRoomError::InvalidInput(ValueObjectError::Empty(
                "username"
            )))
        );
    }
}
