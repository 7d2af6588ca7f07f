//! UseCase: ルーム一覧取得処理

use std::sync::Arc;

use crate::domain::{Room, RoomRepository};

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    /// 新しい GetRoomsUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// ルーム一覧取得を実行
    ///
    /// # Returns
    ///
    /// 作成日時順のルーム一覧（Domain Model）
    pub async fn execute(&self) -> Vec<Room> {
        self.repository.get_rooms().await
    }
}
