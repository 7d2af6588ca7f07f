//! UseCase: ヘルスチェック用の統計取得処理

use std::sync::Arc;

use crate::domain::{RelayStats, RoomRepository};

/// 統計取得のユースケース
pub struct GetRelayStatsUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRelayStatsUseCase {
    /// 新しい GetRelayStatsUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 現時点のルーム数と接続数を取得
    pub async fn execute(&self) -> RelayStats {
        self.repository.stats().await
    }
}
