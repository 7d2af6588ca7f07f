//! ルーム単位でブロードキャストする MessagePusher 実装
//!
//! ## 責務
//!
//! - RoomRepository からブロードキャスト対象の接続ハンドルを取得
//! - 全対象への送信を並行に実行し、結果をまとめて待つ
//! - 送信に失敗した接続（とそのメンバー）をルームから強制退出させ、その接続を閉じる
//!
//! ## 設計ノート
//!
//! 送信中はどのロックも保持しません。対象のスナップショットを取得した後、
//! ロックを解放してから送信します。送信失敗は他の受信者への配信を妨げません。
//! 強制退出は `user_left` を発行しません（退出通知はセッションの終了処理が担当）。
//! 閉じた接続のトランスポートが終了すると、そのセッションは終了処理に入ります。

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;

use crate::domain::{
    BroadcastReport, MemberId, MessagePushError, MessagePusher, PusherChannel, RoomId,
    RoomRepository,
};

/// RoomRepository に登録された接続へ送信する MessagePusher 実装
pub struct RoomMessagePusher {
    repository: Arc<dyn RoomRepository>,
}

impl RoomMessagePusher {
    /// 新しい RoomMessagePusher を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl MessagePusher for RoomMessagePusher {
    async fn push_to(
        &self,
        connection: &PusherChannel,
        frame: &str,
    ) -> Result<(), MessagePushError> {
        connection.send(frame).await
    }

    async fn broadcast(
        &self,
        room_id: &RoomId,
        frame: &str,
        exclude: Option<&MemberId>,
    ) -> BroadcastReport {
        let Some(targets) = self.repository.connection_targets(room_id, exclude).await else {
            tracing::debug!(
                "Room '{}' not found during broadcast, skipping",
                room_id.as_str()
            );
            return BroadcastReport::default();
        };

        let results = join_all(targets.into_iter().map(|(member_id, connection)| async move {
            let result = connection.send(frame).await;
            (member_id, connection, result)
        }))
        .await;

        let mut report = BroadcastReport::default();
        let mut failed = Vec::new();
        for (member_id, connection, result) in results {
            match result {
                Ok(()) => {
                    tracing::debug!(
                        "Broadcasted frame to member '{}' in room '{}'",
                        member_id.as_str(),
                        room_id.as_str()
                    );
                    report.delivered.push(member_id);
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to push frame to member '{}' in room '{}': {}",
                        member_id.as_str(),
                        room_id.as_str(),
                        e
                    );
                    failed.push((member_id, connection));
                }
            }
        }

        if !failed.is_empty() {
            let evicted = self
                .repository
                .evict_connections(room_id, failed.clone())
                .await;
            for member in &evicted {
                tracing::info!(
                    "Member '{}' ({}) evicted from room '{}' after a failed send",
                    member.id.as_str(),
                    member.username.as_str(),
                    room_id.as_str()
                );
                // Only handles that were still registered are closed.
                if let Some((_, connection)) = failed.iter().find(|(id, _)| *id == member.id) {
                    connection.close();
                }
            }
            report.evicted = evicted.into_iter().map(|member| member.id).collect();
        }

        report
    }
}
