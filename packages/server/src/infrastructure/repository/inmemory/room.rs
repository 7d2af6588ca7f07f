//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! `HashMap` をインメモリのルームレジストリとして使用します。
//!
//! ## ロック設計
//!
//! - レジストリ全体のマップは `RwLock` で保護し、ルームの追加・削除時のみ書き込みロックを取る
//! - 各ルームは個別の `RwLock` で保護し、メンバー・接続・履歴の変更は書き込みロックで直列化する
//! - ロックの取得順序は常に「マップ → ルーム」。ルームのロックを保持したままマップのロックは取らない
//! - 最後のメンバーが抜けたルームは同じクリティカルセクション内で `closed` にする。
//!   以降の参加要求は `RoomNotFound` になるため、削除予定のルームに参加することはない

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chatrelay_shared::time::{Clock, SystemClock};
use tokio::sync::RwLock;

use crate::domain::{
    ChatMessage, DEFAULT_HISTORY_CAPACITY, Departure, IdGenerator, Member, MemberId,
    MessageContent, PusherChannel, RandomIdGenerator, RelayStats, RepositoryError, Room, RoomError,
    RoomId, RoomName, RoomRepository, Timestamp, Username,
};

/// Number of fresh ids tried before giving up on a create or join
pub const MAX_ID_ATTEMPTS: usize = 8;

/// Room state plus the tombstone flag set when the room is being deleted
struct RoomEntry {
    room: Room,
    closed: bool,
}

type SharedRoom = Arc<RwLock<RoomEntry>>;

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    /// room_id → ルーム
    rooms: RwLock<HashMap<RoomId, SharedRoom>>,
    /// 削除予定でないルーム数（ヘルスチェック用）
    active_rooms: AtomicUsize,
    /// 全ルームの接続数（ヘルスチェック用）
    active_connections: AtomicUsize,
    history_capacity: usize,
    id_generator: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new(history_capacity: usize) -> Self {
        Self::with_components(
            history_capacity,
            Arc::new(RandomIdGenerator),
            Arc::new(SystemClock),
        )
    }

    /// ID 生成器と時計を差し替えて作成（テスト用）
    pub fn with_components(
        history_capacity: usize,
        id_generator: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            active_rooms: AtomicUsize::new(0),
            active_connections: AtomicUsize::new(0),
            history_capacity,
            id_generator,
            clock,
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    async fn lookup(&self, room_id: &RoomId) -> Option<SharedRoom> {
        self.rooms.read().await.get(room_id).cloned()
    }

    async fn lookup_or_not_found(&self, room_id: &RoomId) -> Result<SharedRoom, RepositoryError> {
        self.lookup(room_id)
            .await
            .ok_or_else(|| not_found(room_id))
    }

    /// Remove `shared` from the map if it is still the entry registered under `room_id`
    async fn unlink(&self, room_id: &RoomId, shared: &SharedRoom) -> bool {
        let mut rooms = self.rooms.write().await;
        if rooms
            .get(room_id)
            .is_some_and(|current| Arc::ptr_eq(current, shared))
        {
            rooms.remove(room_id);
            tracing::info!("Room '{}' deleted", room_id.as_str());
            true
        } else {
            false
        }
    }

    /// Tombstone the room. Must be called with the room's write lock held.
    fn close_entry(&self, entry: &mut RoomEntry) {
        if !entry.closed {
            entry.closed = true;
            self.active_rooms.fetch_sub(1, Ordering::Relaxed);
        }
    }

    fn release_connections(&self, count: usize) {
        if count > 0 {
            self.active_connections.fetch_sub(count, Ordering::Relaxed);
        }
    }
}

fn not_found(room_id: &RoomId) -> RepositoryError {
    RepositoryError::RoomNotFound(room_id.as_str().to_string())
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(
        &self,
        name: RoomName,
        creator: Username,
    ) -> Result<(Room, Member), RepositoryError> {
        let now = self.now();
        let mut rooms = self.rooms.write().await;

        let room_id = (0..MAX_ID_ATTEMPTS)
            .map(|_| self.id_generator.room_id())
            .find(|candidate| !rooms.contains_key(candidate))
            .ok_or(RepositoryError::IdAllocationExhausted(MAX_ID_ATTEMPTS))?;

        let creator = Member::new(self.id_generator.member_id(), creator, now, true);
        let mut room = Room::with_history_capacity(room_id.clone(), name, now, self.history_capacity);
        room.add_member(creator.clone())?;

        rooms.insert(
            room_id.clone(),
            Arc::new(RwLock::new(RoomEntry {
                room: room.clone(),
                closed: false,
            })),
        );
        self.active_rooms.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            "Room '{}' ({}) created by '{}'",
            room_id.as_str(),
            room.name.as_str(),
            creator.username.as_str()
        );

        Ok((room, creator))
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RepositoryError> {
        let shared = self.lookup_or_not_found(room_id).await?;
        let entry = shared.read().await;
        if entry.closed {
            return Err(not_found(room_id));
        }
        Ok(entry.room.clone())
    }

    async fn get_rooms(&self) -> Vec<Room> {
        let shared_rooms: Vec<SharedRoom> = self.rooms.read().await.values().cloned().collect();

        let mut rooms = Vec::with_capacity(shared_rooms.len());
        for shared in shared_rooms {
            let entry = shared.read().await;
            if !entry.closed {
                rooms.push(entry.room.clone());
            }
        }
        rooms.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        rooms
    }

    async fn join_room(
        &self,
        room_id: &RoomId,
        username: Username,
    ) -> Result<(Room, Member), RepositoryError> {
        let shared = self.lookup_or_not_found(room_id).await?;
        let mut entry = shared.write().await;
        if entry.closed {
            return Err(not_found(room_id));
        }

        let member_id = (0..MAX_ID_ATTEMPTS)
            .map(|_| self.id_generator.member_id())
            .find(|candidate| !entry.room.contains_member(candidate))
            .ok_or(RepositoryError::IdAllocationExhausted(MAX_ID_ATTEMPTS))?;

        let member = Member::new(member_id, username, self.now(), false);
        entry.room.add_member(member.clone())?;
        tracing::debug!(
            "Member '{}' ({}) joined room '{}'",
            member.id.as_str(),
            member.username.as_str(),
            room_id.as_str()
        );

        Ok((entry.room.clone(), member))
    }

    async fn find_member(
        &self,
        room_id: &RoomId,
        member_id: &MemberId,
    ) -> Result<Member, RepositoryError> {
        let shared = self.lookup_or_not_found(room_id).await?;
        let entry = shared.read().await;
        if entry.closed {
            return Err(not_found(room_id));
        }
        entry
            .room
            .member(member_id)
            .cloned()
            .ok_or_else(|| RoomError::MemberNotFound(member_id.as_str().to_string()).into())
    }

    async fn attach_connection(
        &self,
        room_id: &RoomId,
        member_id: &MemberId,
        connection: PusherChannel,
    ) -> Result<usize, RepositoryError> {
        let shared = self.lookup_or_not_found(room_id).await?;
        let mut entry = shared.write().await;
        if entry.closed {
            return Err(not_found(room_id));
        }
        entry.room.attach_connection(member_id, connection)?;
        self.active_connections.fetch_add(1, Ordering::Relaxed);
        Ok(entry.room.member_count())
    }

    async fn remove_member(
        &self,
        room_id: &RoomId,
        member_id: &MemberId,
    ) -> Result<Departure, RepositoryError> {
        let shared = self.lookup_or_not_found(room_id).await?;
        let mut entry = shared.write().await;
        if entry.closed {
            return Err(not_found(room_id));
        }

        let removed = entry.room.remove_member(member_id);
        if let Some((_, true)) = removed {
            self.release_connections(1);
        }

        let remaining = entry.room.member_count();
        if remaining == 0 {
            // No join can land between this removal and the deletion.
            self.close_entry(&mut entry);
        }

        Ok(Departure {
            member: removed.map(|(member, _)| member),
            remaining,
        })
    }

    async fn delete_if_empty(&self, room_id: &RoomId) -> bool {
        let Some(shared) = self.lookup(room_id).await else {
            return false;
        };
        {
            let mut entry = shared.write().await;
            if !entry.room.is_empty() {
                return false;
            }
            self.close_entry(&mut entry);
        }
        self.unlink(room_id, &shared).await;
        true
    }

    async fn add_message(
        &self,
        room_id: &RoomId,
        author_id: &MemberId,
        content: MessageContent,
    ) -> Result<ChatMessage, RepositoryError> {
        let shared = self.lookup_or_not_found(room_id).await?;
        let mut entry = shared.write().await;
        if entry.closed {
            return Err(not_found(room_id));
        }

        let author = entry
            .room
            .member(author_id)
            .cloned()
            .ok_or_else(|| RoomError::MemberNotFound(author_id.as_str().to_string()))?;
        let message = ChatMessage::new(self.id_generator.message_id(), &author, content, self.now());
        if let Some(evicted) = entry.room.add_message(message.clone()) {
            tracing::debug!(
                "Message '{}' evicted from room '{}' history",
                evicted.id.as_str(),
                room_id.as_str()
            );
        }

        Ok(message)
    }

    async fn recent_messages(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let shared = self.lookup_or_not_found(room_id).await?;
        let entry = shared.read().await;
        if entry.closed {
            return Err(not_found(room_id));
        }
        Ok(entry.room.recent_messages(limit))
    }

    async fn list_members(&self, room_id: &RoomId) -> Result<Vec<Member>, RepositoryError> {
        let shared = self.lookup_or_not_found(room_id).await?;
        let entry = shared.read().await;
        if entry.closed {
            return Err(not_found(room_id));
        }
        Ok(entry.room.member_list())
    }

    async fn connection_targets(
        &self,
        room_id: &RoomId,
        exclude: Option<&MemberId>,
    ) -> Option<Vec<(MemberId, PusherChannel)>> {
        let shared = self.lookup(room_id).await?;
        let entry = shared.read().await;
        if entry.closed {
            return None;
        }
        Some(entry.room.connection_targets(exclude))
    }

    async fn evict_connections(
        &self,
        room_id: &RoomId,
        failed: Vec<(MemberId, PusherChannel)>,
    ) -> Vec<Member> {
        let Some(shared) = self.lookup(room_id).await else {
            return Vec::new();
        };

        let (evicted, now_empty) = {
            let mut entry = shared.write().await;
            if entry.closed {
                return Vec::new();
            }
            let evicted: Vec<Member> = failed
                .iter()
                .filter_map(|(member_id, connection)| {
                    entry.room.evict_connection(member_id, connection)
                })
                .collect();
            self.release_connections(evicted.len());

            let now_empty = entry.room.is_empty();
            if now_empty {
                self.close_entry(&mut entry);
            }
            (evicted, now_empty)
        };

        if now_empty {
            self.unlink(room_id, &shared).await;
        }
        evicted
    }

    async fn stats(&self) -> RelayStats {
        RelayStats {
            active_rooms: self.active_rooms.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
        }
    }

    async fn drain(&self) -> usize {
        let mut rooms = self.rooms.write().await;
        let count = rooms.len();
        for shared in rooms.values() {
            let mut entry = shared.write().await;
            self.close_entry(&mut entry);
            let dropped = entry.room.clear();
            self.release_connections(dropped);
        }
        rooms.clear();
        count
    }
}
