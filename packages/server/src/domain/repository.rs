//! Room registry trait definition.
//!
//! The domain layer defines the registry interface it needs; the
//! infrastructure layer provides the implementation (dependency inversion).
//! Every operation re-resolves the room by id, so callers never hold a room
//! across a suspension point.

use async_trait::async_trait;

use super::{
    ChatMessage, Member, MemberId, MessageContent, PusherChannel, RepositoryError, Room, RoomId,
    RoomName, Username,
};

/// Outcome of removing a member during teardown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// The removed member, `None` when it had already been evicted
    pub member: Option<Member>,
    /// Members left in the room after the removal
    pub remaining: usize,
}

/// Point-in-time registry counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelayStats {
    pub active_rooms: usize,
    pub active_connections: usize,
}

/// Room registry
///
/// The single process-wide source of truth for rooms. Mutations of one room
/// are serialized; operations on different rooms do not coordinate.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Create a room with `creator` as its sole member (`is_creator = true`)
    async fn create_room(
        &self,
        name: RoomName,
        creator: Username,
    ) -> Result<(Room, Member), RepositoryError>;

    /// Snapshot of one room
    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RepositoryError>;

    /// Snapshots of every live room
    async fn get_rooms(&self) -> Vec<Room>;

    /// Add a non-creator member; usernames are unique case-insensitively
    async fn join_room(
        &self,
        room_id: &RoomId,
        username: Username,
    ) -> Result<(Room, Member), RepositoryError>;

    /// Resolve a member of a room
    async fn find_member(
        &self,
        room_id: &RoomId,
        member_id: &MemberId,
    ) -> Result<Member, RepositoryError>;

    /// Register a live connection for a member. Returns the room's member count.
    async fn attach_connection(
        &self,
        room_id: &RoomId,
        member_id: &MemberId,
        connection: PusherChannel,
    ) -> Result<usize, RepositoryError>;

    /// Remove a member and its connection in one step.
    ///
    /// A room left without members stops accepting joins before this returns.
    async fn remove_member(
        &self,
        room_id: &RoomId,
        member_id: &MemberId,
    ) -> Result<Departure, RepositoryError>;

    /// Delete the room if and only if it has no members. Returns whether it was deleted.
    async fn delete_if_empty(&self, room_id: &RoomId) -> bool;

    /// Append a message authored by `author_id` to the room history
    async fn add_message(
        &self,
        room_id: &RoomId,
        author_id: &MemberId,
        content: MessageContent,
    ) -> Result<ChatMessage, RepositoryError>;

    /// The most recent `limit` messages, oldest first
    async fn recent_messages(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// Members ordered by join time
    async fn list_members(&self, room_id: &RoomId) -> Result<Vec<Member>, RepositoryError>;

    /// Live connections of a room, `None` when the room does not exist
    async fn connection_targets(
        &self,
        room_id: &RoomId,
        exclude: Option<&MemberId>,
    ) -> Option<Vec<(MemberId, PusherChannel)>>;

    /// Forcibly remove members whose connection failed.
    ///
    /// A pair is only removed while its handle is still the one registered.
    /// Returns the removed members.
    async fn evict_connections(
        &self,
        room_id: &RoomId,
        failed: Vec<(MemberId, PusherChannel)>,
    ) -> Vec<Member>;

    /// Room and connection counts
    async fn stats(&self) -> RelayStats;

    /// Drop every room. Returns the number of rooms dropped.
    async fn drain(&self) -> usize;
}
