//! Domain entities: the `Room` aggregate and what it owns.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use super::{
    connection::PusherChannel,
    error::RoomError,
    value_object::{MemberId, MessageContent, MessageId, RoomId, RoomName, Timestamp, Username},
};

/// Number of messages retained per room
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Number of messages replayed to a member when its connection becomes active
pub const DEFAULT_REPLAY_COUNT: usize = 10;

/// A participant identity within one room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub username: Username,
    pub joined_at: Timestamp,
    /// true only for the member who created the room
    pub is_creator: bool,
}

impl Member {
    pub fn new(id: MemberId, username: Username, joined_at: Timestamp, is_creator: bool) -> Self {
        Self {
            id,
            username,
            joined_at,
            is_creator,
        }
    }
}

/// An immutable chat message kept in a room's history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub author_id: MemberId,
    pub author_username: Username,
    pub content: MessageContent,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(id: MessageId, author: &Member, content: MessageContent, timestamp: Timestamp) -> Self {
        Self {
            id,
            author_id: author.id.clone(),
            author_username: author.username.clone(),
            content,
            timestamp,
        }
    }
}

/// Room aggregate.
///
/// Owns its members, their live connection handles and a bounded message
/// history. `connections` is always a subset of `members`: a connection can
/// only be attached to an existing member and removing a member drops its
/// connection in the same call.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub name: RoomName,
    pub created_at: Timestamp,
    members: HashMap<MemberId, Member>,
    connections: HashMap<MemberId, PusherChannel>,
    history: VecDeque<ChatMessage>,
    history_capacity: usize,
}

impl Room {
    /// Create an empty room with the default history bound
    pub fn new(id: RoomId, name: RoomName, created_at: Timestamp) -> Self {
        Self::with_history_capacity(id, name, created_at, DEFAULT_HISTORY_CAPACITY)
    }

    /// Create an empty room keeping at most `history_capacity` messages
    pub fn with_history_capacity(
        id: RoomId,
        name: RoomName,
        created_at: Timestamp,
        history_capacity: usize,
    ) -> Self {
        Self {
            id,
            name,
            created_at,
            members: HashMap::new(),
            connections: HashMap::new(),
            history: VecDeque::with_capacity(history_capacity),
            history_capacity,
        }
    }

    /// Add a member, enforcing case-insensitive username uniqueness
    pub fn add_member(&mut self, member: Member) -> Result<(), RoomError> {
        if self
            .members
            .values()
            .any(|existing| existing.username.matches(&member.username))
        {
            return Err(RoomError::UsernameTaken(member.username.into_string()));
        }
        self.members.insert(member.id.clone(), member);
        Ok(())
    }

    pub fn contains_member(&self, member_id: &MemberId) -> bool {
        self.members.contains_key(member_id)
    }

    pub fn member(&self, member_id: &MemberId) -> Option<&Member> {
        self.members.get(member_id)
    }

    /// Members ordered by join time (creator first)
    pub fn member_list(&self) -> Vec<Member> {
        let mut members: Vec<Member> = self.members.values().cloned().collect();
        members.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| b.is_creator.cmp(&a.is_creator))
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        members
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Register a live connection for an existing member
    pub fn attach_connection(
        &mut self,
        member_id: &MemberId,
        connection: PusherChannel,
    ) -> Result<(), RoomError> {
        if !self.members.contains_key(member_id) {
            return Err(RoomError::MemberNotFound(member_id.as_str().to_string()));
        }
        if self.connections.contains_key(member_id) {
            return Err(RoomError::AlreadyConnected(member_id.as_str().to_string()));
        }
        self.connections.insert(member_id.clone(), connection);
        Ok(())
    }

    pub fn is_connected(&self, member_id: &MemberId) -> bool {
        self.connections.contains_key(member_id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Snapshot of the live connections, optionally excluding one member
    pub fn connection_targets(
        &self,
        exclude: Option<&MemberId>,
    ) -> Vec<(MemberId, PusherChannel)> {
        self.connections
            .iter()
            .filter(|(member_id, _)| Some(*member_id) != exclude)
            .map(|(member_id, connection)| (member_id.clone(), connection.clone()))
            .collect()
    }

    /// Remove a member together with its connection.
    ///
    /// Returns the removed member and whether it had a live connection.
    pub fn remove_member(&mut self, member_id: &MemberId) -> Option<(Member, bool)> {
        let had_connection = self.connections.remove(member_id).is_some();
        self.members
            .remove(member_id)
            .map(|member| (member, had_connection))
    }

    /// Remove a member only while `connection` is still the handle registered for it.
    pub fn evict_connection(
        &mut self,
        member_id: &MemberId,
        connection: &PusherChannel,
    ) -> Option<Member> {
        let registered = self.connections.get(member_id)?;
        if !Arc::ptr_eq(registered, connection) {
            return None;
        }
        self.connections.remove(member_id);
        self.members.remove(member_id)
    }

    /// Append a message, evicting the oldest one beyond the history bound
    pub fn add_message(&mut self, message: ChatMessage) -> Option<ChatMessage> {
        self.history.push_back(message);
        if self.history.len() > self.history_capacity {
            self.history.pop_front()
        } else {
            None
        }
    }

    /// The most recent `limit` messages, oldest first
    pub fn recent_messages(&self, limit: usize) -> Vec<ChatMessage> {
        let skip = self.history.len().saturating_sub(limit);
        self.history.iter().skip(skip).cloned().collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    /// Drop every member and connection. Returns the number of connections dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.connections.len();
        self.connections.clear();
        self.members.clear();
        dropped
    }
}
