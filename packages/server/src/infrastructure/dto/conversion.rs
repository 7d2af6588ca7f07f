//! Conversion logic from domain entities to DTOs.

use chatrelay_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatMessage, Member, Room, Timestamp};
use crate::infrastructure::dto::{
    http::{MemberDetailDto, MessageDetailDto, RoomDetailDto, RoomSummaryDto},
    websocket::{MemberInfo, MessageInfo, OutboundEvent},
};

// ========================================
// Domain Entity → WebSocket DTO
// ========================================

impl From<&Member> for MemberInfo {
    fn from(member: &Member) -> Self {
        Self {
            member_id: member.id.as_str().to_string(),
            username: member.username.as_str().to_string(),
            joined_at: member.joined_at.value(),
            is_creator: member.is_creator,
        }
    }
}

impl From<&ChatMessage> for MessageInfo {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.as_str().to_string(),
            content: message.content.as_str().to_string(),
            author_id: message.author_id.as_str().to_string(),
            author_username: message.author_username.as_str().to_string(),
            timestamp: message.timestamp.value(),
        }
    }
}

impl From<&ChatMessage> for OutboundEvent {
    fn from(message: &ChatMessage) -> Self {
        Self::Message {
            id: message.id.as_str().to_string(),
            content: message.content.as_str().to_string(),
            author_id: message.author_id.as_str().to_string(),
            author_username: message.author_username.as_str().to_string(),
            timestamp: message.timestamp.value(),
        }
    }
}

impl OutboundEvent {
    /// Private snapshot sent to a member whose connection just became active
    pub fn room_info(room: &Room, members: &[Member], recent_messages: &[ChatMessage]) -> Self {
        Self::RoomInfo {
            room_id: room.id.as_str().to_string(),
            room_name: room.name.as_str().to_string(),
            members: members.iter().map(MemberInfo::from).collect(),
            recent_messages: recent_messages.iter().map(MessageInfo::from).collect(),
        }
    }

    pub fn user_joined(member: &Member, timestamp: Timestamp, member_count: usize) -> Self {
        Self::UserJoined {
            member_id: member.id.as_str().to_string(),
            username: member.username.as_str().to_string(),
            timestamp: timestamp.value(),
            member_count,
        }
    }

    pub fn user_left(member: &Member, timestamp: Timestamp, member_count: usize) -> Self {
        Self::UserLeft {
            member_id: member.id.as_str().to_string(),
            username: member.username.as_str().to_string(),
            timestamp: timestamp.value(),
            member_count,
        }
    }

    pub fn typing(member: &Member, is_typing: bool) -> Self {
        Self::Typing {
            member_id: member.id.as_str().to_string(),
            username: member.username.as_str().to_string(),
            is_typing,
        }
    }
}

// ========================================
// Domain Entity → HTTP DTO
// ========================================

impl From<&Room> for RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.id.as_str().to_string(),
            room_name: room.name.as_str().to_string(),
            member_count: room.member_count(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<&Room> for RoomDetailDto {
    fn from(room: &Room) -> Self {
        let members: Vec<MemberDetailDto> = room
            .member_list()
            .into_iter()
            .map(|member| MemberDetailDto {
                is_connected: room.is_connected(&member.id),
                member_id: member.id.into_string(),
                username: member.username.into_string(),
                joined_at: timestamp_to_rfc3339(member.joined_at.value()),
                is_creator: member.is_creator,
            })
            .collect();

        Self {
            room_id: room.id.as_str().to_string(),
            room_name: room.name.as_str().to_string(),
            member_count: members.len(),
            members,
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<&ChatMessage> for MessageDetailDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.as_str().to_string(),
            content: message.content.as_str().to_string(),
            author_id: message.author_id.as_str().to_string(),
            author_username: message.author_username.as_str().to_string(),
            timestamp: timestamp_to_rfc3339(message.timestamp.value()),
        }
    }
}
