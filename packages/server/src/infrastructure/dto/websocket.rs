//! WebSocket event DTOs.
//!
//! Every frame is a JSON text object tagged by `type`. Inbound field names are
//! snake_case, outbound field names are camelCase.

use serde::{Deserialize, Serialize};

/// Event sent by a client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    Message {
        content: String,
    },
    Typing {
        #[serde(default)]
        is_typing: bool,
    },
    Ping,
    /// Any `type` the relay does not know
    #[serde(other)]
    Unknown,
}

impl InboundEvent {
    /// Parse one text frame. A frame that is not a JSON object with a known
    /// shape is malformed; an object with an unknown `type` is `Unknown`.
    pub fn parse(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }
}

/// Member as listed in `room_info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    pub member_id: String,
    pub username: String,
    pub joined_at: i64,
    pub is_creator: bool,
}

/// History entry as replayed in `room_info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageInfo {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub author_username: String,
    pub timestamp: i64,
}

/// Event sent by the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    #[serde(rename_all = "camelCase")]
    RoomInfo {
        room_id: String,
        room_name: String,
        members: Vec<MemberInfo>,
        recent_messages: Vec<MessageInfo>,
    },
    #[serde(rename_all = "camelCase")]
    UserJoined {
        member_id: String,
        username: String,
        timestamp: i64,
        member_count: usize,
    },
    #[serde(rename_all = "camelCase")]
    Message {
        id: String,
        content: String,
        author_id: String,
        author_username: String,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    Typing {
        member_id: String,
        username: String,
        is_typing: bool,
    },
    #[serde(rename_all = "camelCase")]
    UserLeft {
        member_id: String,
        username: String,
        timestamp: i64,
        member_count: usize,
    },
    Pong,
    Error {
        message: String,
    },
}

impl OutboundEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Serialize into a text frame
    pub fn to_frame(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize outbound event: {}", e);
            r#"{"type":"error","message":"Internal error"}"#.to_string()
        })
    }
}
