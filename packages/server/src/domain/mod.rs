//! Domain layer for the chat relay.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod connection;
pub mod entity;
pub mod error;
pub mod factory;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use connection::{Connection, FrameSource, PusherChannel};
pub use entity::{ChatMessage, DEFAULT_HISTORY_CAPACITY, DEFAULT_REPLAY_COUNT, Member, Room};
pub use error::{MessagePushError, RepositoryError, RoomError, TransportError, ValueObjectError};
pub use factory::{IdGenerator, RandomIdGenerator};
pub use message_pusher::{BroadcastReport, MessagePusher};
pub use repository::{Departure, RelayStats, RoomRepository};
pub use value_object::{
    MemberId, MessageContent, MessageId, RoomId, RoomName, Timestamp, Username,
};
