//! Infrastructure layer: concrete implementations of the domain seams.
//!
//! - `connection`: bounded channel backed `Connection` handles
//! - `dto`: wire formats for the WebSocket and HTTP surfaces
//! - `message_pusher`: `MessagePusher` implementations
//! - `repository`: `RoomRepository` implementations

pub mod connection;
pub mod dto;
pub mod message_pusher;
pub mod repository;
