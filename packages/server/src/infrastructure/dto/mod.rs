//! Data Transfer Objects (DTOs) for the chat relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: realtime event frames
//! - `http`: HTTP API request and response bodies
//!
//! `conversion` holds the domain → DTO mappings.

pub mod conversion;
pub mod http;
pub mod websocket;
