//! Connection handle implementations.

pub mod channel;

pub use channel::{ChannelConnection, channel_connection};
