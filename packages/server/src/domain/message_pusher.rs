//! Broadcast engine trait definition.

use async_trait::async_trait;

use super::{MemberId, MessagePushError, PusherChannel, RoomId};

/// Result of one fan-out pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Members the frame was handed to
    pub delivered: Vec<MemberId>,
    /// Members removed from the room because their send failed
    pub evicted: Vec<MemberId>,
}

/// Delivery of frames to live connections
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Send one frame to a single connection
    async fn push_to(&self, connection: &PusherChannel, frame: &str)
    -> Result<(), MessagePushError>;

    /// Send one frame to every live connection of a room except `exclude`.
    ///
    /// Per-recipient failures never abort the pass; failed members are evicted
    /// afterwards. A missing room is a no-op.
    async fn broadcast(
        &self,
        room_id: &RoomId,
        frame: &str,
        exclude: Option<&MemberId>,
    ) -> BroadcastReport;
}
