//! Transport seams: the outbound connection handle stored in a room and the
//! inbound frame source read by a connection session.
//!
//! The domain only needs four transport operations: accept (done by the UI
//! layer before a session starts), send one frame, receive one frame, and close
//! (dropping the handle and the source).

use std::{fmt, sync::Arc};

use async_trait::async_trait;

use super::error::{MessagePushError, TransportError};

/// Writable side of a live connection.
#[async_trait]
pub trait Connection: Send + Sync + fmt::Debug {
    /// Send one text frame. May suspend while the peer's outbound buffer is full.
    async fn send(&self, frame: &str) -> Result<(), MessagePushError>;

    /// Stop accepting frames and let the transport shut down once the queued
    /// frames are flushed. Later sends fail with `MessagePushError::Closed`.
    fn close(&self);
}

/// Shared connection handle as stored in `Room.connections`
pub type PusherChannel = Arc<dyn Connection>;

/// Readable side of a live connection.
#[async_trait]
pub trait FrameSource: Send {
    /// Receive the next text frame.
    ///
    /// Suspends until a frame is available. `None` means the peer closed the
    /// connection cleanly.
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>>;
}
