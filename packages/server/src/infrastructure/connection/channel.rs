//! Connection handle backed by a bounded tokio channel.
//!
//! The transport side (the WebSocket writer task in the UI layer) drains the
//! receiver and writes each frame to the socket. A full buffer makes `send`
//! suspend, bounded by the configured send timeout. Closing the handle drops
//! its sender, so the receiver ends after the queued frames.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{Connection, FrameSource, MessagePushError, PusherChannel, TransportError};

/// `Connection` writing frames into an mpsc channel
#[derive(Debug)]
pub struct ChannelConnection {
    /// `None` once closed
    sender: Mutex<Option<mpsc::Sender<String>>>,
    send_timeout: Duration,
}

impl ChannelConnection {
    pub fn new(sender: mpsc::Sender<String>, send_timeout: Duration) -> Self {
        Self {
            sender: Mutex::new(Some(sender)),
            send_timeout,
        }
    }

    fn sender(&self) -> Option<mpsc::Sender<String>> {
        match self.sender.lock() {
            Ok(sender) => sender.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Connection for ChannelConnection {
    async fn send(&self, frame: &str) -> Result<(), MessagePushError> {
        let Some(sender) = self.sender().filter(|sender| !sender.is_closed()) else {
            return Err(MessagePushError::Closed);
        };
        match tokio::time::timeout(self.send_timeout, sender.send(frame.to_string())).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(MessagePushError::Closed),
            Err(_) => Err(MessagePushError::Timeout(
                self.send_timeout.as_millis() as u64,
            )),
        }
    }

    fn close(&self) {
        let sender = match self.sender.lock() {
            Ok(mut sender) => sender.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        drop(sender);
    }
}

/// Create a connection handle and the receiver its frames arrive on
pub fn channel_connection(
    buffer: usize,
    send_timeout: Duration,
) -> (PusherChannel, mpsc::Receiver<String>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (Arc::new(ChannelConnection::new(tx, send_timeout)), rx)
}

/// Inbound frames delivered through a channel; the channel closing ends the stream.
#[async_trait]
impl FrameSource for mpsc::Receiver<String> {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        self.recv().await.map(Ok)
    }
}
