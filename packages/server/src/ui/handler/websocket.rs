//! WebSocket connection handlers.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::{mpsc, oneshot};

use crate::{
    domain::{FrameSource, TransportError},
    infrastructure::connection::channel_connection,
    ui::{session::ConnectionSession, state::AppState},
};

/// `GET /ws/{room_id}/{member_id}`
///
/// Ids are validated by the session so that an unknown room or member still
/// gets an `error` frame over the upgraded connection.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path((room_id, member_id)): Path<(String, String)>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, room_id, member_id))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, room_id: String, member_id: String) {
    let (sender, receiver) = socket.split();

    let (connection, rx) =
        channel_connection(state.config.outbound_buffer, state.config.send_timeout);
    let (writer_done_tx, writer_done_rx) = oneshot::channel();
    let send_task = pusher_loop(rx, sender, writer_done_tx);

    let session = ConnectionSession::new(state, room_id.clone(), member_id.clone(), connection);
    let phase = session
        .run(WebSocketFrameSource::new(receiver, writer_done_rx))
        .await;
    tracing::debug!(
        "Session for member '{}' in room '{}' ended in {:?}",
        member_id,
        room_id,
        phase
    );

    // The writer flushes queued frames (e.g. a final error) once every handle is dropped.
    if let Err(e) = send_task.await {
        tracing::warn!("Writer task for member '{}' failed: {}", member_id, e);
    }
}

/// Spawns a task that drains the connection's outbound queue into the WebSocket sink.
///
/// The task ends when every connection handle is dropped or the socket write
/// fails, closes the sink and then fires `writer_done`.
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    writer_done: oneshot::Sender<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = sender.send(Message::Text(frame.into())).await {
                tracing::debug!("WebSocket write failed: {}", e);
                break;
            }
        }
        if let Err(e) = sender.close().await {
            tracing::debug!("WebSocket close failed: {}", e);
        }
        let _ = writer_done.send(());
    })
}

/// Inbound side of an upgraded WebSocket.
///
/// Ends when the peer closes, when a read fails, or when the writer task has
/// stopped, so a session whose outbound side died is torn down too.
pub struct WebSocketFrameSource {
    receiver: SplitStream<WebSocket>,
    writer_done: oneshot::Receiver<()>,
    writer_stopped: bool,
}

impl WebSocketFrameSource {
    pub fn new(receiver: SplitStream<WebSocket>, writer_done: oneshot::Receiver<()>) -> Self {
        Self {
            receiver,
            writer_done,
            writer_stopped: false,
        }
    }
}

#[async_trait]
impl FrameSource for WebSocketFrameSource {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        if self.writer_stopped {
            return None;
        }

        loop {
            let message = tokio::select! {
                message = self.receiver.next() => message,
                _ = &mut self.writer_done => {
                    self.writer_stopped = true;
                    return Some(Err(TransportError::Read("outbound writer stopped".to_string())));
                }
            };

            match message? {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Close(_)) => return None,
                Ok(Message::Binary(_)) => {
                    tracing::debug!("Ignoring binary frame");
                }
                // Ping/Pong are answered by the WebSocket layer
                Ok(_) => {}
                Err(e) => return Some(Err(TransportError::Read(e.to_string()))),
            }
        }
    }
}
