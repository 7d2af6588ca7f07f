//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::ServerConfig,
    domain::{MessagePusher, RoomRepository},
};

use super::{
    handler::{
        create_room, get_room_detail, get_room_messages, get_rooms, health_check, join_room,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Chat relay server
///
/// This struct wires the room registry and the broadcast engine into the HTTP
/// and WebSocket routes.
///
/// # Example
///
/// ```ignore
/// let repository = Arc::new(InMemoryRoomRepository::new(config.history_capacity));
/// let message_pusher = Arc::new(RoomMessagePusher::new(repository.clone()));
/// let server = Server::new(repository, message_pusher, config);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// Repository（レジストリ、終了時に破棄する）
    repository: Arc<dyn RoomRepository>,
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `repository` - Room registry shared by every connection
    /// * `message_pusher` - Broadcast engine
    /// * `config` - Runtime settings
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        config: ServerConfig,
    ) -> Self {
        let state = Arc::new(AppState::new(repository.clone(), message_pusher, config));
        Self { repository, state }
    }

    /// Build the router with every endpoint
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws/{room_id}/{member_id}", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms).post(create_room))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .route("/api/rooms/{room_id}/join", post(join_room))
            .route("/api/rooms/{room_id}/messages", get(get_room_messages))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the chat relay server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat relay server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws/{{room_id}}/{{member_id}}", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve_with_shutdown(listener, shutdown_signal()).await?;
        Ok(())
    }

    /// Serve on an already bound listener until `signal` resolves, then drain the registry
    pub async fn serve_with_shutdown<F>(
        self,
        listener: tokio::net::TcpListener,
        signal: F,
    ) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await?;

        let dropped = self.repository.drain().await;
        tracing::info!("Server shutdown complete ({} rooms dropped)", dropped);

        Ok(())
    }
}
