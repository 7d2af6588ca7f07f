//! Multi-room chat relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatrelay-server
//! cargo run --bin chatrelay-server -- --host 0.0.0.0 --port 3000 --public-url https://chat.example.com
//! ```

use std::{sync::Arc, time::Duration};

use chatrelay_server::{
    config::{DEFAULT_OUTBOUND_BUFFER, DEFAULT_SEND_TIMEOUT_MS, ServerConfig},
    domain::{DEFAULT_HISTORY_CAPACITY, DEFAULT_REPLAY_COUNT},
    infrastructure::{message_pusher::RoomMessagePusher, repository::InMemoryRoomRepository},
    ui::Server,
};
use chatrelay_shared::logger::setup_logger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chatrelay-server")]
#[command(about = "Multi-room WebSocket chat relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Messages kept per room
    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history_capacity: usize,

    /// Messages replayed to a member when it connects
    #[arg(long, default_value_t = DEFAULT_REPLAY_COUNT)]
    replay_count: usize,

    /// Outbound frames buffered per connection
    #[arg(long, default_value_t = DEFAULT_OUTBOUND_BUFFER)]
    outbound_buffer: usize,

    /// Milliseconds a send may wait on a full outbound buffer before the member is evicted
    #[arg(long, default_value_t = DEFAULT_SEND_TIMEOUT_MS)]
    send_timeout_ms: u64,

    /// Base URL used in invite links (defaults to http://<host>:<port>)
    #[arg(long)]
    public_url: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig {
        host: args.host.clone(),
        port: args.port,
        history_capacity: args.history_capacity,
        replay_count: args.replay_count,
        outbound_buffer: args.outbound_buffer,
        send_timeout: Duration::from_millis(args.send_timeout_ms),
        public_url: args.public_url,
    };

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. Server (UseCases are wired inside)

    // 1. Create Repository (in-memory room registry)
    let repository = Arc::new(InMemoryRoomRepository::new(config.history_capacity));

    // 2. Create MessagePusher (broadcast engine over the registry)
    let message_pusher = Arc::new(RoomMessagePusher::new(repository.clone()));

    // 3. Create and run the server
    let server = Server::new(repository, message_pusher, config);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
