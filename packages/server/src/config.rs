//! Server configuration.

use std::time::Duration;

use crate::domain::{DEFAULT_HISTORY_CAPACITY, DEFAULT_REPLAY_COUNT};

/// Capacity of each connection's outbound frame queue
pub const DEFAULT_OUTBOUND_BUFFER: usize = 64;

/// Budget for handing one frame to a connection's queue
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 5000;

/// Runtime settings shared by the server and its use cases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Messages kept per room
    pub history_capacity: usize,
    /// Messages replayed in `room_info`
    pub replay_count: usize,
    pub outbound_buffer: usize,
    pub send_timeout: Duration,
    /// Base URL used to build invite links. Derived from host and port when unset.
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            replay_count: DEFAULT_REPLAY_COUNT,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            send_timeout: Duration::from_millis(DEFAULT_SEND_TIMEOUT_MS),
            public_url: None,
        }
    }
}

impl ServerConfig {
    /// Base URL clients use to reach this server, without a trailing slash
    pub fn base_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }

    /// Link that lets another user join `room_id`
    pub fn invite_link(&self, room_id: &str) -> String {
        format!("{}/room/{}", self.base_url(), room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_relay_constants() {
        // テスト項目: デフォルト値が履歴 50 件、再送 10 件になっている
        // given (前提条件) / when (操作):
        let config = ServerConfig::default();

        // then (期待する結果):
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.replay_count, 10);
        assert_eq!(config.send_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invite_link() {
        // テスト項目: 招待リンクが公開 URL またはホストとポートから組み立てられる
        // given (前提条件):
        let local = ServerConfig::default();
        let public = ServerConfig {
            public_url: Some("https://chat.example.com/".to_string()),
            ..ServerConfig::default()
        };

        // when (操作) / then (期待する結果):
        assert_eq!(
            local.invite_link("abc123"),
            "http://127.0.0.1:8080/room/abc123"
        );
        assert_eq!(
            public.invite_link("abc123"),
            "https://chat.example.com/room/abc123"
        );
    }
}
