//! Per-connection protocol state machine.
//!
//! ```text
//! Connecting ──(room + member resolved, handle registered)──> Active
//!     │                                                         │
//!     └──(unknown room / member, duplicate)──> Closed    (transport ends)
//!                                                 ▲             │
//!                                                 └── Closing <─┘
//! ```
//!
//! A session holds ids only and re-resolves the room through the use cases at
//! every step. Everything except a transport failure is handled inside
//! `Active`; a transport failure always drives the session through `Closing`,
//! which removes the member and its handle, announces `user_left` and deletes
//! the room once it is empty.

use std::sync::Arc;

use chatrelay_shared::time::get_timestamp_millis;

use crate::{
    domain::{FrameSource, Member, PusherChannel, RoomId, Timestamp},
    infrastructure::dto::websocket::{InboundEvent, OutboundEvent},
    ui::state::AppState,
    usecase::{ConnectError, NotifyTypingError, SendMessageError},
};

/// Lifecycle of a connection session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    Closing,
    Closed,
}

/// Whether the read loop keeps going after one inbound frame
enum Flow {
    Continue,
    Stop,
}

/// One live connection bound to a room member
pub struct ConnectionSession {
    state: Arc<AppState>,
    room_id: String,
    member_id: String,
    connection: PusherChannel,
    phase: SessionState,
}

impl ConnectionSession {
    pub fn new(
        state: Arc<AppState>,
        room_id: String,
        member_id: String,
        connection: PusherChannel,
    ) -> Self {
        Self {
            state,
            room_id,
            member_id,
            connection,
            phase: SessionState::Connecting,
        }
    }

    pub fn phase(&self) -> SessionState {
        self.phase
    }

    /// Drive the session until it is `Closed`.
    ///
    /// `source` yields the inbound frames; its end (or a read failure) starts
    /// the teardown.
    pub async fn run<S: FrameSource>(mut self, mut source: S) -> SessionState {
        let Some((room_id, member)) = self.connect().await else {
            self.phase = SessionState::Closed;
            return self.phase;
        };

        self.phase = SessionState::Active;
        if self.activate(&room_id, &member).await {
            self.read_loop(&room_id, &member, &mut source).await;
        }

        self.phase = SessionState::Closing;
        self.teardown(&room_id, &member).await;

        self.phase = SessionState::Closed;
        self.phase
    }

    /// `Connecting`: resolve the room and member, then register the handle.
    ///
    /// On failure one `error` frame is sent and nothing is registered.
    async fn connect(&self) -> Option<(RoomId, Member)> {
        let usecase = &self.state.connect_participant_usecase;

        let registered = async {
            let (room_id, member) = usecase.resolve(&self.room_id, &self.member_id).await?;
            let member_count = usecase
                .execute(&room_id, &member.id, self.connection.clone())
                .await?;
            Ok::<_, ConnectError>((room_id, member, member_count))
        }
        .await;

        match registered {
            Ok((room_id, member, member_count)) => {
                let joined = OutboundEvent::user_joined(&member, now(), member_count);
                let report = usecase
                    .broadcast_participant_joined(&room_id, &member.id, &joined.to_frame())
                    .await;
                tracing::info!(
                    "Broadcasted user_joined for '{}' to {} connections",
                    member.username.as_str(),
                    report.delivered.len()
                );
                Some((room_id, member))
            }
            Err(e) => {
                tracing::warn!(
                    "Rejected connection to room '{}' as member '{}': {}",
                    self.room_id,
                    self.member_id,
                    e
                );
                self.send_error(&e.to_string()).await;
                None
            }
        }
    }

    /// Send the private `room_info` snapshot. Returns false when the transport is gone.
    async fn activate(&self, room_id: &RoomId, member: &Member) -> bool {
        let usecase = &self.state.connect_participant_usecase;
        let (room, recent_messages) = match usecase.build_room_info(room_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    "Room '{}' vanished before room_info for '{}': {}",
                    room_id.as_str(),
                    member.id.as_str(),
                    e
                );
                return false;
            }
        };

        let room_info = OutboundEvent::room_info(&room, &room.member_list(), &recent_messages);
        match usecase
            .send_private(&self.connection, &room_info.to_frame())
            .await
        {
            Ok(()) => {
                tracing::debug!(
                    "Sent room_info with {} messages to '{}'",
                    recent_messages.len(),
                    member.id.as_str()
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to send room_info to '{}': {}",
                    member.id.as_str(),
                    e
                );
                false
            }
        }
    }

    /// `Active`: handle one inbound frame at a time until the transport ends
    async fn read_loop<S: FrameSource>(&self, room_id: &RoomId, member: &Member, source: &mut S) {
        while let Some(frame) = source.next_frame().await {
            let text = match frame {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Read failed for '{}': {}", member.id.as_str(), e);
                    break;
                }
            };

            if let Flow::Stop = self.handle_frame(room_id, member, &text).await {
                break;
            }
        }
    }

    async fn handle_frame(&self, room_id: &RoomId, member: &Member, text: &str) -> Flow {
        let event = match InboundEvent::parse(text) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(
                    "Malformed event from '{}': {} ({})",
                    member.id.as_str(),
                    e,
                    text
                );
                return Flow::Continue;
            }
        };

        match event {
            InboundEvent::Message { content } => self.relay_message(room_id, member, content).await,
            InboundEvent::Typing { is_typing } => {
                let typing = OutboundEvent::typing(member, is_typing);
                match self
                    .state
                    .notify_typing_usecase
                    .execute(room_id, &member.id, &typing.to_frame())
                    .await
                {
                    Ok(_) => Flow::Continue,
                    Err(NotifyTypingError::RoomNotFound | NotifyTypingError::MemberNotFound) => {
                        tracing::info!(
                            "Member '{}' is no longer in room '{}'",
                            member.id.as_str(),
                            room_id.as_str()
                        );
                        Flow::Stop
                    }
                }
            }
            InboundEvent::Ping => {
                match self
                    .state
                    .connect_participant_usecase
                    .send_private(&self.connection, &OutboundEvent::Pong.to_frame())
                    .await
                {
                    Ok(()) => Flow::Continue,
                    Err(e) => {
                        tracing::warn!("Failed to send pong to '{}': {}", member.id.as_str(), e);
                        Flow::Stop
                    }
                }
            }
            InboundEvent::Unknown => {
                tracing::debug!(
                    "Ignoring event of unknown type from '{}': {}",
                    member.id.as_str(),
                    text
                );
                Flow::Continue
            }
        }
    }

    async fn relay_message(&self, room_id: &RoomId, member: &Member, content: String) -> Flow {
        let usecase = &self.state.send_message_usecase;
        match usecase.execute(room_id, &member.id, content).await {
            Ok(message) => {
                let report = usecase
                    .broadcast_message(room_id, &OutboundEvent::from(&message).to_frame())
                    .await;
                tracing::debug!(
                    "Relayed message '{}' from '{}' to {} connections",
                    message.id.as_str(),
                    member.id.as_str(),
                    report.delivered.len()
                );
                Flow::Continue
            }
            Err(SendMessageError::InvalidContent(e)) => {
                tracing::warn!("Rejected message from '{}': {}", member.id.as_str(), e);
                self.send_error(&SendMessageError::InvalidContent(e).to_string())
                    .await;
                Flow::Continue
            }
            Err(SendMessageError::RoomNotFound | SendMessageError::MemberNotFound) => {
                tracing::info!(
                    "Member '{}' is no longer in room '{}'",
                    member.id.as_str(),
                    room_id.as_str()
                );
                Flow::Stop
            }
        }
    }

    /// `Closing`: remove the member with its handle, announce it and delete an empty room
    async fn teardown(&self, room_id: &RoomId, member: &Member) {
        let usecase = &self.state.disconnect_participant_usecase;

        let departure = usecase.execute(room_id, &member.id).await;
        if departure.member.is_none() {
            tracing::debug!(
                "Member '{}' was already evicted from room '{}'",
                member.id.as_str(),
                room_id.as_str()
            );
        }

        let left = OutboundEvent::user_left(member, now(), departure.remaining);
        let report = usecase
            .broadcast_participant_left(room_id, &left.to_frame())
            .await;
        tracing::info!(
            "Broadcasted user_left for '{}' to {} connections",
            member.username.as_str(),
            report.delivered.len()
        );

        if usecase.delete_room_if_empty(room_id).await {
            tracing::info!("Room '{}' closed after its last member left", room_id.as_str());
        }
    }

    async fn send_error(&self, message: &str) {
        let frame = OutboundEvent::error(message).to_frame();
        if let Err(e) = self
            .state
            .connect_participant_usecase
            .send_private(&self.connection, &frame)
            .await
        {
            tracing::debug!("Failed to send error frame: {}", e);
        }
    }
}

fn now() -> Timestamp {
    Timestamp::new(get_timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ServerConfig,
        domain::{RoomName, RoomRepository, Username},
        infrastructure::{
            connection::channel_connection, message_pusher::RoomMessagePusher,
            repository::InMemoryRoomRepository,
        },
    };
    use std::time::Duration;
    use tokio::{
        sync::mpsc,
        task::JoinHandle,
        time::timeout,
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - Connecting → Active → Closing → Closed の状態遷移
    // - 各受信イベント（message / typing / ping / 不明 / 不正）の扱い
    // - 切断時の user_left 通知とルーム削除
    //
    // 【なぜこのテストが必要か】
    // - セッションはトランスポートとレジストリの間のプロトコルそのもの
    // - エコーの有無（message は送信者にも届く、typing は届かない）を保証する
    // ========================================

    struct Client {
        inbound: mpsc::Sender<String>,
        outbound: mpsc::Receiver<String>,
        handle: JoinHandle<SessionState>,
    }

    impl Client {
        async fn send(&self, frame: &str) {
            self.inbound.send(frame.to_string()).await.unwrap();
        }

        async fn recv(&mut self) -> OutboundEvent {
            let frame = timeout(Duration::from_secs(1), self.outbound.recv())
                .await
                .expect("timed out waiting for a frame")
                .expect("outbound channel closed");
            serde_json::from_str(&frame).unwrap()
        }

        async fn assert_silent(&mut self) {
            let result = timeout(Duration::from_millis(50), self.outbound.recv()).await;
            assert!(result.is_err(), "unexpected frame: {:?}", result);
        }

        async fn close(self) -> SessionState {
            drop(self.inbound);
            self.handle.await.unwrap()
        }
    }

    fn create_state() -> (Arc<AppState>, Arc<InMemoryRoomRepository>) {
        let repository = Arc::new(InMemoryRoomRepository::default());
        let pusher = Arc::new(RoomMessagePusher::new(repository.clone()));
        let state = Arc::new(AppState::new(
            repository.clone(),
            pusher,
            ServerConfig::default(),
        ));
        (state, repository)
    }

    fn connect(state: &Arc<AppState>, room_id: &str, member_id: &str) -> Client {
        connect_with_buffer(state, room_id, member_id, 64, Duration::from_secs(1))
    }

    fn connect_with_buffer(
        state: &Arc<AppState>,
        room_id: &str,
        member_id: &str,
        buffer: usize,
        send_timeout: Duration,
    ) -> Client {
        let (connection, outbound) = channel_connection(buffer, send_timeout);
        let (inbound, source) = mpsc::channel(16);
        let session = ConnectionSession::new(
            state.clone(),
            room_id.to_string(),
            member_id.to_string(),
            connection,
        );
        let handle = tokio::spawn(session.run(source));
        Client {
            inbound,
            outbound,
            handle,
        }
    }

    #[tokio::test]
    async fn test_unknown_room_sends_single_error() {
        // テスト項目: 存在しないルームへの接続は error を 1 件送って Closed になる
        // given (前提条件):
        let (state, repository) = create_state();

        // when (操作):
        let mut client = connect(&state, "nonexistent", "alice01");

        // then (期待する結果):
        assert_eq!(client.recv().await, OutboundEvent::error("Room not found"));
        assert_eq!(client.handle.await.unwrap(), SessionState::Closed);
        assert_eq!(repository.stats().await.active_connections, 0);
    }

    #[tokio::test]
    async fn test_unknown_member_sends_single_error() {
        // テスト項目: ルームに存在しないメンバーの接続は error を送って Closed になる
        // given (前提条件):
        let (state, repository) = create_state();
        let (room, _) = repository
            .create_room(
                RoomName::new("Standup".to_string()).unwrap(),
                Username::new("alice".to_string()).unwrap(),
            )
            .await
            .unwrap();

        // when (操作):
        let mut client = connect(&state, room.id.as_str(), "ghost");

        // then (期待する結果):
        assert_eq!(
            client.recv().await,
            OutboundEvent::error("User not found in room")
        );
        assert_eq!(client.handle.await.unwrap(), SessionState::Closed);
        // 接続失敗ではメンバーは削除されない
        assert_eq!(repository.list_members(&room.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_standup_scenario() {
        // テスト項目: alice が作成、bob が参加、alice が発言、bob が退出、alice が退出するとルームが消える
        // given (前提条件):
        let (state, repository) = create_state();
        let (room, alice) = state
            .create_room_usecase
            .execute("Standup".to_string(), "alice".to_string())
            .await
            .unwrap();
        let (_, bob) = state
            .join_room_usecase
            .execute(room.id.as_str().to_string(), "bob".to_string())
            .await
            .unwrap();

        // when (操作): alice が接続
        let mut alice_client = connect(&state, room.id.as_str(), alice.id.as_str());

        // then (期待する結果): alice には room_info が届く
        let OutboundEvent::RoomInfo { members, .. } = alice_client.recv().await else {
            panic!("expected room_info");
        };
        assert_eq!(members.len(), 2);

        // when (操作): bob が接続
        let mut bob_client = connect(&state, room.id.as_str(), bob.id.as_str());

        // then (期待する結果): alice には user_joined、bob には room_info
        assert!(matches!(
            alice_client.recv().await,
            OutboundEvent::UserJoined { member_count: 2, ref username, .. } if username == "bob"
        ));
        assert!(matches!(bob_client.recv().await, OutboundEvent::RoomInfo { .. }));

        // when (操作): alice が "hi" と発言
        alice_client
            .send(r#"{"type":"message","content":"hi"}"#)
            .await;

        // then (期待する結果): alice 自身と bob の両方に届く
        for client in [&mut alice_client, &mut bob_client] {
            let OutboundEvent::Message {
                content,
                author_username,
                ..
            } = client.recv().await
            else {
                panic!("expected message");
            };
            assert_eq!(content, "hi");
            assert_eq!(author_username, "alice");
        }

        // when (操作): bob が切断
        assert_eq!(bob_client.close().await, SessionState::Closed);

        // then (期待する結果): alice に user_left（残り 1 人）が届く
        assert!(matches!(
            alice_client.recv().await,
            OutboundEvent::UserLeft { member_count: 1, ref username, .. } if username == "bob"
        ));

        // when (操作): alice も切断
        assert_eq!(alice_client.close().await, SessionState::Closed);

        // then (期待する結果): ルームは削除されている
        assert!(repository.get_room(&room.id).await.is_err());
        assert_eq!(repository.stats().await.active_rooms, 0);
        assert_eq!(repository.stats().await.active_connections, 0);
    }

    #[tokio::test]
    async fn test_typing_ping_and_bad_frames() {
        // テスト項目: typing は送信者以外に届き、ping は送信者にだけ pong が返り、
        //             不正なフレームや不明なイベントでは接続が維持される
        // given (前提条件):
        let (state, repository) = create_state();
        let (room, alice) = state
            .create_room_usecase
            .execute("Standup".to_string(), "alice".to_string())
            .await
            .unwrap();
        let (_, bob) = state
            .join_room_usecase
            .execute(room.id.as_str().to_string(), "bob".to_string())
            .await
            .unwrap();
        let mut alice_client = connect(&state, room.id.as_str(), alice.id.as_str());
        alice_client.recv().await; // room_info
        let mut bob_client = connect(&state, room.id.as_str(), bob.id.as_str());
        alice_client.recv().await; // user_joined
        bob_client.recv().await; // room_info

        // when (操作): alice が typing を送信
        alice_client.send(r#"{"type":"typing","is_typing":true}"#).await;

        // then (期待する結果): bob にだけ届く
        assert_eq!(
            bob_client.recv().await,
            OutboundEvent::Typing {
                member_id: alice.id.as_str().to_string(),
                username: "alice".to_string(),
                is_typing: true,
            }
        );
        alice_client.assert_silent().await;

        // when (操作): 不正なフレーム、不明なイベント、ping の順に送信
        alice_client.send("not json").await;
        alice_client.send(r#"{"type":"reaction"}"#).await;
        alice_client.send(r#"{"type":"ping"}"#).await;

        // then (期待する結果): alice にだけ pong が 1 件届き、履歴は増えない
        assert_eq!(alice_client.recv().await, OutboundEvent::Pong);
        alice_client.assert_silent().await;
        bob_client.assert_silent().await;
        assert!(repository.recent_messages(&room.id, 50).await.unwrap().is_empty());

        alice_client.close().await;
        bob_client.close().await;
    }

    #[tokio::test]
    async fn test_duplicate_connection_is_rejected() {
        // テスト項目: 同じメンバーの 2 本目の接続は error を受け取り、1 本目は維持される
        // given (前提条件):
        let (state, repository) = create_state();
        let (room, alice) = state
            .create_room_usecase
            .execute("Standup".to_string(), "alice".to_string())
            .await
            .unwrap();
        let mut first = connect(&state, room.id.as_str(), alice.id.as_str());
        first.recv().await; // room_info

        // when (操作):
        let mut second = connect(&state, room.id.as_str(), alice.id.as_str());

        // then (期待する結果):
        assert_eq!(
            second.recv().await,
            OutboundEvent::error("User is already connected to this room")
        );
        assert_eq!(second.handle.await.unwrap(), SessionState::Closed);
        assert_eq!(repository.stats().await.active_connections, 1);

        first.send(r#"{"type":"ping"}"#).await;
        assert_eq!(first.recv().await, OutboundEvent::Pong);
        first.close().await;
    }

    #[tokio::test]
    async fn test_evicted_member_ping_ends_session() {
        // テスト項目: 送信失敗で退出させられたメンバーの ping には pong が返らず、セッションが終了する
        // given (前提条件): bob のバッファは 1 件、送信の待ち時間は 20ms
        let (state, repository) = create_state();
        let (room, alice) = state
            .create_room_usecase
            .execute("Standup".to_string(), "alice".to_string())
            .await
            .unwrap();
        let (_, bob) = state
            .join_room_usecase
            .execute(room.id.as_str().to_string(), "bob".to_string())
            .await
            .unwrap();
        let mut alice_client = connect(&state, room.id.as_str(), alice.id.as_str());
        alice_client.recv().await; // room_info
        let mut bob_client = connect_with_buffer(
            &state,
            room.id.as_str(),
            bob.id.as_str(),
            1,
            Duration::from_millis(20),
        );
        assert!(matches!(bob_client.recv().await, OutboundEvent::RoomInfo { .. }));
        alice_client.recv().await; // user_joined

        // when (操作): bob が読まないまま alice が 2 件発言し、bob が退出させられる
        alice_client
            .send(r#"{"type":"message","content":"one"}"#)
            .await;
        alice_client
            .send(r#"{"type":"message","content":"two"}"#)
            .await;
        alice_client.send(r#"{"type":"ping"}"#).await;
        alice_client.recv().await; // one
        alice_client.recv().await; // two
        // alice の pong はブロードキャスト（と強制退出）の完了後に届く
        assert_eq!(alice_client.recv().await, OutboundEvent::Pong);
        assert_eq!(repository.list_members(&room.id).await.unwrap().len(), 1);

        bob_client.send(r#"{"type":"ping"}"#).await;

        // then (期待する結果): bob のセッションは Closed になり、pong は届かない
        let phase = timeout(Duration::from_secs(1), &mut bob_client.handle)
            .await
            .expect("evicted session did not finish")
            .unwrap();
        assert_eq!(phase, SessionState::Closed);
        let mut remaining = Vec::new();
        while let Some(frame) = bob_client.outbound.recv().await {
            remaining.push(serde_json::from_str::<OutboundEvent>(&frame).unwrap());
        }
        assert!(!remaining.contains(&OutboundEvent::Pong));
        assert!(matches!(
            alice_client.recv().await,
            OutboundEvent::UserLeft { member_count: 1, ref username, .. } if username == "bob"
        ));
        assert_eq!(repository.stats().await.active_connections, 1);

        alice_client.close().await;
    }

    #[tokio::test]
    async fn test_late_joiner_receives_last_ten_messages() {
        // テスト項目: 60 件の発言後に接続したメンバーの room_info には最新 10 件だけが含まれる
        // given (前提条件):
        let (state, _repository) = create_state();
        let (room, alice) = state
            .create_room_usecase
            .execute("Standup".to_string(), "alice".to_string())
            .await
            .unwrap();
        for i in 0..60 {
            state
                .send_message_usecase
                .execute(&room.id, &alice.id, format!("message {i}"))
                .await
                .unwrap();
        }
        let (_, carol) = state
            .join_room_usecase
            .execute(room.id.as_str().to_string(), "carol".to_string())
            .await
            .unwrap();

        // when (操作):
        let mut client = connect(&state, room.id.as_str(), carol.id.as_str());

        // then (期待する結果):
        let OutboundEvent::RoomInfo {
            recent_messages, ..
        } = client.recv().await
        else {
            panic!("expected room_info");
        };
        assert_eq!(recent_messages.len(), 10);
        assert_eq!(recent_messages[0].content, "message 50");
        assert_eq!(recent_messages[9].content, "message 59");
        client.close().await;
    }
}
