//! Id allocation.

use uuid::Uuid;

use super::value_object::{ID_TOKEN_LENGTH, MemberId, MessageId, RoomId};

/// Source of fresh identifiers.
///
/// The registry retries on collision, so implementations only need ids that
/// are practically unique.
#[cfg_attr(test, mockall::automock)]
pub trait IdGenerator: Send + Sync {
    fn room_id(&self) -> RoomId;
    fn member_id(&self) -> MemberId;
    fn message_id(&self) -> MessageId;
}

/// Random tokens derived from UUID v4
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    fn token() -> String {
        let mut token = Uuid::new_v4().simple().to_string();
        token.truncate(ID_TOKEN_LENGTH);
        token
    }
}

impl IdGenerator for RandomIdGenerator {
    fn room_id(&self) -> RoomId {
        RoomId(Self::token())
    }

    fn member_id(&self) -> MemberId {
        MemberId(Self::token())
    }

    fn message_id(&self) -> MessageId {
        MessageId(Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_ids_have_token_length() {
        // テスト項目: 生成されたルーム ID とメンバー ID が規定の長さの 16 進文字列になる
        // given (前提条件):
        let generator = RandomIdGenerator;

        // when (操作):
        let room_id = generator.room_id();
        let member_id = generator.member_id();

        // then (期待する結果):
        assert_eq!(room_id.as_str().len(), ID_TOKEN_LENGTH);
        assert_eq!(member_id.as_str().len(), ID_TOKEN_LENGTH);
        assert!(room_id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_random_ids_are_practically_unique() {
        // テスト項目: 大量に生成しても ID が重複しない
        // given (前提条件):
        let generator = RandomIdGenerator;

        // when (操作):
        let ids: HashSet<String> = (0..10_000)
            .map(|_| generator.room_id().into_string())
            .collect();

        // then (期待する結果):
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_generated_ids_pass_validation() {
        // テスト項目: 生成された ID が値オブジェクトの検証を通過する
        // given (前提条件):
        let generator = RandomIdGenerator;

        // when (操作):
        let message_id = generator.message_id();

        // then (期待する結果):
        assert!(MessageId::new(message_id.into_string()).is_ok());
        assert!(RoomId::new(generator.room_id().into_string()).is_ok());
    }
}
