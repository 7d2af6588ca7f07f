//! UseCase 層のエラー型
//!
//! Display の文言は `error` フレームや HTTP レスポンスの本文としてそのまま
//! クライアントに返されます。

use thiserror::Error;

use crate::domain::{RepositoryError, RoomError, ValueObjectError};

/// ルーム作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValueObjectError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// ルーム参加のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValueObjectError),

    #[error("Room not found")]
    RoomNotFound,

    #[error("Username '{0}' is already taken in this room")]
    UsernameTaken(String),

    #[error("Failed to allocate a unique id after {0} attempts")]
    IdAllocationExhausted(usize),
}

impl From<RepositoryError> for JoinRoomError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Room(RoomError::UsernameTaken(username)) => {
                Self::UsernameTaken(username)
            }
            RepositoryError::IdAllocationExhausted(attempts) => {
                Self::IdAllocationExhausted(attempts)
            }
            _ => Self::RoomNotFound,
        }
    }
}

/// ルーム詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Room not found")]
    RoomNotFound,
}

/// メッセージ履歴取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomMessagesError {
    #[error("Room not found")]
    RoomNotFound,
}

/// 接続確立のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("User not found in room")]
    MemberNotFound,

    #[error("User is already connected to this room")]
    AlreadyConnected,
}

impl From<RepositoryError> for ConnectError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Room(RoomError::MemberNotFound(_)) => Self::MemberNotFound,
            RepositoryError::Room(RoomError::AlreadyConnected(_)) => Self::AlreadyConnected,
            _ => Self::RoomNotFound,
        }
    }
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("Invalid message: {0}")]
    InvalidContent(#[from] ValueObjectError),

    #[error("Room not found")]
    RoomNotFound,

    #[error("User not found in room")]
    MemberNotFound,
}

impl From<RepositoryError> for SendMessageError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Room(RoomError::MemberNotFound(_)) => Self::MemberNotFound,
            _ => Self::RoomNotFound,
        }
    }
}

/// 入力中通知のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyTypingError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("User not found in room")]
    MemberNotFound,
}

impl From<RepositoryError> for NotifyTypingError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Room(RoomError::MemberNotFound(_)) => Self::MemberNotFound,
            _ => Self::RoomNotFound,
        }
    }
}
