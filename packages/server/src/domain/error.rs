//! Domain error types.

use thiserror::Error;

/// Validation errors raised by value object constructors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{kind} is too long ({actual} > {max} characters)")]
    TooLong {
        kind: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{0} has an invalid format: '{1}'")]
    InvalidFormat(&'static str, String),
}

/// Errors raised by the `Room` aggregate itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Member '{0}' not found in room")]
    MemberNotFound(String),

    #[error("Username '{0}' is already taken in this room")]
    UsernameTaken(String),

    #[error("Member '{0}' already has a live connection")]
    AlreadyConnected(String),
}

/// Errors raised by the room registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error("Failed to allocate a unique id after {0} attempts")]
    IdAllocationExhausted(usize),
}

/// Per-recipient send failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Connection is closed")]
    Closed,

    #[error("Send timed out after {0} ms")]
    Timeout(u64),
}

/// Failures reading from a transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Transport read failed: {0}")]
    Read(String),
}
