//! Value objects used by the room registry.
//!
//! Every value object validates its input in `new` and is immutable afterwards.

use serde::Serialize;

use super::error::ValueObjectError;

/// Length of generated room and member id tokens (hex characters).
pub const ID_TOKEN_LENGTH: usize = 12;

const USERNAME_MAX_CHARS: usize = 32;
const ROOM_NAME_MAX_CHARS: usize = 64;
const MESSAGE_CONTENT_MAX_CHARS: usize = 4000;

fn validate_token(kind: &'static str, value: &str) -> Result<(), ValueObjectError> {
    if value.is_empty() {
        return Err(ValueObjectError::Empty(kind));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValueObjectError::InvalidFormat(kind, value.to_string()));
    }
    Ok(())
}

fn validate_text(
    kind: &'static str,
    value: String,
    max_chars: usize,
) -> Result<String, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValueObjectError::Empty(kind));
    }
    let length = trimmed.chars().count();
    if length > max_chars {
        return Err(ValueObjectError::TooLong {
            kind,
            max: max_chars,
            actual: length,
        });
    }
    Ok(trimmed.to_string())
}

/// Opaque room identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RoomId(pub(super) String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_token("room id", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque member identifier, unique within its room
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MemberId(pub(super) String);

impl MemberId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_token("member id", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MemberId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque chat message identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MessageId(pub(super) String);

impl MessageId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_token("message id", &value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Display name chosen by a member.
///
/// Uniqueness inside a room is case-insensitive, see [`Username::matches`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_text("username", value, USERNAME_MAX_CHARS).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Case-insensitive comparison used for the per-room uniqueness check.
    pub fn matches(&self, other: &Username) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl TryFrom<String> for Username {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Display name of a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomName(String);

impl RoomName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_text("room name", value, ROOM_NAME_MAX_CHARS).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Body of a chat message.
///
/// Surrounding whitespace is kept as sent; only blank content is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::Empty("message content"));
        }
        let length = value.chars().count();
        if length > MESSAGE_CONTENT_MAX_CHARS {
            return Err(ValueObjectError::TooLong {
                kind: "message content",
                max: MESSAGE_CONTENT_MAX_CHARS,
                actual: length,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
