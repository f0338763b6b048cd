//! Validated value objects for the chat domain.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueError;

/// Length of a public room code
pub const ROOM_CODE_LEN: usize = 8;

/// Alphabet room codes are drawn from
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Maximum length of a chat message, in characters
pub const MESSAGE_TEXT_MAX_LEN: usize = 2000;

/// Opaque handle for one live client transport session.
///
/// Generated server-side when a socket is accepted; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh connection handle
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Durable user identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Durable room identity, distinct from the public room code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(i64);

impl RoomId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Durable message identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(i64);

impl MessageId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Short public identifier for a room.
///
/// Exactly [`ROOM_CODE_LEN`] characters drawn from [`ROOM_CODE_ALPHABET`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn new(value: String) -> Result<Self, ValueError> {
        if value.len() != ROOM_CODE_LEN
            || !value.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b))
        {
            return Err(ValueError::InvalidRoomCode { got: value });
        }
        Ok(Self(value))
    }

    /// Generate a random room code.
    ///
    /// Uniqueness is the store's concern; callers retry on collision.
    pub fn random() -> Self {
        use rand::Rng;

        let mut rng = rand::rng();
        let code: String = (0..ROOM_CODE_LEN)
            .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Chat message body. Non-empty after trimming and bounded in length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(value: String) -> Result<Self, ValueError> {
        if value.trim().is_empty() {
            return Err(ValueError::EmptyMessage);
        }
        if value.chars().count() > MESSAGE_TEXT_MAX_LEN {
            return Err(ValueError::MessageTooLong {
                max: MESSAGE_TEXT_MAX_LEN,
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

impl TryFrom<String> for MessageText {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_ids_are_unique() {
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();

        assert_ne!(a, b);
    }

    #[test]
    fn test_room_code_accepts_valid_code() {
        let code = RoomCode::new("ABCD1234".to_string());

        assert!(code.is_ok());
        assert_eq!(code.unwrap().as_str(), "ABCD1234");
    }

    #[test]
    fn test_room_code_rejects_wrong_length() {
        assert!(RoomCode::new("ABC".to_string()).is_err());
        assert!(RoomCode::new("ABCD12345".to_string()).is_err());
    }

    #[test]
    fn test_room_code_rejects_lowercase_and_symbols() {
        assert!(RoomCode::new("abcd1234".to_string()).is_err());
        assert!(RoomCode::new("ABCD-123".to_string()).is_err());
    }

    #[test]
    fn test_room_code_random_uses_fixed_alphabet_and_length() {
        for _ in 0..50 {
            let code = RoomCode::random();

            assert_eq!(code.as_str().len(), ROOM_CODE_LEN);
            assert!(
                code.as_str()
                    .bytes()
                    .all(|b| ROOM_CODE_ALPHABET.contains(&b))
            );
        }
    }

    #[test]
    fn test_message_text_rejects_empty_and_whitespace() {
        assert!(MessageText::new(String::new()).is_err());
        assert!(MessageText::new("   \n\t".to_string()).is_err());
    }

    #[test]
    fn test_message_text_rejects_oversized() {
        let oversized = "x".repeat(MESSAGE_TEXT_MAX_LEN + 1);

        assert!(MessageText::new(oversized).is_err());
    }

    #[test]
    fn test_message_text_keeps_original_content() {
        let text = MessageText::new("  hello world  ".to_string()).unwrap();

        assert_eq!(text.as_str(), "  hello world  ");
    }
}
