//! Domain entities mirroring the durable data model.

use serde::{Deserialize, Serialize};

use super::value_object::{MessageId, MessageText, RoomCode, RoomId, Timestamp, UserId};

/// Durable user identity.
///
/// Created by the external account service on first authentication with a
/// given provider / provider-id pair; never deleted by this core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub oauth_provider: String,
    pub oauth_id: String,
}

/// Durable chat channel, addressed publicly by its code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub code: RoomCode,
}

/// Role of a user inside a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Member,
}

impl Default for MemberRole {
    fn default() -> Self {
        Self::Member
    }
}

/// Historical record that a user has joined a room.
///
/// Advisory only; the live roster gates message send and fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub user_id: UserId,
    pub room_id: RoomId,
    pub joined_at: Timestamp,
    pub role: MemberRole,
}

/// A persisted chat message. Immutable once created.
///
/// Assistant replies carry `from_agent = true` rather than a content
/// prefix, so user text that happens to start with the invocation marker
/// stays unambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: MessageId,
    pub room_id: RoomId,
    pub author_id: UserId,
    pub text: MessageText,
    pub timestamp: Timestamp,
    pub from_agent: bool,
}

/// Kind of a fact extracted from room conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactKind {
    Decision,
    Preference,
    Goal,
    Fact,
    Constraint,
}

/// One durable fact worth remembering, extracted from a user message.
///
/// Session-scoped: lives in process memory only, keyed by room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryFact {
    pub kind: FactKind,
    pub key: String,
    pub value: String,
}
