//! WebSocket wire events.
//!
//! Inbound payloads are decoded once, at the transport boundary, into the
//! tagged [`ClientEvent`] enum; handlers never touch raw JSON.

use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Events a client may send over the socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom { room_code: String },
    SendMessage { room_code: String, message: String },
    LeaveRoom { room_code: String },
}

/// Author reference carried on `new_message` events.
///
/// Users are referenced by numeric id; assistant replies carry the fixed
/// literal `"agent"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorRef {
    User(i64),
    Agent(String),
}

impl AuthorRef {
    pub fn user(user_id: UserId) -> Self {
        Self::User(user_id.value())
    }

    pub fn agent() -> Self {
        Self::Agent("agent".to_string())
    }
}

/// Assistant activity states broadcast to a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Thinking,
    Responding,
    Idle,
    Failed,
}

/// Events the server emits to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    UserJoined {
        user_id: i64,
        username: String,
    },
    UserLeft {
        user_id: i64,
    },
    NewMessage {
        user_id: AuthorRef,
        message: String,
        username: String,
    },
    AgentStatus {
        status: AgentStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Error {
        message: String,
    },
}

impl ServerEvent {
    /// Serialize for the wire. Server events are plain data and always
    /// serialize.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
}
