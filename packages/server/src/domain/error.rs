//! Error types shared across the domain boundary.

use std::time::Duration;

use thiserror::Error;

use super::value_object::{ConnectionId, ROOM_CODE_LEN};

/// Validation failures for value object constructors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("room code must be {ROOM_CODE_LEN} characters from A-Z0-9, got '{got}'")]
    InvalidRoomCode { got: String },
    #[error("message text must not be empty")]
    EmptyMessage,
    #[error("message text exceeds {max} characters")]
    MessageTooLong { max: usize },
}

/// Failures of the durable store collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("room code '{0}' already exists")]
    RoomCodeTaken(String),
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Failures delivering an event to a connection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),
    #[error("connection {0} channel is closed")]
    ChannelClosed(ConnectionId),
}

/// Why a presented credential was rejected.
///
/// The verifier is pure; every variant terminates the connection attempt
/// before the registry ever sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialRejection {
    #[error("no credential supplied")]
    Missing,
    #[error("credential is malformed")]
    Malformed,
    #[error("credential has expired")]
    Expired,
    #[error("credential signature is invalid")]
    InvalidSignature,
}

/// Failures of the external generation call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Request(String),
    #[error("generation service returned malformed output: {0}")]
    Malformed(String),
    #[error("generation call timed out after {0:?}")]
    Timeout(Duration),
}
