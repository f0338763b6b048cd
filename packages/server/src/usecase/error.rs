//! Usecase error types.
//!
//! [`EventError`]'s `Display` output is exactly the caller-visible message
//! carried on `error` events, so handlers surface errors with
//! `err.to_string()` and nothing else.

use thiserror::Error;

use crate::domain::{CredentialRejection, RegisterError};

/// Errors surfaced to the caller of an inbound room event.
///
/// A missing room and a room the caller is not a member of produce the
/// same variant so membership state never leaks to unauthorized callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Room not found")]
    RoomNotFound,
    #[error("User not found")]
    UserNotFound,
    #[error("Agent error occurred")]
    AgentError,
}

/// Failures establishing a connection. All of them terminate the
/// connection attempt before any handler runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error(transparent)]
    Rejected(#[from] CredentialRejection),
    #[error(transparent)]
    Registry(#[from] RegisterError),
}
