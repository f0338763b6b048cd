//! Durable store interface.
//!
//! The domain layer defines the data access it needs; the infrastructure
//! layer provides the implementation.

use async_trait::async_trait;

use super::entity::{Room, StoredMessage, User};
use super::error::StoreError;
use super::value_object::{MessageText, RoomCode, RoomId, UserId};

/// Interface to the durable store for users, rooms, memberships and
/// messages.
///
/// Writes are independent, non-transactional operations relative to the
/// in-memory broadcast path; callers treat failures as "delivered but not
/// durably recorded".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Look up a user by id
    async fn user_by_id(&self, user_id: UserId) -> Result<Option<User>, StoreError>;

    /// Create a user for the given external-auth identity
    async fn create_user(
        &self,
        username: String,
        email: String,
        oauth_provider: String,
        oauth_id: String,
    ) -> Result<User, StoreError>;

    /// Look up a room by its public code
    async fn room_by_code(&self, code: &RoomCode) -> Result<Option<Room>, StoreError>;

    /// Create a room. Fails with [`StoreError::RoomCodeTaken`] when the code
    /// is already in use; callers regenerate and retry.
    async fn create_room(&self, name: String, code: RoomCode) -> Result<Room, StoreError>;

    /// Insert a membership row if absent. Idempotent.
    async fn upsert_membership(&self, user_id: UserId, room_id: RoomId)
    -> Result<(), StoreError>;

    /// Persist a message and return it with its assigned id and timestamp
    async fn insert_message(
        &self,
        room_id: RoomId,
        author_id: UserId,
        text: MessageText,
        from_agent: bool,
    ) -> Result<StoredMessage, StoreError>;

    /// Up to `limit` most-recent messages for a room, in chronological
    /// (oldest-first) order
    async fn recent_messages(
        &self,
        room_id: RoomId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, StoreError>;
}
