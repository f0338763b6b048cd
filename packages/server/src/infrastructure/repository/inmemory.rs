//! In-memory implementation of the durable store.
//!
//! HashMaps behind a single mutex stand in for the relational backend. Row
//! ids are assigned from per-entity counters and message timestamps are
//! clamped to be non-decreasing within a room, so retrieval order always
//! matches insertion order.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use parlor_shared::time::Clock;

use crate::domain::{
    ChatStore, MemberRole, Membership, MessageId, MessageText, Room, RoomCode, RoomId,
    StoreError, StoredMessage, Timestamp, User, UserId,
};

#[derive(Default)]
struct StoreInner {
    users: HashMap<i64, User>,
    rooms: HashMap<i64, Room>,
    room_ids_by_code: HashMap<String, i64>,
    memberships: HashMap<(i64, i64), Membership>,
    messages_by_room: HashMap<i64, Vec<StoredMessage>>,
    next_user_id: i64,
    next_room_id: i64,
    next_message_id: i64,
}

pub struct InMemoryChatStore {
    clock: Arc<dyn Clock>,
    inner: Mutex<StoreInner>,
}

impl InMemoryChatStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Mutex::new(StoreInner::default()),
        }
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn user_by_id(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.get(&user_id.value()).cloned())
    }

    async fn create_user(
        &self,
        username: String,
        email: String,
        oauth_provider: String,
        oauth_id: String,
    ) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_user_id += 1;
        let user = User {
            id: UserId::new(inner.next_user_id),
            username,
            email,
            oauth_provider,
            oauth_id,
        };
        inner.users.insert(user.id.value(), user.clone());
        Ok(user)
    }

    async fn room_by_code(&self, code: &RoomCode) -> Result<Option<Room>, StoreError> {
        let inner = self.inner.lock().await;
        let room = inner
            .room_ids_by_code
            .get(code.as_str())
            .and_then(|id| inner.rooms.get(id))
            .cloned();
        Ok(room)
    }

    async fn create_room(&self, name: String, code: RoomCode) -> Result<Room, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.room_ids_by_code.contains_key(code.as_str()) {
            return Err(StoreError::RoomCodeTaken(code.into_string()));
        }
        inner.next_room_id += 1;
        let room = Room {
            id: RoomId::new(inner.next_room_id),
            name,
            code,
        };
        inner
            .room_ids_by_code
            .insert(room.code.as_str().to_string(), room.id.value());
        inner.rooms.insert(room.id.value(), room.clone());
        Ok(room)
    }

    async fn upsert_membership(
        &self,
        user_id: UserId,
        room_id: RoomId,
    ) -> Result<(), StoreError> {
        let joined_at = Timestamp::new(self.clock.now_millis());
        let mut inner = self.inner.lock().await;
        inner
            .memberships
            .entry((user_id.value(), room_id.value()))
            .or_insert(Membership {
                user_id,
                room_id,
                joined_at,
                role: MemberRole::default(),
            });
        Ok(())
    }

    async fn insert_message(
        &self,
        room_id: RoomId,
        author_id: UserId,
        text: MessageText,
        from_agent: bool,
    ) -> Result<StoredMessage, StoreError> {
        let now = self.clock.now_millis();
        let mut inner = self.inner.lock().await;
        inner.next_message_id += 1;
        let id = MessageId::new(inner.next_message_id);

        let messages = inner.messages_by_room.entry(room_id.value()).or_default();
        // Clamp to the room's last timestamp so transcript order is total
        let timestamp = match messages.last() {
            Some(last) => Timestamp::new(now.max(last.timestamp.value())),
            None => Timestamp::new(now),
        };

        let message = StoredMessage {
            id,
            room_id,
            author_id,
            text,
            timestamp,
            from_agent,
        };
        messages.push(message.clone());
        Ok(message)
    }

    async fn recent_messages(
        &self,
        room_id: RoomId,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, StoreError> {
        let inner = self.inner.lock().await;
        let messages = match inner.messages_by_room.get(&room_id.value()) {
            Some(messages) => messages,
            None => return Ok(Vec::new()),
        };
        let skip = messages.len().saturating_sub(limit);
        Ok(messages[skip..].to_vec())
    }
}
