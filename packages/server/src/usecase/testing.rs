//! Test doubles and fixtures shared by the usecase tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use parlor_shared::time::SystemClock;

use crate::domain::{
    ChatStore, ConnectionId, EventPusher, PushError, PusherChannel, Room, RoomCode, User,
};
use crate::infrastructure::repository::InMemoryChatStore;

/// One recorded delivery: the targets it went to and the raw JSON payload.
#[derive(Debug, Clone)]
pub struct PushRecord {
    pub targets: Vec<ConnectionId>,
    pub content: String,
}

/// An [`EventPusher`] that records every delivery in order instead of
/// touching sockets.
#[derive(Default)]
pub struct RecordingPusher {
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
    records: Mutex<Vec<PushRecord>>,
}

impl RecordingPusher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_registered(&self, connection_id: &ConnectionId) -> bool {
        self.clients.lock().await.contains_key(connection_id)
    }

    pub async fn registered_count(&self) -> usize {
        self.clients.lock().await.len()
    }

    pub async fn records(&self) -> Vec<PushRecord> {
        self.records.lock().await.clone()
    }

    /// Raw payloads in emission order
    pub async fn contents(&self) -> Vec<String> {
        self.records
            .lock()
            .await
            .iter()
            .map(|r| r.content.clone())
            .collect()
    }
}

#[async_trait]
impl EventPusher for RecordingPusher {
    async fn register(&self, connection_id: ConnectionId, sender: PusherChannel) {
        self.clients.lock().await.insert(connection_id, sender);
    }

    async fn unregister(&self, connection_id: &ConnectionId) {
        self.clients.lock().await.remove(connection_id);
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), PushError> {
        self.records.lock().await.push(PushRecord {
            targets: vec![*connection_id],
            content: content.to_string(),
        });
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), PushError> {
        self.records.lock().await.push(PushRecord {
            targets,
            content: content.to_string(),
        });
        Ok(())
    }
}

pub fn new_store() -> Arc<InMemoryChatStore> {
    Arc::new(InMemoryChatStore::new(Arc::new(SystemClock)))
}

pub async fn seed_user(store: &InMemoryChatStore, username: &str) -> User {
    store
        .create_user(
            username.to_string(),
            format!("{username}@example.com"),
            "github".to_string(),
            format!("gh-{username}"),
        )
        .await
        .unwrap()
}

pub async fn seed_room(store: &InMemoryChatStore, code: &str) -> Room {
    store
        .create_room(
            "test room".to_string(),
            RoomCode::new(code.to_string()).unwrap(),
        )
        .await
        .unwrap()
}
