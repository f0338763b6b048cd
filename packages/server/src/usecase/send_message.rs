//! UseCase: message send.
//!
//! Validates the sender, fans the message out to the room's live members
//! before persisting it, and hands assistant invocations and memory
//! extraction off to detached tasks. Broadcast and persistence are
//! independent best-effort steps, not a transaction: a failed write leaves
//! the already-delivered message in place and surfaces as an error event.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ChatStore, ConnectionId, ConnectionRegistry, EventPusher, MessageText, RoomCode, RoomRoster,
};
use crate::infrastructure::dto::websocket::{AuthorRef, ServerEvent};

use super::agent::{AgentCoordinator, agent_invocation};
use super::error::EventError;
use super::memory::MemoryExtractor;

/// Room-visible notice when a delivered message could not be recorded
const PERSISTENCE_FAILURE_NOTICE: &str = "Message could not be saved";

pub struct SendMessageUseCase {
    registry: Arc<Mutex<ConnectionRegistry>>,
    roster: Arc<Mutex<RoomRoster>>,
    store: Arc<dyn ChatStore>,
    pusher: Arc<dyn EventPusher>,
    agent: Arc<AgentCoordinator>,
    extractor: Arc<MemoryExtractor>,
}

impl SendMessageUseCase {
    pub fn new(
        registry: Arc<Mutex<ConnectionRegistry>>,
        roster: Arc<Mutex<RoomRoster>>,
        store: Arc<dyn ChatStore>,
        pusher: Arc<dyn EventPusher>,
        agent: Arc<AgentCoordinator>,
        extractor: Arc<MemoryExtractor>,
    ) -> Self {
        Self {
            registry,
            roster,
            store,
            pusher,
            agent,
            extractor,
        }
    }

    /// Deliver a message into the room addressed by `room_code`.
    ///
    /// The sender must have joined the room on this connection; a room the
    /// sender is not in reads exactly like a room that does not exist.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_code: &str,
        message: String,
    ) -> Result<(), EventError> {
        let user_id = self
            .registry
            .lock()
            .await
            .lookup(&connection_id)
            .ok_or(EventError::Unauthenticated)?;

        let code = RoomCode::new(room_code.to_string()).map_err(|_| EventError::RoomNotFound)?;
        let room = match self.store.room_by_code(&code).await {
            Ok(Some(room)) => room,
            Ok(None) => return Err(EventError::RoomNotFound),
            Err(e) => {
                tracing::error!("Room lookup failed for code '{}': {}", code, e);
                return Err(EventError::RoomNotFound);
            }
        };

        if !self
            .roster
            .lock()
            .await
            .is_member(&connection_id, room.id)
        {
            return Err(EventError::RoomNotFound);
        }

        let text = match MessageText::new(message) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Discarding invalid message from {}: {}", user_id, e);
                return Ok(());
            }
        };

        let user = match self.store.user_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(EventError::UserNotFound),
            Err(e) => {
                tracing::error!("User lookup failed for {}: {}", user_id, e);
                return Err(EventError::UserNotFound);
            }
        };

        // Optimistic delivery: members see the message before the store
        // write happens.
        let members = self.roster.lock().await.members(room.id);
        let event = ServerEvent::NewMessage {
            user_id: AuthorRef::user(user.id),
            message: text.as_str().to_string(),
            username: user.username.clone(),
        };
        if let Err(e) = self.pusher.broadcast(members.clone(), &event.to_json()).await {
            tracing::warn!("Failed to broadcast message in room {}: {}", room.id, e);
        }

        if let Err(e) = self
            .store
            .insert_message(room.id, user_id, text.clone(), false)
            .await
        {
            tracing::error!("Failed to persist message in room {}: {}", room.id, e);
            let notice = ServerEvent::Error {
                message: PERSISTENCE_FAILURE_NOTICE.to_string(),
            };
            if let Err(e) = self.pusher.broadcast(members, &notice.to_json()).await {
                tracing::warn!(
                    "Failed to broadcast store notice in room {}: {}",
                    room.id,
                    e
                );
            }
        }

        if let Some(prompt) = agent_invocation(text.as_str()) {
            let agent = self.agent.clone();
            let agent_room = room.clone();
            let prompt = prompt.to_string();
            tokio::spawn(async move {
                agent.invoke(agent_room, user_id, prompt).await;
            });
        }

        // Every user message gets an extraction pass, invocation or not
        let extractor = self.extractor.clone();
        let room_id = room.id;
        let body = text.into_string();
        tokio::spawn(async move {
            extractor.process(room_id, &body).await;
        });

        Ok(())
    }
}
