//! Assistant coordinator.
//!
//! Runs the external generation call as an independent unit of work: the
//! message pipeline spawns [`AgentCoordinator::invoke`] fire-and-forget and
//! moves on. Every failure of the external call (transport error,
//! malformed output, timeout) is converted into the status/error event
//! sequence here; nothing propagates back through the pipeline.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::domain::{
    ChatStore, GenerationError, MessageText, Room, RoomId, RoomRoster, TextGenerator, UserId,
};
use crate::domain::pusher::EventPusher;
use crate::infrastructure::dto::websocket::{AgentStatus, AuthorRef, ServerEvent};

use super::error::EventError;

/// Reserved marker that routes a message to the assistant
pub const AGENT_INVOCATION_PREFIX: &str = "@agent";

/// Display name assistant replies are attributed to
pub const AGENT_DISPLAY_NAME: &str = "Agent";

/// Upper bound on the external call; expiry takes the failure path
pub const AGENT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// How many recent messages to fetch from history
const HISTORY_FETCH_LIMIT: usize = 15;

/// How many of the fetched messages end up in the prompt
const HISTORY_PROMPT_LIMIT: usize = 10;

const AGENT_SYSTEM_PROMPT: &str = "You are a helpful assistant in a chat room. Be concise \
and helpful. Use the conversation history to provide context-aware responses. Respond in a \
casual, funny tone";

/// Extract the assistant prompt from a message, if it is an invocation.
///
/// A message invokes the assistant when its trimmed text starts with
/// [`AGENT_INVOCATION_PREFIX`] and non-empty content follows.
pub fn agent_invocation(text: &str) -> Option<&str> {
    let rest = text.trim().strip_prefix(AGENT_INVOCATION_PREFIX)?;
    let prompt = rest.trim();
    if prompt.is_empty() { None } else { Some(prompt) }
}

pub struct AgentCoordinator {
    store: Arc<dyn ChatStore>,
    roster: Arc<Mutex<RoomRoster>>,
    pusher: Arc<dyn EventPusher>,
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl AgentCoordinator {
    pub fn new(
        store: Arc<dyn ChatStore>,
        roster: Arc<Mutex<RoomRoster>>,
        pusher: Arc<dyn EventPusher>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self::with_timeout(store, roster, pusher, generator, AGENT_CALL_TIMEOUT)
    }

    pub fn with_timeout(
        store: Arc<dyn ChatStore>,
        roster: Arc<Mutex<RoomRoster>>,
        pusher: Arc<dyn EventPusher>,
        generator: Arc<dyn TextGenerator>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            roster,
            pusher,
            generator,
            timeout,
        }
    }

    /// Answer an invocation in `room`, emitting status events around the
    /// external call and persisting the reply on success.
    ///
    /// No lock is held across the generation call, and no fault escapes
    /// this method.
    pub async fn invoke(&self, room: Room, author_id: UserId, prompt: String) {
        self.emit_status(room.id, AgentStatus::Thinking, None).await;

        let transcript = self.recent_transcript(room.id).await;
        let user_prompt = build_user_prompt(&transcript, &prompt);

        let call = self.generator.generate(AGENT_SYSTEM_PROMPT, &user_prompt);
        let reply = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.timeout)),
        };

        match reply {
            Ok(reply) => {
                self.emit_status(room.id, AgentStatus::Responding, None).await;

                let message = ServerEvent::NewMessage {
                    user_id: AuthorRef::agent(),
                    message: reply.clone(),
                    username: AGENT_DISPLAY_NAME.to_string(),
                };
                self.broadcast(room.id, &message.to_json()).await;

                self.emit_status(room.id, AgentStatus::Idle, None).await;

                match MessageText::new(reply) {
                    Ok(text) => {
                        if let Err(e) = self
                            .store
                            .insert_message(room.id, author_id, text, true)
                            .await
                        {
                            tracing::error!(
                                "Failed to persist assistant reply in room {}: {}",
                                room.id,
                                e
                            );
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Assistant reply is not persistable: {}", e);
                    }
                }
            }
            Err(e) => {
                tracing::error!("Agent invocation failed in room {}: {}", room.id, e);
                self.emit_status(room.id, AgentStatus::Failed, Some(e.to_string()))
                    .await;
                let error = ServerEvent::Error {
                    message: EventError::AgentError.to_string(),
                };
                self.broadcast(room.id, &error.to_json()).await;
            }
        }
    }

    /// Transcript lines for the prompt: the most recent user-authored
    /// messages, oldest first, with assistant replies excluded so the
    /// assistant never reads its own output as user input.
    async fn recent_transcript(&self, room_id: RoomId) -> Vec<String> {
        let messages = match self.store.recent_messages(room_id, HISTORY_FETCH_LIMIT).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::error!("Failed to load history for room {}: {}", room_id, e);
                return Vec::new();
            }
        };

        let user_messages: Vec<_> = messages.into_iter().filter(|m| !m.from_agent).collect();
        let skip = user_messages.len().saturating_sub(HISTORY_PROMPT_LIMIT);

        let mut names: HashMap<UserId, String> = HashMap::new();
        let mut lines = Vec::new();
        for message in user_messages.into_iter().skip(skip) {
            let username = match names.get(&message.author_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self.display_name(message.author_id).await;
                    names.insert(message.author_id, name.clone());
                    name
                }
            };
            lines.push(format!("{}: {}", username, message.text.as_str()));
        }
        lines
    }

    async fn display_name(&self, user_id: UserId) -> String {
        match self.store.user_by_id(user_id).await {
            Ok(Some(user)) => user.username,
            _ => format!("User {}", user_id),
        }
    }

    async fn emit_status(&self, room_id: RoomId, status: AgentStatus, error: Option<String>) {
        let event = ServerEvent::AgentStatus { status, error };
        self.broadcast(room_id, &event.to_json()).await;
    }

    async fn broadcast(&self, room_id: RoomId, json: &str) {
        let members = self.roster.lock().await.members(room_id);
        if let Err(e) = self.pusher.broadcast(members, json).await {
            tracing::warn!("Failed to broadcast to room {}: {}", room_id, e);
        }
    }
}

/// Combine transcript lines and the user's question into the generation
/// prompt.
fn build_user_prompt(transcript: &[String], prompt: &str) -> String {
    let conversation_history = if transcript.is_empty() {
        String::new()
    } else {
        format!("\n\nRecent conversation:\n{}\n\n", transcript.join("\n"))
    };
    format!("{conversation_history}User asks: {prompt}")
}
