//! WebSocket implementation of the event pusher.
//!
//! Keeps the connection → outbound-channel map; the WebSocket write half of
//! each connection drains its channel. A dead channel during broadcast is
//! logged and skipped so one stale connection never interrupts fan-out to
//! the rest of the room.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, EventPusher, PushError, PusherChannel};

#[derive(Default)]
pub struct WebSocketEventPusher {
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketEventPusher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventPusher for WebSocketEventPusher {
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
        let clients = self.clients.lock().await;
        let sender = clients
            .get(connection_id)
            .ok_or(PushError::UnknownConnection(*connection_id))?;
        sender
            .send(content.to_string())
            .map_err(|_| PushError::ChannelClosed(*connection_id))
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), PushError> {
        let clients = self.clients.lock().await;
        for connection_id in targets {
            match clients.get(&connection_id) {
                Some(sender) => {
                    if sender.send(content.to_string()).is_err() {
                        tracing::warn!(
                            "Skipping closed connection {} during broadcast",
                            connection_id
                        );
                    }
                }
                None => {
                    tracing::warn!(
                        "Skipping unknown connection {} during broadcast",
                        connection_id
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_push_to_delivers_to_registered_connection() {
        let pusher = WebSocketEventPusher::new();
        let connection = ConnectionId::generate();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register(connection, tx).await;

        pusher.push_to(&connection, "hello").await.unwrap();

        assert_eq!(rx.recv().await, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_unknown_connection_fails() {
        let pusher = WebSocketEventPusher::new();
        let connection = ConnectionId::generate();

        let result = pusher.push_to(&connection, "hello").await;

        assert_eq!(result, Err(PushError::UnknownConnection(connection)));
    }

    #[tokio::test]
    async fn test_push_to_closed_channel_fails() {
        let pusher = WebSocketEventPusher::new();
        let connection = ConnectionId::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        pusher.register(connection, tx).await;

        let result = pusher.push_to(&connection, "hello").await;

        assert_eq!(result, Err(PushError::ChannelClosed(connection)));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_targets() {
        let pusher = WebSocketEventPusher::new();
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        pusher.register(a, tx_a).await;
        pusher.register(b, tx_b).await;

        pusher.broadcast(vec![a, b], "ping").await.unwrap();

        assert_eq!(rx_a.recv().await, Some("ping".to_string()));
        assert_eq!(rx_b.recv().await, Some("ping".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_skips_dead_targets() {
        let pusher = WebSocketEventPusher::new();
        let alive = ConnectionId::generate();
        let dead = ConnectionId::generate();
        let gone = ConnectionId::generate();
        let (tx_alive, mut rx_alive) = mpsc::unbounded_channel();
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        drop(rx_dead);
        pusher.register(alive, tx_alive).await;
        pusher.register(dead, tx_dead).await;

        let result = pusher.broadcast(vec![dead, gone, alive], "ping").await;

        assert!(result.is_ok());
        assert_eq!(rx_alive.recv().await, Some("ping".to_string()));
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let pusher = WebSocketEventPusher::new();
        let connection = ConnectionId::generate();
        let (tx, _rx) = mpsc::unbounded_channel();
        pusher.register(connection, tx).await;

        pusher.unregister(&connection).await;
        pusher.unregister(&connection).await;

        assert_eq!(
            pusher.push_to(&connection, "hello").await,
            Err(PushError::UnknownConnection(connection))
        );
    }
}
