//! UseCase: connection teardown.
//!
//! Runs on every transport-level disconnect, including sockets that never
//! completed authentication. Idempotent: a second invocation for the same
//! connection finds nothing to clean up.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionRegistry, EventPusher, RoomId, RoomRoster,
};
use crate::infrastructure::dto::websocket::ServerEvent;

pub struct DisconnectSessionUseCase {
    registry: Arc<Mutex<ConnectionRegistry>>,
    roster: Arc<Mutex<RoomRoster>>,
    pusher: Arc<dyn EventPusher>,
}

impl DisconnectSessionUseCase {
    pub fn new(
        registry: Arc<Mutex<ConnectionRegistry>>,
        roster: Arc<Mutex<RoomRoster>>,
        pusher: Arc<dyn EventPusher>,
    ) -> Self {
        Self {
            registry,
            roster,
            pusher,
        }
    }

    /// Remove the connection from every room and the registry, announcing
    /// the departure to each room it was in. Returns the rooms left.
    pub async fn execute(&self, connection_id: ConnectionId) -> Vec<RoomId> {
        let (rooms, remaining_per_room) = {
            let mut roster = self.roster.lock().await;
            let rooms = roster.leave_all(&connection_id);
            let remaining: Vec<(RoomId, Vec<ConnectionId>)> = rooms
                .iter()
                .map(|room_id| (*room_id, roster.members(*room_id)))
                .collect();
            (rooms, remaining)
        };

        let user_id = self.registry.lock().await.unregister(&connection_id);

        if let Some(user_id) = user_id {
            let left = ServerEvent::UserLeft {
                user_id: user_id.value(),
            };
            let json = left.to_json();
            for (room_id, members) in remaining_per_room {
                if let Err(e) = self.pusher.broadcast(members, &json).await {
                    tracing::warn!(
                        "Failed to broadcast user_left to room {}: {}",
                        room_id,
                        e
                    );
                }
            }
        }

        self.pusher.unregister(&connection_id).await;

        rooms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use crate::usecase::testing::RecordingPusher;

    fn fixture() -> (
        Arc<Mutex<ConnectionRegistry>>,
        Arc<Mutex<RoomRoster>>,
        Arc<RecordingPusher>,
        DisconnectSessionUseCase,
    ) {
        let registry = Arc::new(Mutex::new(ConnectionRegistry::new()));
        let roster = Arc::new(Mutex::new(RoomRoster::new()));
        let pusher = Arc::new(RecordingPusher::new());
        let usecase =
            DisconnectSessionUseCase::new(registry.clone(), roster.clone(), pusher.clone());
        (registry, roster, pusher, usecase)
    }

    #[tokio::test]
    async fn test_disconnect_clears_all_rooms_and_registry() {
        let (registry, roster, _pusher, usecase) = fixture();
        let connection = ConnectionId::generate();
        registry
            .lock()
            .await
            .register(connection, UserId::new(1))
            .unwrap();
        roster.lock().await.join(connection, RoomId::new(1));
        roster.lock().await.join(connection, RoomId::new(2));

        let rooms = usecase.execute(connection).await;

        assert_eq!(rooms.len(), 2);
        assert_eq!(registry.lock().await.lookup(&connection), None);
        assert!(!roster.lock().await.is_member(&connection, RoomId::new(1)));
        assert!(!roster.lock().await.is_member(&connection, RoomId::new(2)));
    }

    #[tokio::test]
    async fn test_disconnect_broadcasts_departure_per_room() {
        let (registry, roster, pusher, usecase) = fixture();
        let leaver = ConnectionId::generate();
        let witness_a = ConnectionId::generate();
        let witness_b = ConnectionId::generate();
        registry
            .lock()
            .await
            .register(leaver, UserId::new(1))
            .unwrap();
        roster.lock().await.join(leaver, RoomId::new(1));
        roster.lock().await.join(leaver, RoomId::new(2));
        roster.lock().await.join(witness_a, RoomId::new(1));
        roster.lock().await.join(witness_b, RoomId::new(2));

        usecase.execute(leaver).await;

        let records = pusher.records().await;
        assert_eq!(records.len(), 2);
        for record in &records {
            assert!(record.content.contains(r#""type":"user_left""#));
            assert!(record.content.contains(r#""user_id":1"#));
            assert!(!record.targets.contains(&leaver));
        }
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let (registry, roster, pusher, usecase) = fixture();
        let connection = ConnectionId::generate();
        registry
            .lock()
            .await
            .register(connection, UserId::new(1))
            .unwrap();
        roster.lock().await.join(connection, RoomId::new(1));

        usecase.execute(connection).await;
        let second = usecase.execute(connection).await;

        assert!(second.is_empty());
        // Only the first pass had a departure to announce
        assert_eq!(pusher.records().await.len(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_before_authentication_is_safe() {
        let (_registry, _roster, pusher, usecase) = fixture();

        let rooms = usecase.execute(ConnectionId::generate()).await;

        assert!(rooms.is_empty());
        assert!(pusher.records().await.is_empty());
    }
}
