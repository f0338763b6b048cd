//! UseCase: room join.
//!
//! Admits a connection to a room's live roster, announces the arrival to
//! current members, and upserts the durable membership row. The durable
//! row is advisory history; only the roster gates later sends.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ChatStore, ConnectionId, ConnectionRegistry, EventPusher, Room, RoomCode, RoomRoster,
};
use crate::infrastructure::dto::websocket::ServerEvent;

use super::error::EventError;

pub struct JoinRoomUseCase {
    registry: Arc<Mutex<ConnectionRegistry>>,
    roster: Arc<Mutex<RoomRoster>>,
    store: Arc<dyn ChatStore>,
    pusher: Arc<dyn EventPusher>,
}

impl JoinRoomUseCase {
    pub fn new(
        registry: Arc<Mutex<ConnectionRegistry>>,
        roster: Arc<Mutex<RoomRoster>>,
        store: Arc<dyn ChatStore>,
        pusher: Arc<dyn EventPusher>,
    ) -> Self {
        Self {
            registry,
            roster,
            store,
            pusher,
        }
    }

    /// Join the room addressed by `room_code`.
    ///
    /// Joining a room the connection is already in is a no-op apart from
    /// the repeated `user_joined` announcement to current members.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_code: &str,
    ) -> Result<Room, EventError> {
        let user_id = self
            .registry
            .lock()
            .await
            .lookup(&connection_id)
            .ok_or(EventError::Unauthenticated)?;

        // An invalid code cannot name a room
        let code = RoomCode::new(room_code.to_string()).map_err(|_| EventError::RoomNotFound)?;
        let room = match self.store.room_by_code(&code).await {
            Ok(Some(room)) => room,
            Ok(None) => return Err(EventError::RoomNotFound),
            Err(e) => {
                tracing::error!("Room lookup failed for code '{}': {}", code, e);
                return Err(EventError::RoomNotFound);
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

        let members = {
            let mut roster = self.roster.lock().await;
            roster.join(connection_id, room.id);
            roster.members(room.id)
        };

        let joined = ServerEvent::UserJoined {
            user_id: user.id.value(),
            username: user.username.clone(),
        };
        if let Err(e) = self.pusher.broadcast(members, &joined.to_json()).await {
            tracing::warn!("Failed to broadcast user_joined for '{}': {}", user.username, e);
        }

        // Durable membership is historical; a failed upsert never blocks
        // the live join.
        if let Err(e) = self.store.upsert_membership(user_id, room.id).await {
            tracing::error!(
                "Failed to record membership of {} in room {}: {}",
                user_id,
                room.id,
                e
            );
        }

        Ok(room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::testing::{RecordingPusher, new_store, seed_room, seed_user};

    struct Fixture {
        registry: Arc<Mutex<ConnectionRegistry>>,
        roster: Arc<Mutex<RoomRoster>>,
        store: Arc<crate::infrastructure::repository::InMemoryChatStore>,
        pusher: Arc<RecordingPusher>,
        usecase: JoinRoomUseCase,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(Mutex::new(ConnectionRegistry::new()));
        let roster = Arc::new(Mutex::new(RoomRoster::new()));
        let store = new_store();
        let pusher = Arc::new(RecordingPusher::new());
        let usecase = JoinRoomUseCase::new(
            registry.clone(),
            roster.clone(),
            store.clone(),
            pusher.clone(),
        );
        Fixture {
            registry,
            roster,
            store,
            pusher,
            usecase,
        }
    }

    #[tokio::test]
    async fn test_join_adds_to_roster_and_broadcasts() {
        let f = fixture();
        let user = seed_user(&f.store, "alice").await;
        let room = seed_room(&f.store, "ABCD1234").await;
        let connection = ConnectionId::generate();
        f.registry
            .lock()
            .await
            .register(connection, user.id)
            .unwrap();

        let joined = f.usecase.execute(connection, "ABCD1234").await.unwrap();

        assert_eq!(joined.id, room.id);
        assert!(f.roster.lock().await.is_member(&connection, room.id));

        let records = f.pusher.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].targets, vec![connection]);
        assert!(records[0].content.contains(r#""type":"user_joined""#));
        assert!(records[0].content.contains(r#""username":"alice""#));
    }

    #[tokio::test]
    async fn test_join_unauthenticated_connection_is_rejected() {
        let f = fixture();
        seed_room(&f.store, "ABCD1234").await;

        let result = f
            .usecase
            .execute(ConnectionId::generate(), "ABCD1234")
            .await;

        assert_eq!(result, Err(EventError::Unauthenticated));
        assert!(f.pusher.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_join_unknown_room_is_rejected_without_state_change() {
        let f = fixture();
        let user = seed_user(&f.store, "alice").await;
        let connection = ConnectionId::generate();
        f.registry
            .lock()
            .await
            .register(connection, user.id)
            .unwrap();

        let result = f.usecase.execute(connection, "ZZZZ9999").await;

        assert_eq!(result, Err(EventError::RoomNotFound));
        assert!(f.pusher.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_join_malformed_code_reads_as_room_not_found() {
        let f = fixture();
        let user = seed_user(&f.store, "alice").await;
        let connection = ConnectionId::generate();
        f.registry
            .lock()
            .await
            .register(connection, user.id)
            .unwrap();

        let result = f.usecase.execute(connection, "not-a-code").await;

        assert_eq!(result, Err(EventError::RoomNotFound));
    }

    #[tokio::test]
    async fn test_join_unknown_user_is_rejected() {
        let f = fixture();
        seed_room(&f.store, "ABCD1234").await;
        let connection = ConnectionId::generate();
        f.registry
            .lock()
            .await
            .register(connection, crate::domain::UserId::new(999))
            .unwrap();

        let result = f.usecase.execute(connection, "ABCD1234").await;

        assert_eq!(result, Err(EventError::UserNotFound));
    }

    #[tokio::test]
    async fn test_join_twice_does_not_duplicate_roster_entry() {
        let f = fixture();
        let user = seed_user(&f.store, "alice").await;
        let room = seed_room(&f.store, "ABCD1234").await;
        let connection = ConnectionId::generate();
        f.registry
            .lock()
            .await
            .register(connection, user.id)
            .unwrap();

        f.usecase.execute(connection, "ABCD1234").await.unwrap();
        f.usecase.execute(connection, "ABCD1234").await.unwrap();

        assert_eq!(f.roster.lock().await.member_count(room.id), 1);
    }

    #[tokio::test]
    async fn test_join_announces_to_existing_members() {
        let f = fixture();
        let alice = seed_user(&f.store, "alice").await;
        let bob = seed_user(&f.store, "bob").await;
        seed_room(&f.store, "ABCD1234").await;
        let alice_conn = ConnectionId::generate();
        let bob_conn = ConnectionId::generate();
        f.registry
            .lock()
            .await
            .register(alice_conn, alice.id)
            .unwrap();
        f.registry.lock().await.register(bob_conn, bob.id).unwrap();

        f.usecase.execute(alice_conn, "ABCD1234").await.unwrap();
        f.usecase.execute(bob_conn, "ABCD1234").await.unwrap();

        let records = f.pusher.records().await;
        assert_eq!(records.len(), 2);
        // Bob's arrival reaches both members
        assert_eq!(records[1].targets.len(), 2);
        assert!(records[1].content.contains(r#""username":"bob""#));
    }
}
