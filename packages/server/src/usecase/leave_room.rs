//! UseCase: room leave.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ChatStore, ConnectionId, ConnectionRegistry, EventPusher, RoomCode, RoomRoster,
};
use crate::infrastructure::dto::websocket::ServerEvent;

use super::error::EventError;

pub struct LeaveRoomUseCase {
    registry: Arc<Mutex<ConnectionRegistry>>,
    roster: Arc<Mutex<RoomRoster>>,
    store: Arc<dyn ChatStore>,
    pusher: Arc<dyn EventPusher>,
}

impl LeaveRoomUseCase {
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

    /// Leave the room addressed by `room_code` and announce the departure
    /// to the remaining members. Leaving a room the connection is not in
    /// is a no-op.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_code: &str,
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

        let remaining = {
            let mut roster = self.roster.lock().await;
            roster.leave(&connection_id, room.id);
            roster.members(room.id)
        };

        let left = ServerEvent::UserLeft {
            user_id: user_id.value(),
        };
        if let Err(e) = self.pusher.broadcast(remaining, &left.to_json()).await {
            tracing::warn!("Failed to broadcast user_left for {}: {}", user_id, e);
        }

        Ok(())
    }
}
