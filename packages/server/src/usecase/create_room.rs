//! UseCases: room creation and room-code lookup.

use std::sync::Arc;

use crate::domain::{ChatStore, Room, RoomCode, StoreError};

/// Name used when the creation request does not carry one
const DEFAULT_ROOM_NAME: &str = "Untitled Room";

pub struct CreateRoomUseCase {
    store: Arc<dyn ChatStore>,
}

impl CreateRoomUseCase {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    /// Create a room with a freshly generated code, regenerating on the
    /// rare collision with an existing room.
    pub async fn execute(&self, name: Option<String>) -> Result<Room, StoreError> {
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ROOM_NAME.to_string());

        loop {
            let code = RoomCode::random();
            match self.store.create_room(name.clone(), code).await {
                Ok(room) => {
                    tracing::info!("Room '{}' created with code {}", room.name, room.code);
                    return Ok(room);
                }
                Err(StoreError::RoomCodeTaken(code)) => {
                    tracing::debug!("Room code {} collided, regenerating", code);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

pub struct CheckRoomUseCase {
    store: Arc<dyn ChatStore>,
}

impl CheckRoomUseCase {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    /// Whether a room with this code exists. A malformed code simply does
    /// not exist.
    pub async fn execute(&self, room_code: &str) -> Result<bool, StoreError> {
        let Ok(code) = RoomCode::new(room_code.to_string()) else {
            return Ok(false);
        };
        Ok(self.store.room_by_code(&code).await?.is_some())
    }
}
