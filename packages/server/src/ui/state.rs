//! Server state shared across handlers.

use std::sync::Arc;

use serde::Deserialize;

use crate::usecase::{
    CheckRoomUseCase, ConnectSessionUseCase, CreateRoomUseCase, DisconnectSessionUseCase,
    JoinRoomUseCase, LeaveRoomUseCase, MemoryStore, SendMessageUseCase,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

/// Shared application state
pub struct AppState {
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub check_room_usecase: Arc<CheckRoomUseCase>,
    pub memory: Arc<MemoryStore>,
}
