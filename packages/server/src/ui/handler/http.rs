//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::domain::RoomId;
use crate::infrastructure::dto::http::{
    CreateRoomRequest, CreateRoomResponse, RoomCheckResponse, RoomMemoryResponse,
};

use super::super::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Create a room with a freshly generated code
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    request: Option<Json<CreateRoomRequest>>,
) -> Result<Json<CreateRoomResponse>, StatusCode> {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    match state.create_room_usecase.execute(request.name).await {
        Ok(room) => Ok(Json(CreateRoomResponse {
            room_id: room.id.value(),
            room_code: room.code.as_str().to_string(),
            name: room.name,
        })),
        Err(e) => {
            tracing::error!("Room creation failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Report whether a room code exists
pub async fn check_room(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<RoomCheckResponse>, StatusCode> {
    match state.check_room_usecase.execute(&code).await {
        Ok(exists) => Ok(Json(RoomCheckResponse { exists })),
        Err(e) => {
            tracing::error!("Room check failed for '{}': {}", code, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Debug endpoint: facts extracted for a room in this process's lifetime
pub async fn room_memory(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
) -> Json<RoomMemoryResponse> {
    let facts = state.memory.facts_for(RoomId::new(room_id)).await;
    Json(RoomMemoryResponse { room_id, facts })
}
