//! HTTP API request/response bodies.

use serde::{Deserialize, Serialize};

use crate::domain::MemoryFact;

/// Body for `POST /api/rooms`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRoomRequest {
    /// Human-readable room name; a default is used when omitted
    #[serde(default)]
    pub name: Option<String>,
}

/// Response for `POST /api/rooms`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub room_id: i64,
    pub room_code: String,
    pub name: String,
}

/// Response for `GET /api/rooms/{code}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCheckResponse {
    pub exists: bool,
}

/// Response for `GET /debug/rooms/{room_id}/memory`
#[derive(Debug, Clone, Serialize)]
pub struct RoomMemoryResponse {
    pub room_id: i64,
    pub facts: Vec<MemoryFact>,
}
