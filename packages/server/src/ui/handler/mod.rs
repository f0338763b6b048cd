//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{check_room, create_room, health_check, room_memory};
pub use websocket::websocket_handler;
