//! Data Transfer Objects for the chat service.
//!
//! DTOs are organized by protocol:
//! - `websocket`: inbound client events and outbound server events
//! - `http`: HTTP API request/response bodies

pub mod http;
pub mod websocket;
