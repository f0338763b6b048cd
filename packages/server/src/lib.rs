//! Real-time chat room server library.
//!
//! Clients create or join rooms via a short code, exchange messages over a
//! persistent WebSocket, and may invoke an in-room assistant by prefixing
//! a message with `@agent`.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
