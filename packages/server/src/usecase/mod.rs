//! Usecase layer: one struct per inbound operation, plus the assistant
//! coordinator and the memory extractor.

mod agent;
mod connect_session;
mod create_room;
mod disconnect_session;
mod error;
mod join_room;
mod leave_room;
mod memory;
mod send_message;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::{
    AGENT_CALL_TIMEOUT, AGENT_INVOCATION_PREFIX, AgentCoordinator, agent_invocation,
};
pub use connect_session::ConnectSessionUseCase;
pub use create_room::{CheckRoomUseCase, CreateRoomUseCase};
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{ConnectError, EventError};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use memory::{MemoryExtractor, MemoryStore};
pub use send_message::SendMessageUseCase;
