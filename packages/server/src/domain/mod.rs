//! Domain layer: entities, value objects, session state and the
//! interfaces the rest of the system depends on.

pub mod entity;
pub mod error;
pub mod generation;
pub mod pusher;
pub mod repository;
pub mod session;
pub mod value_object;
pub mod verifier;

pub use entity::{FactKind, MemberRole, MemoryFact, Membership, Room, StoredMessage, User};
pub use error::{CredentialRejection, GenerationError, PushError, StoreError, ValueError};
pub use generation::TextGenerator;
pub use pusher::{EventPusher, PusherChannel};
pub use repository::ChatStore;
pub use session::{ConnectionRegistry, RegisterError, RoomRoster};
pub use value_object::{ConnectionId, MessageId, MessageText, RoomCode, RoomId, Timestamp, UserId};
pub use verifier::TokenVerifier;

#[cfg(test)]
pub use generation::MockTextGenerator;
#[cfg(test)]
pub use pusher::MockEventPusher;
#[cfg(test)]
pub use repository::MockChatStore;
#[cfg(test)]
pub use verifier::MockTokenVerifier;
