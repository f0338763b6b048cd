//! Live session state: which connections belong to which users, and which
//! connections are currently inside which rooms.
//!
//! Both structures are plain synchronous maps so they can be tested in
//! isolation; the wiring layer puts each behind its own `tokio::sync::Mutex`.
//! Broadcast enumeration always goes through [`RoomRoster::members`], which
//! returns a snapshot taken while the lock is held.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::value_object::{ConnectionId, RoomId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("connection {0} is already registered")]
    AlreadyRegistered(ConnectionId),
}

/// Bidirectional source of truth for "who is this socket".
///
/// The identity is set once at registration and immutable afterwards.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, UserId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a verified identity for a connection.
    ///
    /// Registering the same connection twice is a programming invariant
    /// violation and returns an error rather than overwriting.
    pub fn register(
        &mut self,
        connection_id: ConnectionId,
        user_id: UserId,
    ) -> Result<(), RegisterError> {
        if self.connections.contains_key(&connection_id) {
            return Err(RegisterError::AlreadyRegistered(connection_id));
        }
        self.connections.insert(connection_id, user_id);
        Ok(())
    }

    /// Resolve the identity behind a connection. `None` means the caller
    /// must treat the actor as unauthenticated.
    pub fn lookup(&self, connection_id: &ConnectionId) -> Option<UserId> {
        self.connections.get(connection_id).copied()
    }

    /// Remove a connection. Removing an absent connection is a no-op.
    pub fn unregister(&mut self, connection_id: &ConnectionId) -> Option<UserId> {
        self.connections.remove(connection_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

/// Per-room set of currently-joined connections, with a reverse index used
/// on disconnect.
///
/// Distinct from durable [`super::entity::Membership`]: this is the live,
/// disconnect-sensitive record that gates message send and fan-out.
#[derive(Debug, Default)]
pub struct RoomRoster {
    members: HashMap<RoomId, HashSet<ConnectionId>>,
    joined: HashMap<ConnectionId, HashSet<RoomId>>,
}

impl RoomRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent add. Returns `true` if the connection was newly added.
    pub fn join(&mut self, connection_id: ConnectionId, room_id: RoomId) -> bool {
        let added = self.members.entry(room_id).or_default().insert(connection_id);
        self.joined.entry(connection_id).or_default().insert(room_id);
        added
    }

    /// O(1) check used to authorize sends and gate broadcasts
    pub fn is_member(&self, connection_id: &ConnectionId, room_id: RoomId) -> bool {
        self.members
            .get(&room_id)
            .is_some_and(|set| set.contains(connection_id))
    }

    /// Idempotent remove. Removing a non-member is a no-op.
    pub fn leave(&mut self, connection_id: &ConnectionId, room_id: RoomId) -> bool {
        let removed = match self.members.get_mut(&room_id) {
            Some(set) => {
                let removed = set.remove(connection_id);
                if set.is_empty() {
                    self.members.remove(&room_id);
                }
                removed
            }
            None => false,
        };
        if let Some(rooms) = self.joined.get_mut(connection_id) {
            rooms.remove(&room_id);
            if rooms.is_empty() {
                self.joined.remove(connection_id);
            }
        }
        removed
    }

    /// Remove the connection from every room it was in; returns those rooms
    /// for departure broadcasts. Safe to call for unknown connections.
    pub fn leave_all(&mut self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let rooms: Vec<RoomId> = self
            .joined
            .remove(connection_id)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();
        for room_id in &rooms {
            if let Some(set) = self.members.get_mut(room_id) {
                set.remove(connection_id);
                if set.is_empty() {
                    self.members.remove(room_id);
                }
            }
        }
        rooms
    }

    /// Snapshot of the current member set, for broadcast fan-out
    pub fn members(&self, room_id: RoomId) -> Vec<ConnectionId> {
        self.members
            .get(&room_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn member_count(&self, room_id: RoomId) -> usize {
        self.members.get(&room_id).map_or(0, |set| set.len())
    }
}
