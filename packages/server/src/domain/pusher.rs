//! Event delivery interface.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::PushError;
use super::value_object::ConnectionId;

/// Per-connection outbound channel. The WebSocket write half drains it.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Pushes serialized events to live connections.
///
/// Delivery is best-effort: a closed or missing connection is reported, not
/// fatal, and never interrupts delivery to the remaining targets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPusher: Send + Sync {
    /// Associate a connection with its outbound channel
    async fn register(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Drop a connection's channel. Idempotent.
    async fn unregister(&self, connection_id: &ConnectionId);

    /// Send to a single connection
    async fn push_to(&self, connection_id: &ConnectionId, content: &str)
    -> Result<(), PushError>;

    /// Send to every target connection. Dead targets are skipped.
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), PushError>;
}
