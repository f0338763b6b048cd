//! UseCase: connection establishment.
//!
//! Verifies the presented credential, records the connection → identity
//! mapping, and registers the outbound channel. A connection that fails
//! verification never reaches the registry.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionRegistry, EventPusher, PusherChannel, TokenVerifier, UserId,
};

use super::error::ConnectError;

pub struct ConnectSessionUseCase {
    verifier: Arc<dyn TokenVerifier>,
    registry: Arc<Mutex<ConnectionRegistry>>,
    pusher: Arc<dyn EventPusher>,
}

impl ConnectSessionUseCase {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        registry: Arc<Mutex<ConnectionRegistry>>,
        pusher: Arc<dyn EventPusher>,
    ) -> Self {
        Self {
            verifier,
            registry,
            pusher,
        }
    }

    /// Authenticate a new connection and admit it to the registry.
    ///
    /// Returns the generated connection handle and the verified identity.
    pub async fn execute(
        &self,
        credential: Option<&str>,
        sender: PusherChannel,
    ) -> Result<(ConnectionId, UserId), ConnectError> {
        let user_id = self.verifier.verify(credential)?;

        let connection_id = ConnectionId::generate();
        self.registry
            .lock()
            .await
            .register(connection_id, user_id)?;
        self.pusher.register(connection_id, sender).await;

        Ok((connection_id, user_id))
    }
}
