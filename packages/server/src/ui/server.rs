//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    CheckRoomUseCase, ConnectSessionUseCase, CreateRoomUseCase, DisconnectSessionUseCase,
    JoinRoomUseCase, LeaveRoomUseCase, MemoryStore, SendMessageUseCase,
};

use super::{
    handler::{check_room, create_room, health_check, room_memory, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Chat room server.
///
/// Owns the wired usecases and exposes the HTTP/WebSocket surface.
pub struct Server {
    connect_session_usecase: Arc<ConnectSessionUseCase>,
    join_room_usecase: Arc<JoinRoomUseCase>,
    send_message_usecase: Arc<SendMessageUseCase>,
    leave_room_usecase: Arc<LeaveRoomUseCase>,
    disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    create_room_usecase: Arc<CreateRoomUseCase>,
    check_room_usecase: Arc<CheckRoomUseCase>,
    memory: Arc<MemoryStore>,
}

impl Server {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        connect_session_usecase: Arc<ConnectSessionUseCase>,
        join_room_usecase: Arc<JoinRoomUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
        disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
        create_room_usecase: Arc<CreateRoomUseCase>,
        check_room_usecase: Arc<CheckRoomUseCase>,
        memory: Arc<MemoryStore>,
    ) -> Self {
        Self {
            connect_session_usecase,
            join_room_usecase,
            send_message_usecase,
            leave_room_usecase,
            disconnect_session_usecase,
            create_room_usecase,
            check_room_usecase,
            memory,
        }
    }

    /// Run the chat server on the given host and port.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified
    /// address or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener. Used by `run` and by tests that
    /// bind an ephemeral port first.
    pub async fn serve(
        self,
        listener: tokio::net::TcpListener,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let app_state = Arc::new(AppState {
            connect_session_usecase: self.connect_session_usecase,
            join_room_usecase: self.join_room_usecase,
            send_message_usecase: self.send_message_usecase,
            leave_room_usecase: self.leave_room_usecase,
            disconnect_session_usecase: self.disconnect_session_usecase,
            create_room_usecase: self.create_room_usecase,
            check_room_usecase: self.check_room_usecase,
            memory: self.memory,
        });

        let app = Router::new()
            // WebSocket endpoint
            .route("/ws", get(websocket_handler))
            // HTTP endpoints
            .route("/api/health", get(health_check))
            .route("/api/rooms", post(create_room))
            .route("/api/rooms/{code}", get(check_room))
            .route("/debug/rooms/{room_id}/memory", get(room_memory))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        tracing::info!("Chat server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", listener.local_addr()?);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
