//! WebSocket connection handlers.
//!
//! Authentication happens before the upgrade: a connection with a missing
//! or invalid token never becomes a socket, and never touches the
//! registry. After the upgrade, every inbound frame is decoded once into a
//! typed event and dispatched behind a per-event fault boundary: a failed
//! event sends an `error` payload back to this connection only and leaves
//! the socket open.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::domain::ConnectionId;
use crate::infrastructure::dto::websocket::{ClientEvent, ServerEvent};
use crate::usecase::{ConnectError, EventError};

use super::super::state::{AppState, ConnectQuery};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Create a channel for this client to receive messages
    let (tx, rx) = mpsc::unbounded_channel();
    let err_tx = tx.clone();

    match state
        .connect_session_usecase
        .execute(query.token.as_deref(), tx)
        .await
    {
        Ok((connection_id, user_id)) => {
            tracing::info!(
                "Connection {} authenticated as user {}",
                connection_id,
                user_id
            );
            Ok(ws.on_upgrade(move |socket| {
                handle_socket(socket, state, connection_id, rx, err_tx)
            }))
        }
        Err(ConnectError::Rejected(rejection)) => {
            tracing::warn!("Connection rejected: {}", rejection);
            Err(StatusCode::UNAUTHORIZED)
        }
        Err(ConnectError::Registry(e)) => {
            tracing::error!("Connection registration failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Spawns a task that drains the connection's channel into the WebSocket
/// sender.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    connection_id: ConnectionId,
    rx: mpsc::UnboundedReceiver<String>,
    err_tx: mpsc::UnboundedSender<String>,
) {
    let (sender, mut receiver) = socket.split();

    let mut send_task = pusher_loop(rx, sender);

    let state_clone = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let event = match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!(
                                "Ignoring undecodable event from {}: {}",
                                connection_id,
                                e
                            );
                            continue;
                        }
                    };

                    if let Err(e) = dispatch(&state_clone, connection_id, event).await {
                        let error = ServerEvent::Error {
                            message: e.to_string(),
                        };
                        if err_tx.send(error.to_json()).is_err() {
                            break;
                        }
                    }
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection {} requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let rooms = state.disconnect_session_usecase.execute(connection_id).await;
    tracing::info!(
        "Connection {} disconnected, left {} room(s)",
        connection_id,
        rooms.len()
    );
}

async fn dispatch(
    state: &AppState,
    connection_id: ConnectionId,
    event: ClientEvent,
) -> Result<(), EventError> {
    match event {
        ClientEvent::JoinRoom { room_code } => {
            state
                .join_room_usecase
                .execute(connection_id, &room_code)
                .await?;
            Ok(())
        }
        ClientEvent::SendMessage { room_code, message } => {
            state
                .send_message_usecase
                .execute(connection_id, &room_code, message)
                .await
        }
        ClientEvent::LeaveRoom { room_code } => {
            state
                .leave_room_usecase
                .execute(connection_id, &room_code)
                .await
        }
    }
}
