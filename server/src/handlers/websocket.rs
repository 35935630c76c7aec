//! WebSocket handler for cart sync.
//!
//! Handles WebSocket connections and dispatches named cart operations to
//! the fetch/store/reconcile handlers while pushing change notifications
//! to the account's other connections.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::websocket::{ClientMessage, ServerMessage};
use crate::AppState;

use super::{handle_fetch, handle_reconcile, handle_store, ReconcileRequest};

/// Handle an established WebSocket connection.
///
/// This function:
/// 1. Registers the connection with the manager
/// 2. Spawns a task to forward outgoing messages
/// 3. Processes incoming messages in a loop
/// 4. Cleans up on disconnect
pub async fn handle_websocket_connection(socket: WebSocket, state: AppState, account_id: String) {
    // Split the socket into sender and receiver
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Create channel for sending messages to this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Register with connection manager
    let conn_id = state.conn_manager.register(account_id.clone(), tx);

    tracing::info!(
        conn_id = %conn_id,
        account = %account_id,
        "WebSocket client connected"
    );

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if let Err(e) = ws_sender.send(Message::Text(text.into())).await {
                        tracing::warn!("Failed to send WebSocket message: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to serialize WebSocket message: {}", e);
                }
            }
        }
    });

    // Process incoming messages
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let response = process_message(&text, &state, &conn_id, &account_id).await;
                state.conn_manager.send_to_internal(&conn_id, response);
            }
            Ok(Message::Binary(_)) => {
                tracing::warn!("Binary messages not supported");
            }
            Ok(Message::Ping(data)) => {
                // Axum answers with a pong on its own
                tracing::trace!("Received ping: {} bytes", data.len());
            }
            Ok(Message::Pong(_)) => {
                tracing::trace!("Received pong");
            }
            Ok(Message::Close(_)) => {
                tracing::info!(conn_id = %conn_id, "WebSocket close frame received");
                break;
            }
            Err(e) => {
                tracing::warn!(conn_id = %conn_id, "WebSocket error: {}", e);
                break;
            }
        }
    }

    // Clean up
    state.conn_manager.unregister(&conn_id);
    send_task.abort();

    tracing::info!(
        conn_id = %conn_id,
        account = %account_id,
        active_connections = state.conn_manager.connection_count(),
        "WebSocket client disconnected"
    );
}

/// Process a client message and return a server response.
async fn process_message(
    text: &str,
    state: &AppState,
    conn_id: &str,
    account_id: &str,
) -> ServerMessage {
    let client_msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            return ServerMessage::error(format!("Invalid message format: {}", e), None);
        }
    };

    match client_msg {
        ClientMessage::CartFetch { request_id } => match handle_fetch(state, account_id).await {
            Ok(response) => ServerMessage::CartState {
                cart: response.cart,
                updated_at: response.updated_at,
                request_id,
            },
            Err(e) => ServerMessage::error(e.to_string(), request_id),
        },

        ClientMessage::CartStore { cart, request_id } => {
            match handle_store(state, account_id, cart, Some(conn_id)).await {
                Ok(response) => ServerMessage::CartState {
                    cart: response.cart,
                    updated_at: response.updated_at,
                    request_id,
                },
                Err(e) => ServerMessage::error(e.to_string(), request_id),
            }
        }

        ClientMessage::CartReconcile {
            local_cart,
            strategy,
            request_id,
        } => {
            let request = ReconcileRequest {
                local_cart,
                strategy,
            };

            match handle_reconcile(state, account_id, request, Some(conn_id)).await {
                Ok(response) => ServerMessage::ReconcileResult {
                    cart: response.cart,
                    strategy: response.strategy,
                    provenance: response.provenance,
                    fell_back: response.fell_back,
                    request_id,
                },
                Err(e) => ServerMessage::error(e.to_string(), request_id),
            }
        }

        ClientMessage::Ping => ServerMessage::Pong,
    }
}
