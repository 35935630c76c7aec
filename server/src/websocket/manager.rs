//! WebSocket connection manager.
//!
//! Tracks active WebSocket connections per account so cart changes made on
//! one device can be pushed to the account's other open sessions.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::ServerMessage;

/// Sender for WebSocket messages.
pub type MessageSender = mpsc::UnboundedSender<ServerMessage>;

/// A single WebSocket connection.
#[derive(Debug)]
pub struct Connection {
    /// Unique identifier for this connection
    pub id: String,
    /// Account the connection belongs to
    pub account_id: String,
    /// Channel to send messages to this connection
    pub sender: MessageSender,
}

/// Manages active WebSocket connections.
///
/// Thread-safe and can be shared across handlers via `Arc`.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    /// All active connections, keyed by connection ID.
    connections: DashMap<String, Connection>,
    /// Index of connections by account for efficient lookup.
    by_account: DashMap<String, Vec<String>>,
}

impl ConnectionManager {
    /// Create a new connection manager.
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            by_account: DashMap::new(),
        }
    }

    /// Create a new connection manager wrapped in Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection.
    ///
    /// Returns the connection ID.
    pub fn register(&self, account_id: String, sender: MessageSender) -> String {
        let conn_id = uuid::Uuid::new_v4().to_string();

        let connection = Connection {
            id: conn_id.clone(),
            account_id: account_id.clone(),
            sender,
        };

        self.connections.insert(conn_id.clone(), connection);

        self.by_account
            .entry(account_id)
            .or_default()
            .push(conn_id.clone());

        tracing::info!(conn_id = %conn_id, "WebSocket connection registered");

        conn_id
    }

    /// Unregister a connection.
    pub fn unregister(&self, conn_id: &str) {
        if let Some((_, conn)) = self.connections.remove(conn_id) {
            if let Some(mut conn_ids) = self.by_account.get_mut(&conn.account_id) {
                conn_ids.retain(|id| id != conn_id);
                // Clean up empty entries
                if conn_ids.is_empty() {
                    drop(conn_ids);
                    self.by_account.remove(&conn.account_id);
                }
            }

            tracing::info!(conn_id = %conn_id, account = %conn.account_id, "WebSocket connection unregistered");
        }
    }

    /// Send a message to every connection of an account except the one that
    /// originated the change (HTTP writes pass `None` and reach them all).
    ///
    /// Returns the number of connections that received the message.
    pub fn notify_account(
        &self,
        account_id: &str,
        except_conn_id: Option<&str>,
        message: ServerMessage,
    ) -> usize {
        let Some(conn_ids) = self.by_account.get(account_id) else {
            return 0;
        };

        let mut sent_count = 0;
        for conn_id in conn_ids.iter() {
            if let Some(conn) = self.connections.get(conn_id) {
                if Some(conn.id.as_str()) == except_conn_id {
                    continue;
                }
                if conn.sender.send(message.clone()).is_ok() {
                    sent_count += 1;
                }
            }
        }

        tracing::debug!(
            account = %account_id,
            recipients = sent_count,
            "Pushed cart change to account connections"
        );

        sent_count
    }

    /// Send a message to a specific connection.
    pub(crate) fn send_to_internal(&self, conn_id: &str, message: ServerMessage) {
        if let Some(conn) = self.connections.get(conn_id) {
            let _ = conn.sender.send(message);
        }
    }

    /// Get the number of active connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get the number of accounts with at least one connection.
    pub fn account_count(&self) -> usize {
        self.by_account.len()
    }
}
