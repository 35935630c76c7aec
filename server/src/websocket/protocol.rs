//! WebSocket message protocol definitions.
//!
//! All messages are JSON-encoded, tagged by operation name, and use
//! snake_case for field names.

use serde::{Deserialize, Serialize};
use trolley_engine::{Cart, ReconcileStrategy};

use crate::handlers::ProvenanceEntry;

/// Messages sent from client to server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request the cart stored for the account.
    CartFetch {
        /// Request ID for correlating responses
        #[serde(default)]
        request_id: Option<String>,
    },

    /// Replace the stored cart.
    CartStore {
        /// The cart to persist
        cart: Cart,
        /// Request ID for correlating responses
        #[serde(default)]
        request_id: Option<String>,
    },

    /// Reconcile a local cart against the stored one and persist the result.
    CartReconcile {
        /// The cart held in the client session
        local_cart: Cart,
        /// Chosen strategy; absent means keep the local cart
        #[serde(default)]
        strategy: Option<ReconcileStrategy>,
        /// Request ID for correlating responses
        #[serde(default)]
        request_id: Option<String>,
    },

    /// Keep-alive ping.
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The cart currently stored for the account.
    CartState {
        /// Stored cart (empty when the account has none)
        cart: Cart,
        /// When the cart was last persisted, if it exists
        #[serde(skip_serializing_if = "Option::is_none")]
        updated_at: Option<i64>,
        /// Request ID from the original request
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },

    /// Result of a reconcile request.
    ReconcileResult {
        /// The persisted cart
        cart: Cart,
        /// The strategy that was applied
        strategy: ReconcileStrategy,
        /// Per-line provenance, present only for merges
        provenance: Vec<ProvenanceEntry>,
        /// True when the stored snapshot was unreadable and the local cart
        /// was kept
        fell_back: bool,
        /// Request ID from the original request
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },

    /// Push notification when another device changed the cart.
    CartChanged {
        /// The new cart
        cart: Cart,
        /// When the change was persisted
        updated_at: i64,
    },

    /// Response to ping.
    Pong,

    /// Error message.
    Error {
        /// Error description
        message: String,
        /// Request ID from the original request (if applicable)
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
}

impl ServerMessage {
    /// Create an error message.
    pub fn error(message: impl Into<String>, request_id: Option<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
            request_id,
        }
    }

    /// Create a cart_changed push notification.
    pub fn cart_changed(cart: Cart, updated_at: i64) -> Self {
        ServerMessage::CartChanged { cart, updated_at }
    }
}
