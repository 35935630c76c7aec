//! Reconcile handler - merges a client-held cart with the stored one.
//!
//! The client sends the cart from its browser session together with the
//! strategy the user picked in the reconcile dialog. The stored cart is
//! loaded, the engine combines the two, and the result is persisted and
//! pushed to the account's other connections. Calling this twice with the
//! same inputs persists the same cart, so a double-submitted dialog is
//! harmless.

use crate::cache::AccountCart;
use crate::error::Result;
use crate::websocket::ServerMessage;
use crate::{db, AppState};
use serde::{Deserialize, Serialize};
use trolley_engine::{
    classify_provenance, decode_cart, reconcile, Cart, ItemId, Provenance, ReconcileStrategy,
};

use super::{ensure_cart_size, now_millis};

/// Request body for cart reconciliation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    /// The cart held in the client session
    pub local_cart: Cart,
    /// Chosen strategy; absent means keep the local cart
    #[serde(default)]
    pub strategy: Option<ReconcileStrategy>,
}

/// Provenance of one line of the reconciled cart, for the dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceEntry {
    /// Line id, absent for id-less lines
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    /// Where the line's data came from
    pub provenance: Provenance,
}

/// Response for cart reconciliation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    /// The persisted cart
    pub cart: Cart,
    /// The strategy that was applied
    pub strategy: ReconcileStrategy,
    /// Per-line provenance, present only for merges
    pub provenance: Vec<ProvenanceEntry>,
    /// True when the stored snapshot was unreadable and the local cart was
    /// kept instead of the requested strategy's result
    pub fell_back: bool,
    /// When the result was persisted
    pub updated_at: i64,
}

/// Reconcile the client cart against the stored one and persist the result.
///
/// An unreadable stored snapshot keeps the local cart under every strategy
/// (losing the user's local items is worse than a failed merge); the write
/// below then replaces the bad row.
pub async fn handle_reconcile(
    state: &AppState,
    account_id: &str,
    request: ReconcileRequest,
    origin_conn_id: Option<&str>,
) -> Result<ReconcileResponse> {
    ensure_cart_size(&request.local_cart, state.config.max_cart_lines)?;
    let strategy = request.strategy.unwrap_or_default();
    let now = now_millis();

    let server_snapshot = match db::get_cart(&state.pool, account_id).await? {
        None => Ok(Cart::new()),
        Some(stored) => decode_cart(&stored.items),
    };

    let (result, server_cart, fell_back) = match server_snapshot {
        Ok(server_cart) => {
            let result = reconcile(&request.local_cart, &server_cart, strategy);
            (result, server_cart, false)
        }
        Err(e) => {
            tracing::warn!(
                account = %account_id,
                "Stored cart snapshot is unreadable, keeping the local cart: {}",
                e
            );
            (request.local_cart.clone(), Cart::new(), true)
        }
    };

    let provenance = if fell_back {
        Vec::new()
    } else {
        provenance_entries(&result, &request.local_cart, &server_cart, strategy)
    };

    db::upsert_cart(&state.pool, account_id, &result, now).await?;
    state.cart_cache.put(
        account_id,
        AccountCart {
            cart: result.clone(),
            updated_at: now,
        },
        now as u64,
    );

    let notified = state.conn_manager.notify_account(
        account_id,
        origin_conn_id,
        ServerMessage::cart_changed(result.clone(), now),
    );

    tracing::info!(
        account = %account_id,
        %strategy,
        local_lines = request.local_cart.len(),
        server_lines = server_cart.len(),
        result_lines = result.len(),
        notified,
        "Cart reconciled"
    );

    Ok(ReconcileResponse {
        cart: result,
        strategy,
        provenance,
        fell_back,
        updated_at: now,
    })
}

/// Tag each line of a reconciled cart with its provenance.
///
/// Empty for non-merge strategies, where the result is one snapshot taken
/// wholesale and there is nothing to explain.
pub fn provenance_entries(
    result: &Cart,
    local: &Cart,
    server: &Cart,
    strategy: ReconcileStrategy,
) -> Vec<ProvenanceEntry> {
    result
        .iter()
        .filter_map(|line| {
            classify_provenance(line, local, server, strategy).map(|provenance| ProvenanceEntry {
                id: line.id.clone(),
                provenance,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trolley_engine::CartItem;

    #[test]
    fn provenance_entries_cover_every_merged_line() {
        let local = Cart::from(vec![CartItem::new(1, 2), CartItem::new(2, 3)]);
        let server = Cart::from(vec![CartItem::new(2, 5), CartItem::new(7, 1)]);

        let result = reconcile(&local, &server, ReconcileStrategy::Merge);
        let entries = provenance_entries(&result, &local, &server, ReconcileStrategy::Merge);

        assert_eq!(entries.len(), result.len());
        assert_eq!(
            entries[0],
            ProvenanceEntry {
                id: Some(ItemId::from(2)),
                provenance: Provenance::BothDifferingQuantity { max_quantity: 5 },
            }
        );
        assert_eq!(entries[1].provenance, Provenance::ServerOnly);
        assert_eq!(entries[2].provenance, Provenance::LocalOnly);
    }

    #[test]
    fn provenance_entries_empty_outside_merge() {
        let local = Cart::from(vec![CartItem::new(1, 2)]);
        let server = Cart::from(vec![CartItem::new(1, 5)]);

        for strategy in [
            ReconcileStrategy::KeepLocalDiscardServer,
            ReconcileStrategy::UseServerDiscardLocal,
        ] {
            let result = reconcile(&local, &server, strategy);
            assert!(provenance_entries(&result, &local, &server, strategy).is_empty());
        }
    }

    #[test]
    fn request_strategy_defaults_to_keep_local() {
        let request: ReconcileRequest =
            serde_json::from_str(r#"{"localCart": [{"id": 1, "quantity": 1}]}"#).unwrap();
        assert_eq!(request.strategy, None);
        assert_eq!(
            request.strategy.unwrap_or_default(),
            ReconcileStrategy::KeepLocalDiscardServer
        );
    }

    #[test]
    fn request_rejects_unknown_strategy() {
        let result = serde_json::from_str::<ReconcileRequest>(
            r#"{"localCart": [], "strategy": "deleteServer"}"#,
        );
        assert!(result.is_err());
    }
}
