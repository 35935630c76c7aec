//! Store handler - replaces the cart persisted for an account.

use crate::cache::AccountCart;
use crate::error::Result;
use crate::websocket::ServerMessage;
use crate::{db, AppState};
use serde::Deserialize;
use trolley_engine::Cart;

use super::{ensure_cart_size, now_millis, CartStateResponse};

/// Request body for storing a cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCartRequest {
    /// The cart to persist
    pub cart: Cart,
}

/// Persist a cart and push the change to the account's other connections.
///
/// `origin_conn_id` names the WebSocket connection that made the change so
/// it is not echoed back; HTTP writes pass `None`.
pub async fn handle_store(
    state: &AppState,
    account_id: &str,
    cart: Cart,
    origin_conn_id: Option<&str>,
) -> Result<CartStateResponse> {
    ensure_cart_size(&cart, state.config.max_cart_lines)?;
    let now = now_millis();

    db::upsert_cart(&state.pool, account_id, &cart, now).await?;

    state.cart_cache.put(
        account_id,
        AccountCart {
            cart: cart.clone(),
            updated_at: now,
        },
        now as u64,
    );

    let notified = state.conn_manager.notify_account(
        account_id,
        origin_conn_id,
        ServerMessage::cart_changed(cart.clone(), now),
    );

    tracing::debug!(
        account = %account_id,
        lines = cart.len(),
        notified,
        "Cart stored"
    );

    Ok(CartStateResponse {
        cart,
        updated_at: Some(now),
    })
}

/// Delete the cart persisted for an account.
pub async fn handle_clear(
    state: &AppState,
    account_id: &str,
    origin_conn_id: Option<&str>,
) -> Result<CartStateResponse> {
    let now = now_millis();

    let existed = db::delete_cart(&state.pool, account_id).await?;
    state.cart_cache.invalidate(account_id);

    if existed {
        state.conn_manager.notify_account(
            account_id,
            origin_conn_id,
            ServerMessage::cart_changed(Cart::new(), now),
        );
    }

    tracing::debug!(account = %account_id, existed, "Cart cleared");

    Ok(CartStateResponse {
        cart: Cart::new(),
        updated_at: existed.then_some(now),
    })
}
