//! Fetch handler - serves the stored cart for an account.

use crate::cache::AccountCart;
use crate::error::Result;
use crate::{db, AppState};
use serde::Serialize;
use trolley_engine::Cart;

use super::now_millis;

/// Response describing the cart stored for an account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartStateResponse {
    /// The stored cart, empty when the account has none
    pub cart: Cart,
    /// When the cart was last persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// Load the cart for an account, through the in-process cache.
pub async fn handle_fetch(state: &AppState, account_id: &str) -> Result<CartStateResponse> {
    let now = now_millis();

    if let Some(cached) = state.cart_cache.get_fresh(account_id, now as u64) {
        return Ok(CartStateResponse {
            cart: cached.cart,
            updated_at: Some(cached.updated_at),
        });
    }

    match db::get_cart(&state.pool, account_id).await? {
        Some(stored) => {
            let cart = stored.to_cart();
            state.cart_cache.put(
                account_id,
                AccountCart {
                    cart: cart.clone(),
                    updated_at: stored.updated_at,
                },
                now as u64,
            );
            Ok(CartStateResponse {
                cart,
                updated_at: Some(stored.updated_at),
            })
        }
        None => Ok(CartStateResponse {
            cart: Cart::new(),
            updated_at: None,
        }),
    }
}
