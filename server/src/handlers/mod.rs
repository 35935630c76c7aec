//! Request handlers for cart operations.

mod fetch;
mod reconcile;
mod store;
mod websocket;

pub use fetch::*;
pub use reconcile::*;
pub use store::*;
pub use websocket::*;

use crate::error::{AppError, Result};
use trolley_engine::Cart;

/// Current wall clock in milliseconds since epoch, the timestamp unit the
/// engine and the carts table share.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Reject cart payloads over the configured line limit before they reach
/// the engine or the database.
pub(crate) fn ensure_cart_size(cart: &Cart, max_lines: usize) -> Result<()> {
    if cart.len() > max_lines {
        return Err(AppError::CartTooLarge {
            lines: cart.len(),
            max: max_lines,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trolley_engine::CartItem;

    #[test]
    fn cart_size_guard() {
        let cart = Cart::from(vec![CartItem::new(1, 1), CartItem::new(2, 1)]);
        assert!(ensure_cart_size(&cart, 2).is_ok());

        let err = ensure_cart_size(&cart, 1).unwrap_err();
        assert_eq!(err.to_string(), "cart has 2 lines, limit is 1");
    }

    #[test]
    fn empty_cart_always_passes_the_guard() {
        assert!(ensure_cart_size(&Cart::new(), 0).is_ok());
    }
}
