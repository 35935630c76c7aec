//! Untyped cart snapshots.
//!
//! Carts arrive from two places the engine does not control: browser-held
//! local state and the backend response payload. Both are decoded here from
//! raw JSON with a defined tolerance for malformed lines, and the fail-open
//! entry point [`reconcile_snapshots`] realizes the storefront's recovery
//! policy: a server snapshot that cannot be decoded keeps the local cart
//! instead of surfacing a hard failure.

use crate::{reconcile, Cart, CartItem, Error, ItemId, ReconcileStrategy, Result};
use serde_json::{Map, Value};

/// Result of reconciling untyped snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotOutcome {
    /// The cart to persist
    pub cart: Cart,
    /// True when the server snapshot was unusable and the local cart was
    /// kept instead of the requested strategy's result
    pub fell_back: bool,
}

/// Decode a cart from an untyped JSON value.
///
/// `null` decodes as an empty cart. Anything other than an array of objects
/// is rejected. Within a line object the tolerance rules apply: a missing or
/// unusable `id` yields an id-less line (kept, never matched), a missing or
/// non-integer `quantity` clamps to 0, and every other field is preserved
/// verbatim.
pub fn decode_cart(value: &Value) -> Result<Cart> {
    let lines = match value {
        Value::Null => return Ok(Cart::new()),
        Value::Array(lines) => lines,
        other => {
            return Err(Error::MalformedSnapshot(format!(
                "expected an array of items, got {}",
                json_type_name(other)
            )))
        }
    };

    let mut cart = Cart::new();
    for line in lines {
        match line {
            Value::Object(fields) => cart.push(decode_item(fields)),
            other => {
                return Err(Error::MalformedSnapshot(format!(
                    "expected an item object, got {}",
                    json_type_name(other)
                )))
            }
        }
    }
    Ok(cart)
}

fn decode_item(fields: &Map<String, Value>) -> CartItem {
    let id = fields.get("id").and_then(ItemId::from_value);
    let quantity = fields.get("quantity").and_then(Value::as_u64).unwrap_or(0);
    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string);
    let extra: Map<String, Value> = fields
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "id" | "quantity" | "name"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    CartItem {
        id,
        quantity,
        name,
        extra,
    }
}

/// Reconcile two untyped snapshots, failing open to local state.
///
/// An absent snapshot is an empty cart. A local snapshot that cannot be
/// decoded becomes empty. A *server* snapshot that cannot be decoded keeps
/// the local cart untouched and flags the outcome, because losing the
/// user's local items is worse than a failed merge; callers report the flag
/// through their own telemetry.
pub fn reconcile_snapshots(
    local: Option<&Value>,
    server: Option<&Value>,
    strategy: ReconcileStrategy,
) -> SnapshotOutcome {
    let local_cart = local
        .map(|value| decode_cart(value).unwrap_or_default())
        .unwrap_or_default();

    let server_cart = match server {
        None => Ok(Cart::new()),
        Some(value) => decode_cart(value),
    };

    match server_cart {
        Ok(server_cart) => SnapshotOutcome {
            cart: reconcile(&local_cart, &server_cart, strategy),
            fell_back: false,
        },
        Err(_) => SnapshotOutcome {
            cart: local_cart,
            fell_back: true,
        },
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
