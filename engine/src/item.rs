//! Cart line items.

use crate::Quantity;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a purchasable entry (product or product+variant key).
///
/// The storefront uses numeric ids for plain products and string keys for
/// product+variant combinations, so both forms are first-class. They are
/// distinct: `1` and `"1"` never match each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl ItemId {
    /// Extract an id from an untyped JSON value.
    ///
    /// Returns `None` for anything that is not an integer or a string;
    /// such items are treated as id-less and never matched.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(ItemId::Number),
            Value::String(s) => Some(ItemId::Text(s.clone())),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId::Number(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Text(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId::Text(s)
    }
}

/// A single line in a cart.
///
/// Only `id` and `quantity` participate in reconciliation. `name` and every
/// unknown field (price, shipping class, whatever the storefront attaches)
/// are carried through unmodified via `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Identifier, absent on malformed items (tolerated, never matched)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    /// Number of units
    #[serde(default)]
    pub quantity: Quantity,
    /// Display label, not used in merge logic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Opaque fields passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CartItem {
    /// Create an item with an id and quantity.
    pub fn new(id: impl Into<ItemId>, quantity: Quantity) -> Self {
        Self {
            id: Some(id.into()),
            quantity,
            name: None,
            extra: Map::new(),
        }
    }

    /// Create an item without an id.
    pub fn anonymous(quantity: Quantity) -> Self {
        Self {
            id: None,
            quantity,
            name: None,
            extra: Map::new(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach an opaque field.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}
