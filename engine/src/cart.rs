//! Cart snapshots.

use crate::{CartItem, ItemId, Quantity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An ordered sequence of cart items.
///
/// Item order is part of the contract: reconciliation output order is
/// observable by the storefront. Duplicate ids within a snapshot are
/// tolerated; the last-seen entry for an id is canonical, matching
/// lookup-by-id semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines in the cart, duplicates included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a line.
    pub fn push(&mut self, item: CartItem) {
        self.items.push(item);
    }

    /// Iterate lines in order.
    pub fn iter(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter()
    }

    /// Borrow the lines as a slice.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consume the cart and return its lines.
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Look up a line by id. Later entries shadow earlier ones.
    pub fn get(&self, id: &ItemId) -> Option<&CartItem> {
        self.items
            .iter()
            .rev()
            .find(|item| item.id.as_ref() == Some(id))
    }

    /// Quantity for an id, if present.
    pub fn quantity_of(&self, id: &ItemId) -> Option<Quantity> {
        self.get(id).map(|item| item.quantity)
    }

    /// Build an id lookup with last-write-wins for duplicate ids.
    /// Id-less lines are not indexed.
    pub fn index_by_id(&self) -> HashMap<&ItemId, &CartItem> {
        let mut index = HashMap::with_capacity(self.items.len());
        for item in &self.items {
            if let Some(id) = item.id.as_ref() {
                index.insert(id, item);
            }
        }
        index
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        Self { items }
    }
}

impl FromIterator<CartItem> for Cart {
    fn from_iter<I: IntoIterator<Item = CartItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Cart {
    type Item = CartItem;
    type IntoIter = std::vec::IntoIter<CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
