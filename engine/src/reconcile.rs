//! Cart reconciliation.
//!
//! Given two cart snapshots (local, server) and a user-selected strategy,
//! this module produces a single resulting cart deterministically.
//!
//! # Merge algorithm
//!
//! 1. Index the local cart by id, later lines shadowing earlier ones
//! 2. Walk the server cart in order; a line whose id is also local keeps
//!    all server fields but takes `max(server, local)` as its quantity
//! 3. Append local-only lines afterwards, preserving their local order
//!
//! The output order (server-origin lines first, then local-only lines) is
//! an observable contract of the storefront, not incidental. Lines without
//! an id are never matched and pass through at their position. Duplicate
//! ids within one snapshot collapse to their canonical last-seen entry,
//! emitted at the first occurrence's position.

use crate::{Cart, CartItem, ItemId, Quantity, ReconcileStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where a merged line's data originated. Display only, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Provenance {
    /// Present only in the local cart
    LocalOnly,
    /// Present only in the server cart
    ServerOnly,
    /// Present in both carts with equal quantity
    Both,
    /// Present in both carts with differing quantities
    #[serde(rename_all = "camelCase")]
    BothDifferingQuantity {
        /// The quantity the merge keeps
        max_quantity: Quantity,
    },
}

/// Combine two cart snapshots according to a strategy.
///
/// Pure over its inputs: neither cart is mutated and the result holds fresh
/// copies. Both carts may be empty; callers treat an absent snapshot as an
/// empty sequence.
pub fn reconcile(local: &Cart, server: &Cart, strategy: ReconcileStrategy) -> Cart {
    match strategy {
        ReconcileStrategy::KeepLocalDiscardServer => local.clone(),
        ReconcileStrategy::UseServerDiscardLocal => server.clone(),
        ReconcileStrategy::Merge => merge(local, server),
    }
}

fn merge(local: &Cart, server: &Cart) -> Cart {
    let local_index = local.index_by_id();
    let server_index = server.index_by_id();
    let mut taken: HashSet<&ItemId> = HashSet::new();
    let mut result = Cart::new();

    for line in server.iter() {
        let Some(id) = line.id.as_ref() else {
            result.push(line.clone());
            continue;
        };
        if !taken.insert(id) {
            continue;
        }
        // Canonical server line for this id (last-seen shadows earlier dupes)
        let canonical = server_index[id];
        let mut merged = canonical.clone();
        if let Some(local_line) = local_index.get(id) {
            merged.quantity = canonical.quantity.max(local_line.quantity);
        }
        result.push(merged);
    }

    for line in local.iter() {
        let Some(id) = line.id.as_ref() else {
            result.push(line.clone());
            continue;
        };
        if taken.insert(id) {
            result.push(local_index[id].clone());
        }
    }

    result
}

/// Classify where a line's data came from, for display next to the merge
/// prompt.
///
/// Returns `None` unless the strategy is [`ReconcileStrategy::Merge`] (the
/// other strategies take one cart wholesale, so there is nothing to show),
/// and `None` when the line appears in neither snapshot. Id-less lines are
/// classified by whole-line equality since they can never match by id.
pub fn classify_provenance(
    item: &CartItem,
    local: &Cart,
    server: &Cart,
    strategy: ReconcileStrategy,
) -> Option<Provenance> {
    if strategy != ReconcileStrategy::Merge {
        return None;
    }

    let Some(id) = item.id.as_ref() else {
        if local.iter().any(|line| line == item) {
            return Some(Provenance::LocalOnly);
        }
        if server.iter().any(|line| line == item) {
            return Some(Provenance::ServerOnly);
        }
        return None;
    };

    match (local.quantity_of(id), server.quantity_of(id)) {
        (Some(local_qty), Some(server_qty)) if local_qty == server_qty => Some(Provenance::Both),
        (Some(local_qty), Some(server_qty)) => Some(Provenance::BothDifferingQuantity {
            max_quantity: local_qty.max(server_qty),
        }),
        (Some(_), None) => Some(Provenance::LocalOnly),
        (None, Some(_)) => Some(Provenance::ServerOnly),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: i64, quantity: Quantity) -> CartItem {
        CartItem::new(id, quantity)
    }

    fn cart(items: Vec<CartItem>) -> Cart {
        Cart::from(items)
    }

    #[test]
    fn keep_local_returns_local_unchanged() {
        let local = cart(vec![item(1, 2), item(2, 1)]);
        let server = cart(vec![item(3, 9)]);

        let result = reconcile(&local, &server, ReconcileStrategy::KeepLocalDiscardServer);
        assert_eq!(result, local);
    }

    #[test]
    fn use_server_returns_server_unchanged() {
        let local = cart(vec![item(9, 1)]);
        let server = Cart::new();

        let result = reconcile(&local, &server, ReconcileStrategy::UseServerDiscardLocal);
        assert!(result.is_empty());
    }

    #[test]
    fn merge_takes_max_quantity() {
        let local = cart(vec![item(1, 2).with_name("A")]);
        let server = cart(vec![item(1, 5).with_name("A")]);

        let result = reconcile(&local, &server, ReconcileStrategy::Merge);
        assert_eq!(result, cart(vec![item(1, 5).with_name("A")]));
    }

    #[test]
    fn merge_orders_server_lines_before_local_only() {
        let local = cart(vec![item(1, 2), item(2, 1)]);
        let server = cart(vec![item(2, 3)]);

        let result = reconcile(&local, &server, ReconcileStrategy::Merge);
        assert_eq!(result, cart(vec![item(2, 3), item(1, 2)]));
    }

    #[test]
    fn merge_resolves_duplicate_local_ids_last_wins() {
        let local = cart(vec![item(1, 1), item(1, 4)]);
        let server = cart(vec![item(1, 2)]);

        let result = reconcile(&local, &server, ReconcileStrategy::Merge);
        assert_eq!(result, cart(vec![item(1, 4)]));
    }

    #[test]
    fn merge_resolves_duplicate_server_ids_last_wins() {
        let local = cart(vec![item(1, 1)]);
        let server = cart(vec![item(1, 2).with_name("old"), item(1, 3).with_name("new")]);

        let result = reconcile(&local, &server, ReconcileStrategy::Merge);
        assert_eq!(result.len(), 1);
        let line = result.get(&ItemId::from(1)).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.name.as_deref(), Some("new"));
    }

    #[test]
    fn merge_against_empty_server_yields_local() {
        let local = cart(vec![item(1, 2), item(2, 1)]);
        let result = reconcile(&local, &Cart::new(), ReconcileStrategy::Merge);
        assert_eq!(result, local);
    }

    #[test]
    fn merge_against_empty_local_yields_server() {
        let server = cart(vec![item(5, 1), item(6, 2)]);
        let result = reconcile(&Cart::new(), &server, ReconcileStrategy::Merge);
        assert_eq!(result, server);
    }

    #[test]
    fn merge_keeps_server_fields_on_matched_lines() {
        let local = cart(vec![item(1, 7)
            .with_name("Local label")
            .with_extra("price", json!(1.0))]);
        let server = cart(vec![item(1, 3)
            .with_name("Server label")
            .with_extra("price", json!(2.5))
            .with_extra("shippingClass", json!("bulky"))]);

        let result = reconcile(&local, &server, ReconcileStrategy::Merge);
        let line = result.get(&ItemId::from(1)).unwrap();

        // Server fields win; only the quantity comes from whichever is larger
        assert_eq!(line.quantity, 7);
        assert_eq!(line.name.as_deref(), Some("Server label"));
        assert_eq!(line.extra["price"], json!(2.5));
        assert_eq!(line.extra["shippingClass"], json!("bulky"));
    }

    #[test]
    fn merge_passes_idless_lines_through() {
        let local = cart(vec![CartItem::anonymous(2), item(1, 1)]);
        let server = cart(vec![CartItem::anonymous(5)]);

        let result = reconcile(&local, &server, ReconcileStrategy::Merge);
        // Server pass emits its id-less line, local pass emits the rest
        assert_eq!(
            result,
            cart(vec![CartItem::anonymous(5), CartItem::anonymous(2), item(1, 1)])
        );
    }

    #[test]
    fn merge_does_not_match_number_against_text_id() {
        let local = cart(vec![CartItem::new(1, 2)]);
        let server = cart(vec![CartItem::new("1", 5)]);

        let result = reconcile(&local, &server, ReconcileStrategy::Merge);
        assert_eq!(result.len(), 2);
        assert_eq!(result.quantity_of(&ItemId::from("1")), Some(5));
        assert_eq!(result.quantity_of(&ItemId::from(1)), Some(2));
    }

    #[test]
    fn merge_is_idempotent() {
        let local = cart(vec![item(1, 2), item(2, 1), item(1, 4)]);
        let server = cart(vec![item(2, 3), item(5, 1)]);

        let merged = reconcile(&local, &server, ReconcileStrategy::Merge);
        let again = reconcile(&merged, &merged, ReconcileStrategy::Merge);
        assert_eq!(merged, again);
    }

    #[test]
    fn merge_cardinality_is_distinct_id_union() {
        let local = cart(vec![item(1, 1), item(1, 4), item(2, 1), CartItem::anonymous(1)]);
        let server = cart(vec![item(2, 3), item(3, 1)]);

        let result = reconcile(&local, &server, ReconcileStrategy::Merge);
        // Distinct ids 1, 2, 3 plus one id-less line
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn inputs_are_not_mutated() {
        let local = cart(vec![item(1, 2)]);
        let server = cart(vec![item(1, 5)]);
        let local_before = local.clone();
        let server_before = server.clone();

        let _ = reconcile(&local, &server, ReconcileStrategy::Merge);
        assert_eq!(local, local_before);
        assert_eq!(server, server_before);
    }

    #[test]
    fn provenance_none_outside_merge() {
        let local = cart(vec![item(1, 2)]);
        let server = cart(vec![item(1, 5)]);

        for strategy in [
            ReconcileStrategy::KeepLocalDiscardServer,
            ReconcileStrategy::UseServerDiscardLocal,
        ] {
            assert_eq!(
                classify_provenance(&item(1, 2), &local, &server, strategy),
                None
            );
        }
    }

    #[test]
    fn provenance_classifies_by_id() {
        let local = cart(vec![item(1, 2), item(2, 3)]);
        let server = cart(vec![item(2, 3), item(3, 1), item(4, 9)]);
        let strategy = ReconcileStrategy::Merge;

        assert_eq!(
            classify_provenance(&item(1, 2), &local, &server, strategy),
            Some(Provenance::LocalOnly)
        );
        assert_eq!(
            classify_provenance(&item(2, 3), &local, &server, strategy),
            Some(Provenance::Both)
        );
        assert_eq!(
            classify_provenance(&item(3, 1), &local, &server, strategy),
            Some(Provenance::ServerOnly)
        );
        assert_eq!(
            classify_provenance(&item(99, 1), &local, &server, strategy),
            None
        );
    }

    #[test]
    fn provenance_reports_max_on_differing_quantity() {
        let local = cart(vec![item(1, 7)]);
        let server = cart(vec![item(1, 3)]);

        assert_eq!(
            classify_provenance(&item(1, 7), &local, &server, ReconcileStrategy::Merge),
            Some(Provenance::BothDifferingQuantity { max_quantity: 7 })
        );
    }

    #[test]
    fn provenance_for_idless_lines_uses_equality() {
        let local_line = CartItem::anonymous(2).with_name("sample");
        let server_line = CartItem::anonymous(9);
        let local = cart(vec![local_line.clone()]);
        let server = cart(vec![server_line.clone()]);
        let strategy = ReconcileStrategy::Merge;

        assert_eq!(
            classify_provenance(&local_line, &local, &server, strategy),
            Some(Provenance::LocalOnly)
        );
        assert_eq!(
            classify_provenance(&server_line, &local, &server, strategy),
            Some(Provenance::ServerOnly)
        );
        assert_eq!(
            classify_provenance(&CartItem::anonymous(1), &local, &server, strategy),
            None
        );
    }

    #[test]
    fn provenance_serialization() {
        let json =
            serde_json::to_string(&Provenance::BothDifferingQuantity { max_quantity: 5 }).unwrap();
        assert_eq!(json, r#"{"kind":"bothDifferingQuantity","maxQuantity":5}"#);

        let json = serde_json::to_string(&Provenance::LocalOnly).unwrap();
        assert_eq!(json, r#"{"kind":"localOnly"}"#);
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_item() -> impl Strategy<Value = CartItem> {
            (0i64..8, 0u64..50, proptest::option::of("[a-z]{1,6}")).prop_map(
                |(id, quantity, name)| {
                    let mut line = CartItem::new(id, quantity);
                    line.name = name;
                    line
                },
            )
        }

        fn arb_cart() -> impl Strategy<Value = Cart> {
            proptest::collection::vec(arb_item(), 0..12).prop_map(Cart::from)
        }

        fn distinct_ids(cart: &Cart) -> std::collections::HashSet<ItemId> {
            cart.iter().filter_map(|line| line.id.clone()).collect()
        }

        proptest! {
            #[test]
            fn prop_merge_deterministic(local in arb_cart(), server in arb_cart()) {
                let first = reconcile(&local, &server, ReconcileStrategy::Merge);
                let second = reconcile(&local, &server, ReconcileStrategy::Merge);
                prop_assert_eq!(first, second);
            }

            #[test]
            fn prop_merge_with_self_is_identity_on_quantities(cart in arb_cart()) {
                let merged = reconcile(&cart, &cart, ReconcileStrategy::Merge);
                let again = reconcile(&merged, &merged, ReconcileStrategy::Merge);
                prop_assert_eq!(merged, again);
            }

            #[test]
            fn prop_quantity_selection_commutes(local in arb_cart(), server in arb_cart()) {
                // Swapping which snapshot is local vs server never changes the
                // merged quantity for an id present in both
                let forward = reconcile(&local, &server, ReconcileStrategy::Merge);
                let backward = reconcile(&server, &local, ReconcileStrategy::Merge);

                for id in distinct_ids(&local).intersection(&distinct_ids(&server)) {
                    prop_assert_eq!(forward.quantity_of(id), backward.quantity_of(id));
                }
            }

            #[test]
            fn prop_no_line_duplicated_or_dropped(local in arb_cart(), server in arb_cart()) {
                let result = reconcile(&local, &server, ReconcileStrategy::Merge);

                let union: std::collections::HashSet<_> = distinct_ids(&local)
                    .union(&distinct_ids(&server))
                    .cloned()
                    .collect();
                let idless = local.iter().chain(server.iter())
                    .filter(|line| line.id.is_none())
                    .count();

                prop_assert_eq!(result.len(), union.len() + idless);
                prop_assert_eq!(distinct_ids(&result).len(), union.len());
            }

            #[test]
            fn prop_merged_quantity_is_max(local in arb_cart(), server in arb_cart()) {
                let result = reconcile(&local, &server, ReconcileStrategy::Merge);

                for line in result.iter() {
                    let Some(id) = line.id.as_ref() else { continue };
                    let expected = local
                        .quantity_of(id)
                        .into_iter()
                        .chain(server.quantity_of(id))
                        .max();
                    prop_assert_eq!(Some(line.quantity), expected);
                }
            }

            #[test]
            fn prop_merge_empty_server_reorders_to_local(local in arb_cart()) {
                let result = reconcile(&local, &Cart::new(), ReconcileStrategy::Merge);
                // No server lines precede, so local-only lines keep local order
                let expected_ids: Vec<_> = {
                    let mut seen = std::collections::HashSet::new();
                    local
                        .iter()
                        .filter_map(|line| line.id.clone())
                        .filter(|id| seen.insert(id.clone()))
                        .collect()
                };
                let result_ids: Vec<_> = result.iter().filter_map(|l| l.id.clone()).collect();
                prop_assert_eq!(result_ids, expected_ids);
            }
        }
    }
}
