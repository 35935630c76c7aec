//! # Trolley Engine
//!
//! The deterministic cart reconciliation core of the Trolley storefront.
//!
//! When a signed-in user has both a cart in their browser session and a cart
//! persisted against their account, the two snapshots must become one. This
//! crate owns that decision: given both carts and a user-selected strategy it
//! produces the resulting cart, plus a per-line provenance tag the checkout
//! dialog uses to explain where each line came from.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of the network, storage, or DOM
//! - **Deterministic**: same inputs always produce the same output cart
//! - **Never lose local state**: an unusable server snapshot keeps the
//!   user's local cart instead of failing the merge
//!
//! ## Core Concepts
//!
//! ### Carts and items
//!
//! A [`Cart`] is an ordered sequence of [`CartItem`]s. Only `id` and
//! `quantity` participate in reconciliation; display labels and any opaque
//! storefront fields (price, shipping class) are carried through unchanged.
//! Duplicate ids within a snapshot resolve to the last-seen entry.
//!
//! ### Strategies
//!
//! [`ReconcileStrategy`] names the three user choices: keep the local cart,
//! take the server cart, or merge. A merge keeps server fields for lines
//! present in both carts and takes the larger quantity; local-only lines
//! follow the server-origin lines in the output.
//!
//! ### Provenance
//!
//! [`classify_provenance`] tags a line for display: local only, server only,
//! in both, or in both with differing quantities. It is never authoritative
//! for persistence.
//!
//! ### Snapshots
//!
//! The [`snapshot`] module decodes carts from untyped JSON with a defined
//! tolerance for malformed lines, and [`reconcile_snapshots`] applies the
//! fail-open recovery policy at that boundary.
//!
//! ### Caches
//!
//! [`Cached`] pairs a value with its storage time and an explicit, pure
//! expiry predicate; the caller owns the surrounding map and the clock.
//! [`ImageCache`] tracks the best-fetched tier per product picture for
//! progressive thumbnail, medium, large loading.
//!
//! ## Quick Start
//!
//! ```rust
//! use trolley_engine::{reconcile, Cart, CartItem, ReconcileStrategy};
//!
//! let local = Cart::from(vec![
//!     CartItem::new(1, 2).with_name("Clay pebbles 10L"),
//!     CartItem::new(2, 1).with_name("pH down"),
//! ]);
//! let server = Cart::from(vec![
//!     CartItem::new(2, 3).with_name("pH down"),
//! ]);
//!
//! let result = reconcile(&local, &server, ReconcileStrategy::Merge);
//!
//! // Server-origin lines first, then local-only lines in local order
//! let quantities: Vec<_> = result.iter().map(|line| line.quantity).collect();
//! assert_eq!(quantities, vec![3, 2]);
//! ```

pub mod cache;
pub mod cart;
pub mod error;
pub mod item;
pub mod media;
pub mod reconcile;
pub mod snapshot;
pub mod strategy;

// Re-export main types at crate root
pub use cache::Cached;
pub use cart::Cart;
pub use error::Error;
pub use item::{CartItem, ItemId};
pub use media::{ImageCache, ImageTier};
pub use reconcile::{classify_provenance, reconcile, Provenance};
pub use snapshot::{decode_cart, reconcile_snapshots, SnapshotOutcome};
pub use strategy::ReconcileStrategy;

pub(crate) use error::Result;

/// Type aliases for clarity
pub type Quantity = u64;
pub type Timestamp = u64;
