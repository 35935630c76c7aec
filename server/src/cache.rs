//! In-process cache of account carts.
//!
//! Fetches go through this cache before hitting Postgres. Entries carry
//! their storage time and expire through the engine's pure predicate, so
//! freshness rules live in one place and the tests need no real clock.

use dashmap::DashMap;
use trolley_engine::{Cached, Cart, Timestamp};

/// A cart with the time it was last persisted.
#[derive(Debug, Clone)]
pub struct AccountCart {
    pub cart: Cart,
    pub updated_at: i64,
}

/// Thread-safe cart cache keyed by account id.
#[derive(Debug)]
pub struct CartCache {
    entries: DashMap<String, Cached<AccountCart>>,
    ttl_ms: u64,
}

impl CartCache {
    /// Create a cache whose entries stay fresh for `ttl_ms`.
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_ms,
        }
    }

    /// Get the cached cart for an account unless the entry has expired.
    pub fn get_fresh(&self, account_id: &str, now: Timestamp) -> Option<AccountCart> {
        let entry = self.entries.get(account_id)?;
        entry.fresh(now, self.ttl_ms).cloned()
    }

    /// Cache the cart for an account.
    pub fn put(&self, account_id: &str, value: AccountCart, now: Timestamp) {
        self.entries
            .insert(account_id.to_string(), Cached::new(value, now));
    }

    /// Drop the cached cart for an account.
    pub fn invalidate(&self, account_id: &str) {
        self.entries.remove(account_id);
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self, now: Timestamp) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !entry.is_expired(now, self.ttl_ms));
        before - self.entries.len()
    }

    /// Number of cached accounts, fresh or not.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
