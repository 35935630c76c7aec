//! Timestamped cache entries with an explicit expiry predicate.
//!
//! The storefront previously kept cross-request caches in ambient mutable
//! storage with manual timestamp checks scattered around. Here the entry
//! and its expiry rule are one explicit, pure abstraction: the caller owns
//! the mapping (any map type works) and supplies `now`, so expiry is
//! deterministic and testable without a real clock.

use crate::Timestamp;
use serde::{Deserialize, Serialize};

/// A cached value with the time it was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cached<T> {
    /// The cached value
    pub value: T,
    /// When the value was stored (milliseconds since epoch)
    pub stored_at: Timestamp,
}

impl<T> Cached<T> {
    /// Wrap a value with its storage time.
    pub fn new(value: T, stored_at: Timestamp) -> Self {
        Self { value, stored_at }
    }

    /// Age of the entry. A `stored_at` in the future reads as age 0.
    pub fn age(&self, now: Timestamp) -> u64 {
        now.saturating_sub(self.stored_at)
    }

    /// Whether the entry has outlived `ttl_ms`.
    ///
    /// An entry expires once its age reaches the TTL, so a TTL of 0 expires
    /// everything immediately.
    pub fn is_expired(&self, now: Timestamp, ttl_ms: u64) -> bool {
        self.age(now) >= ttl_ms
    }

    /// Borrow the value only while the entry is fresh.
    pub fn fresh(&self, now: Timestamp, ttl_ms: u64) -> Option<&T> {
        if self.is_expired(now, ttl_ms) {
            None
        } else {
            Some(&self.value)
        }
    }
}
