//! Progressive image tier cache.
//!
//! Product pictures load in three tiers: a thumbnail renders first, then a
//! medium asset replaces it, then the full-size one. The cache remembers the
//! best tier fetched so far per picture id so navigating back to a product
//! never re-fetches or downgrades what is already in memory. Fetching itself
//! belongs to the caller; this is pure state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Resolution tier of a product picture, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageTier {
    Thumbnail,
    Medium,
    Large,
}

impl ImageTier {
    /// All tiers in loading order.
    pub const ALL: [ImageTier; 3] = [ImageTier::Thumbnail, ImageTier::Medium, ImageTier::Large];

    /// The tier to fetch after this one, `None` at the top.
    pub fn next(self) -> Option<ImageTier> {
        match self {
            ImageTier::Thumbnail => Some(ImageTier::Medium),
            ImageTier::Medium => Some(ImageTier::Large),
            ImageTier::Large => None,
        }
    }
}

impl std::fmt::Display for ImageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ImageTier::Thumbnail => "thumbnail",
            ImageTier::Medium => "medium",
            ImageTier::Large => "large",
        };
        f.write_str(name)
    }
}

/// In-memory cache of the best tier fetched per picture id.
///
/// `T` is whatever the caller fetches (bytes, an object URL, a handle).
#[derive(Debug, Clone)]
pub struct ImageCache<K, T> {
    best: HashMap<K, (ImageTier, T)>,
}

impl<K: Eq + Hash, T> ImageCache<K, T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            best: HashMap::new(),
        }
    }

    /// Store a fetched tier. Only upgrades are kept; storing a tier at or
    /// below the cached one is ignored and returns false.
    pub fn store(&mut self, key: K, tier: ImageTier, data: T) -> bool {
        match self.best.get(&key) {
            Some((cached_tier, _)) if *cached_tier >= tier => false,
            _ => {
                self.best.insert(key, (tier, data));
                true
            }
        }
    }

    /// The best tier cached for a picture, with its data.
    pub fn best(&self, key: &K) -> Option<(ImageTier, &T)> {
        self.best.get(key).map(|(tier, data)| (*tier, data))
    }

    /// The tier to fetch next for a picture: thumbnail when nothing is
    /// cached, the next tier up otherwise, `None` once large is in.
    pub fn next_tier(&self, key: &K) -> Option<ImageTier> {
        match self.best.get(key) {
            None => Some(ImageTier::Thumbnail),
            Some((tier, _)) => tier.next(),
        }
    }

    /// Drop a picture from the cache.
    pub fn remove(&mut self, key: &K) -> Option<(ImageTier, T)> {
        self.best.remove(key)
    }

    /// Number of cached pictures.
    pub fn len(&self) -> usize {
        self.best.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.best.clear();
    }
}

impl<K: Eq + Hash, T> Default for ImageCache<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
