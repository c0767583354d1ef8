//! Entry detail cache
//!
//! Assembled [`EntryDetails`] keyed by `(conversation id, entry id)`. Holds
//! everything by default; with a capacity it becomes an LRU.
//!
//! Only the plain view of an entry is stored. A view with an alternate line
//! selected is built per request and never enters the cache.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::model::{EntryDetails, EntryKey};

/// Detail cache with optional LRU eviction
pub enum EntryCache {
    Unbounded(HashMap<EntryKey, EntryDetails>),
    Bounded(LruCache<EntryKey, EntryDetails>),
}

impl EntryCache {
    /// `None` keeps every entry until invalidated
    pub fn new(capacity: Option<NonZeroUsize>) -> Self {
        match capacity {
            Some(cap) => EntryCache::Bounded(LruCache::new(cap)),
            None => EntryCache::Unbounded(HashMap::new()),
        }
    }

    pub fn get(&mut self, key: &EntryKey) -> Option<EntryDetails> {
        match self {
            EntryCache::Unbounded(map) => map.get(key).cloned(),
            EntryCache::Bounded(lru) => lru.get(key).cloned(),
        }
    }

    pub fn contains(&self, key: &EntryKey) -> bool {
        match self {
            EntryCache::Unbounded(map) => map.contains_key(key),
            EntryCache::Bounded(lru) => lru.contains(key),
        }
    }

    /// Store the plain view of an entry; selections are stripped
    pub fn put(&mut self, key: EntryKey, mut details: EntryDetails) {
        details.selected_alternate = None;
        match self {
            EntryCache::Unbounded(map) => {
                map.insert(key, details);
            }
            EntryCache::Bounded(lru) => {
                lru.put(key, details);
            }
        }
    }

    /// Drop one entry; returns whether it was cached
    pub fn invalidate(&mut self, key: &EntryKey) -> bool {
        match self {
            EntryCache::Unbounded(map) => map.remove(key).is_some(),
            EntryCache::Bounded(lru) => lru.pop(key).is_some(),
        }
    }

    pub fn clear(&mut self) {
        match self {
            EntryCache::Unbounded(map) => map.clear(),
            EntryCache::Bounded(lru) => lru.clear(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EntryCache::Unbounded(map) => map.len(),
            EntryCache::Bounded(lru) => lru.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EntryCache {
    fn default() -> Self {
        Self::new(None)
    }
}
