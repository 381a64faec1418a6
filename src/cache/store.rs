//! Cache Store Module
//!
//! Synchronous cache core combining the recency index with size accounting.
//! Callers provide the lock and the clock; every method that changes
//! structure takes `&mut self`.

use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{Entry, Footprint, RecencyIndex, SizeAccountant};
use crate::config::CacheConfig;

// == Cache Store ==
/// Cache storage with LRU ordering, byte accounting and TTL expiry.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key lookup and recency order
    index: RecencyIndex<K, V>,
    /// Running footprint total and bounds
    size: SizeAccountant,
    /// Lifetime granted on insert and on every successful access
    ttl: Duration,
}

impl<K, V> CacheStore<K, V>
where
    K: Hash + Eq + Clone + Footprint,
    V: Footprint,
{
    // == Constructor ==
    /// Creates an empty store with the bounds and TTL of `config`.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            index: RecencyIndex::new(),
            size: SizeAccountant::new(config.min_bytes, config.max_bytes),
            ttl: config.ttl(),
        }
    }

    // == Put ==
    /// Stores a key-value pair as the most recently used entry.
    ///
    /// An existing key keeps its slot: it is moved to the front, its value
    /// replaced and its expiry refreshed, and the size delta applied.
    ///
    /// Returns true when the total has reached `max_bytes` afterwards and a
    /// collapse pass should be requested.
    pub fn put(&mut self, key: K, value: V, now: Instant) -> bool {
        if let Some(idx) = self.index.find(&key) {
            self.index.move_to_front(idx);
            let entry = self.index.entry_mut(idx);
            self.size.sub(entry.footprint());
            entry.value = value;
            entry.refresh(now, self.ttl);
            self.size.add(entry.footprint());
        } else {
            let entry = Entry::new(key, value, now, self.ttl);
            self.size.add(entry.footprint());
            self.index.push_front(entry);
        }

        self.size.at_limit()
    }

    // == Get ==
    /// Retrieves a live value and marks it most recently used.
    ///
    /// An expired entry answers `None` but stays in place until a sweep
    /// pass removes it; it is neither promoted nor refreshed.
    pub fn get(&mut self, key: &K, now: Instant) -> Option<&V> {
        let idx = self.index.find(key)?;
        if self.index.entry(idx).is_expired(now) {
            return None;
        }

        self.index.move_to_front(idx);
        let entry = self.index.entry_mut(idx);
        entry.refresh(now, self.ttl);
        Some(&entry.value)
    }

    // == Remove ==
    /// Removes an entry by key, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.index.find(key)?;
        Some(self.remove_at(idx).value)
    }

    /// Removes the entry in slot `idx`: subtracts its footprint, drops its
    /// key from the index and unlinks it from the recency order.
    pub fn remove_at(&mut self, idx: usize) -> Entry<K, V> {
        let entry = self.index.remove(idx);
        self.size.sub(entry.footprint());
        entry
    }

    // == Collapse ==
    /// Evicts least recently used entries while the total is above
    /// `max_bytes`. Returns the number of entries removed.
    pub fn collapse(&mut self) -> usize {
        let mut removed = 0;
        while self.size.over_limit() {
            let Some(idx) = self.index.back() else {
                break;
            };
            self.remove_at(idx);
            removed += 1;
        }
        removed
    }

    // == Sweep Expired ==
    /// Removes expired entries from the least recently used end, stopping
    /// at the first live one. Returns the number of entries removed.
    ///
    /// Recency order is not expiry order, so an expired entry sitting in
    /// front of a live one survives until a later pass.
    pub fn sweep_expired(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        let mut cursor = self.index.back();
        while let Some(idx) = cursor {
            if !self.index.entry(idx).is_expired(now) {
                break;
            }
            cursor = self.index.prev(idx);
            self.remove_at(idx);
            removed += 1;
        }
        removed
    }

    // == Length ==
    /// Returns the number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Current summed footprint in bytes.
    pub fn current_bytes(&self) -> u64 {
        self.size.current_bytes()
    }

    /// Entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<K, V>> {
        self.index.iter()
    }

    /// The underlying recency index.
    pub fn index(&self) -> &RecencyIndex<K, V> {
        &self.index
    }
}

// == Display ==
/// Renders `{{k1: v1}, {k2: v2}}` from most to least recently used.
impl<K, V> fmt::Display for CacheStore<K, V>
where
    K: Hash + Eq + Clone + Footprint + fmt::Display,
    V: Footprint + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, entry) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{{{}: {}}}", entry.key, entry.value)?;
        }
        f.write_str("}")
    }
}
