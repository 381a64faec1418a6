//! Recency Index Module
//!
//! Key lookup plus recency ordering for LRU eviction.

use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::Entry;

/// Sentinel for "no neighbour".
const NIL: usize = usize::MAX;

/// A linked entry in the recency list.
#[derive(Debug)]
struct Node<K, V> {
    entry: Entry<K, V>,
    /// Neighbour closer to the front (more recently used)
    prev: usize,
    /// Neighbour closer to the back (less recently used)
    next: usize,
}

#[derive(Debug)]
enum Slot<K, V> {
    Occupied(Node<K, V>),
    /// Vacated slot, chained into the free list
    Vacant { next_free: usize },
}

// == Recency Index ==
/// Maps keys to entries kept in recency order.
///
/// Entries live in a slot arena and are doubly linked by slot index:
/// - Front = Most recently used
/// - Back = Least recently used
///
/// Every key in `map` points at exactly one occupied slot and every
/// occupied slot is reachable from `head`. Lookup, promotion and removal
/// are O(1). Slot indices stay valid until the slot is removed; vacated
/// slots are reused by later inserts.
#[derive(Debug)]
pub struct RecencyIndex<K, V> {
    slots: Vec<Slot<K, V>>,
    map: HashMap<K, usize>,
    head: usize,
    tail: usize,
    free_head: usize,
}

impl<K, V> Default for RecencyIndex<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RecencyIndex<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            map: HashMap::new(),
            head: NIL,
            tail: NIL,
            free_head: NIL,
        }
    }

    // == Lookup ==
    /// Returns the slot holding `key`, if any.
    pub fn find(&self, key: &K) -> Option<usize> {
        self.map.get(key).copied()
    }

    /// Checks if a key is present.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Entry stored at `idx`.
    ///
    /// # Panics
    /// If `idx` is not an occupied slot.
    pub fn entry(&self, idx: usize) -> &Entry<K, V> {
        &self.node(idx).entry
    }

    /// Mutable entry stored at `idx`. The key must not be changed.
    ///
    /// # Panics
    /// If `idx` is not an occupied slot.
    pub fn entry_mut(&mut self, idx: usize) -> &mut Entry<K, V> {
        &mut self.node_mut(idx).entry
    }

    // == Insert ==
    /// Inserts a new entry at the front and returns its slot.
    ///
    /// The caller must ensure the key is not already present.
    pub fn push_front(&mut self, entry: Entry<K, V>) -> usize {
        debug_assert!(!self.map.contains_key(&entry.key), "duplicate key in recency index");

        let key = entry.key.clone();
        let node = Node {
            entry,
            prev: NIL,
            next: NIL,
        };
        let idx = if self.free_head != NIL {
            let idx = self.free_head;
            if let Slot::Vacant { next_free } = self.slots[idx] {
                self.free_head = next_free;
            }
            self.slots[idx] = Slot::Occupied(node);
            idx
        } else {
            self.slots.push(Slot::Occupied(node));
            self.slots.len() - 1
        };

        self.map.insert(key, idx);
        self.link_front(idx);
        idx
    }

    // == Touch ==
    /// Marks the entry at `idx` as most recently used.
    pub fn move_to_front(&mut self, idx: usize) {
        if self.head == idx {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    // == Remove ==
    /// Unlinks the entry at `idx`, drops its key from the map and returns it.
    ///
    /// # Panics
    /// If `idx` is not an occupied slot.
    pub fn remove(&mut self, idx: usize) -> Entry<K, V> {
        self.unlink(idx);
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        let node = match std::mem::replace(&mut self.slots[idx], vacant) {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("slot {idx} removed twice"),
        };
        self.free_head = idx;
        self.map.remove(&node.entry.key);
        node.entry
    }

    // == Ends ==
    /// Slot of the most recently used entry.
    pub fn front(&self) -> Option<usize> {
        (self.head != NIL).then_some(self.head)
    }

    /// Slot of the least recently used entry.
    pub fn back(&self) -> Option<usize> {
        (self.tail != NIL).then_some(self.tail)
    }

    /// Slot of the neighbour one step closer to the front.
    pub fn prev(&self, idx: usize) -> Option<usize> {
        let prev = self.node(idx).prev;
        (prev != NIL).then_some(prev)
    }

    // == Length ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            index: self,
            cursor: self.head,
        }
    }

    /// Iterates keys held by the lookup map, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }

    // == Internal: Linked List Operations ==

    fn node(&self, idx: usize) -> &Node<K, V> {
        match &self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("slot {idx} is vacant"),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        match &mut self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("slot {idx} is vacant"),
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };

        if prev != NIL {
            self.node_mut(prev).next = next;
        } else {
            self.head = next;
        }

        if next != NIL {
            self.node_mut(next).prev = prev;
        } else {
            self.tail = prev;
        }

        let node = self.node_mut(idx);
        node.prev = NIL;
        node.next = NIL;
    }

    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = NIL;
            node.next = old_head;
        }

        if old_head != NIL {
            self.node_mut(old_head).prev = idx;
        } else {
            self.tail = idx;
        }
        self.head = idx;
    }
}

/// Front-to-back iterator over a [`RecencyIndex`].
pub struct Iter<'a, K, V> {
    index: &'a RecencyIndex<K, V>,
    cursor: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: Hash + Eq + Clone,
{
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let node = self.index.node(self.cursor);
        self.cursor = node.next;
        Some(&node.entry)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::Instant;

    fn entry(key: &str) -> Entry<String, String> {
        Entry::new(
            key.to_string(),
            format!("value_{}", key),
            Instant::now(),
            Duration::from_secs(60),
        )
    }

    fn order(index: &RecencyIndex<String, String>) -> Vec<String> {
        index.iter().map(|e| e.key.clone()).collect()
    }

    fn oldest(index: &RecencyIndex<String, String>) -> Option<String> {
        index.back().map(|idx| index.entry(idx).key.clone())
    }

    #[test]
    fn test_index_new() {
        let index: RecencyIndex<String, String> = RecencyIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.front(), None);
        assert_eq!(index.back(), None);
    }

    #[test]
    fn test_push_front_orders_newest_first() {
        let mut index = RecencyIndex::new();

        index.push_front(entry("key1"));
        index.push_front(entry("key2"));
        index.push_front(entry("key3"));

        assert_eq!(index.len(), 3);
        assert_eq!(order(&index), vec!["key3", "key2", "key1"]);
        // key1 is oldest (added first)
        assert_eq!(oldest(&index), Some("key1".to_string()));
    }

    #[test]
    fn test_move_to_front() {
        let mut index = RecencyIndex::new();

        let a = index.push_front(entry("a"));
        index.push_front(entry("b"));
        index.push_front(entry("c"));

        index.move_to_front(a);

        assert_eq!(order(&index), vec!["a", "c", "b"]);
        assert_eq!(oldest(&index), Some("b".to_string()));
    }

    #[test]
    fn test_move_to_front_of_head_is_noop() {
        let mut index = RecencyIndex::new();

        index.push_front(entry("a"));
        let b = index.push_front(entry("b"));

        index.move_to_front(b);
        assert_eq!(order(&index), vec!["b", "a"]);
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut index = RecencyIndex::new();

        let a = index.push_front(entry("a"));
        let b = index.push_front(entry("b"));
        let c = index.push_front(entry("c"));

        index.move_to_front(a);
        index.move_to_front(c);
        index.move_to_front(b);

        // front=[b, c, a]=back
        assert_eq!(order(&index), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_remove_middle_head_and_tail() {
        let mut index = RecencyIndex::new();

        let a = index.push_front(entry("a"));
        let b = index.push_front(entry("b"));
        let c = index.push_front(entry("c"));
        let d = index.push_front(entry("d"));

        assert_eq!(index.remove(b).key, "b");
        assert_eq!(order(&index), vec!["d", "c", "a"]);

        assert_eq!(index.remove(d).key, "d");
        assert_eq!(order(&index), vec!["c", "a"]);

        assert_eq!(index.remove(a).key, "a");
        assert_eq!(order(&index), vec!["c"]);
        assert_eq!(index.front(), Some(c));
        assert_eq!(index.back(), Some(c));

        index.remove(c);
        assert!(index.is_empty());
        assert_eq!(index.front(), None);
        assert_eq!(index.back(), None);
    }

    #[test]
    fn test_remove_drops_key_from_map() {
        let mut index = RecencyIndex::new();

        let idx = index.push_front(entry("key1"));
        index.push_front(entry("key2"));
        index.remove(idx);

        assert!(!index.contains(&"key1".to_string()));
        assert!(index.contains(&"key2".to_string()));
        assert_eq!(index.find(&"key1".to_string()), None);
    }

    #[test]
    fn test_vacated_slots_are_reused() {
        let mut index = RecencyIndex::new();

        let a = index.push_front(entry("a"));
        let b = index.push_front(entry("b"));
        index.remove(a);
        index.remove(b);

        let c = index.push_front(entry("c"));
        let d = index.push_front(entry("d"));

        assert_eq!(index.slots.len(), 2);
        assert!(c == b || c == a);
        assert!(d == b || d == a);
        assert_eq!(order(&index), vec!["d", "c"]);
    }

    #[test]
    fn test_prev_walks_back_to_front() {
        let mut index = RecencyIndex::new();

        index.push_front(entry("a"));
        index.push_front(entry("b"));
        index.push_front(entry("c"));

        let mut walked = Vec::new();
        let mut cursor = index.back();
        while let Some(idx) = cursor {
            walked.push(index.entry(idx).key.clone());
            cursor = index.prev(idx);
        }
        assert_eq!(walked, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_entry_mut_updates_value_in_place() {
        let mut index = RecencyIndex::new();

        let idx = index.push_front(entry("a"));
        index.entry_mut(idx).value = "updated".to_string();

        assert_eq!(index.entry(idx).value, "updated");
        assert_eq!(index.find(&"a".to_string()), Some(idx));
    }
}
