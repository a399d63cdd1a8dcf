//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

// == Recency Node ==
#[derive(Debug)]
struct Node<K> {
    key: K,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Recency List ==
/// Tracks access order for LRU eviction strategy.
///
/// A doubly-linked list stored in a slab, so every operation is O(1):
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// `push_front` hands out a slot index that stays valid until the key is
/// removed; the cache keeps it next to the value to reach the node directly.
#[derive(Debug)]
pub struct RecencyList<K> {
    nodes: Vec<Option<Node<K>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<K> Default for RecencyList<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RecencyList<K> {
    // == Constructor ==
    /// Creates a new empty recency list.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Adds a key as the most recently used and returns its slot.
    pub fn push_front(&mut self, key: K) -> usize {
        let node = Node {
            key,
            prev: None,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                slot
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        self.attach_front(slot);
        self.len += 1;
        slot
    }

    // == Touch ==
    /// Marks the key in `slot` as most recently used.
    pub fn move_to_front(&mut self, slot: usize) {
        if self.head == Some(slot) || !self.is_live(slot) {
            return;
        }
        self.detach(slot);
        self.attach_front(slot);
    }

    // == Remove ==
    /// Removes the key in `slot` and returns it.
    pub fn remove(&mut self, slot: usize) -> Option<K> {
        if !self.is_live(slot) {
            return None;
        }
        self.detach(slot);
        self.len -= 1;
        self.free.push(slot);
        self.nodes[slot].take().map(|node| node.key)
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if the list is empty.
    pub fn pop_back(&mut self) -> Option<K> {
        let tail = self.tail?;
        self.remove(tail)
    }

    /// Drops every key and releases the slab.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates keys from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn is_live(&self, slot: usize) -> bool {
        matches!(self.nodes.get(slot), Some(Some(_)))
    }

    fn attach_front(&mut self, slot: usize) {
        let old_head = self.head;
        if let Some(node) = self.nodes[slot].as_mut() {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => {
                if let Some(node) = self.nodes[head].as_mut() {
                    node.prev = Some(slot);
                }
            }
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }

    fn detach(&mut self, slot: usize) {
        let (prev, next) = match self.nodes[slot].as_ref() {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev) => {
                if let Some(node) = self.nodes[prev].as_mut() {
                    node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next) => {
                if let Some(node) = self.nodes[next].as_mut() {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }
}

/// Iterator over keys, most recently used first.
pub struct Iter<'a, K> {
    list: &'a RecencyList<K>,
    cursor: Option<usize>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list;
        let node = list.nodes[self.cursor?].as_ref()?;
        self.cursor = node.next;
        Some(&node.key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &RecencyList<&'static str>) -> Vec<&'static str> {
        list.iter().copied().collect()
    }

    fn oldest(list: &RecencyList<&'static str>) -> Option<&'static str> {
        list.iter().last().copied()
    }

    #[test]
    fn test_lru_new() {
        let lru: RecencyList<&'static str> = RecencyList::new();
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
        assert!(oldest(&lru).is_none());
    }

    #[test]
    fn test_push_front_orders_by_insertion() {
        let mut lru = RecencyList::new();

        lru.push_front("key1");
        lru.push_front("key2");
        lru.push_front("key3");

        assert_eq!(lru.len(), 3);
        // key1 is oldest (added first)
        assert_eq!(oldest(&lru), Some("key1"));
        assert_eq!(keys(&lru), vec!["key3", "key2", "key1"]);
    }

    #[test]
    fn test_move_to_front() {
        let mut lru = RecencyList::new();

        let a = lru.push_front("a");
        lru.push_front("b");
        lru.push_front("c");

        lru.move_to_front(a);

        assert_eq!(lru.len(), 3);
        assert_eq!(oldest(&lru), Some("b"));
        assert_eq!(keys(&lru), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_move_middle_and_tail() {
        let mut lru = RecencyList::new();

        let a = lru.push_front("a");
        let b = lru.push_front("b");
        lru.push_front("c");

        lru.move_to_front(b);
        assert_eq!(keys(&lru), vec!["b", "c", "a"]);

        lru.move_to_front(a);
        assert_eq!(keys(&lru), vec!["a", "b", "c"]);
        assert_eq!(oldest(&lru), Some("c"));
    }

    #[test]
    fn test_pop_back() {
        let mut lru = RecencyList::new();

        lru.push_front("key1");
        lru.push_front("key2");
        lru.push_front("key3");

        assert_eq!(lru.pop_back(), Some("key1"));
        assert_eq!(lru.len(), 2);

        assert_eq!(lru.pop_back(), Some("key2"));
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn test_pop_back_empty() {
        let mut lru: RecencyList<&str> = RecencyList::new();
        assert_eq!(lru.pop_back(), None);
    }

    #[test]
    fn test_remove_by_slot() {
        let mut lru = RecencyList::new();

        lru.push_front("key1");
        let key2 = lru.push_front("key2");
        lru.push_front("key3");

        assert_eq!(lru.remove(key2), Some("key2"));
        assert_eq!(lru.len(), 2);
        assert_eq!(keys(&lru), vec!["key3", "key1"]);

        // Second removal of the same slot is a no-op
        assert_eq!(lru.remove(key2), None);
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn test_freed_slot_is_reused() {
        let mut lru = RecencyList::new();

        let a = lru.push_front("a");
        lru.push_front("b");
        lru.remove(a);

        let c = lru.push_front("c");
        assert_eq!(c, a);
        assert_eq!(keys(&lru), vec!["c", "b"]);
        assert_eq!(oldest(&lru), Some("b"));
    }

    #[test]
    fn test_single_entry_remove_resets_ends() {
        let mut lru = RecencyList::new();

        let only = lru.push_front("only");
        lru.move_to_front(only);
        assert_eq!(lru.remove(only), Some("only"));

        assert!(lru.is_empty());
        assert!(oldest(&lru).is_none());
        assert_eq!(lru.iter().count(), 0);

        lru.push_front("next");
        assert_eq!(oldest(&lru), Some("next"));
    }

    #[test]
    fn test_clear() {
        let mut lru = RecencyList::new();

        lru.push_front("a");
        lru.push_front("b");
        lru.clear();

        assert!(lru.is_empty());
        assert_eq!(lru.pop_back(), None);
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut lru = RecencyList::new();

        let a = lru.push_front("a");
        let b = lru.push_front("b");
        let c = lru.push_front("c");

        lru.move_to_front(a);
        lru.move_to_front(c);
        lru.move_to_front(b);

        // front=[b, c, a]=back
        assert_eq!(lru.pop_back(), Some("a"));
        assert_eq!(lru.pop_back(), Some("c"));
        assert_eq!(lru.pop_back(), Some("b"));
    }
}
