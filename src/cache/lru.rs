//! LRU Tracker Module
//!
//! Recency order for top-level keys, used to pick eviction victims.

use std::collections::HashMap;

#[derive(Debug)]
struct Node {
    key: String,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// A doubly-linked list threaded through a slot vector, indexed by key:
/// - Head = Least recently used
/// - Tail = Most recently used
///
/// Every operation is O(1). Freed slots are reused by later inserts.
#[derive(Debug, Default)]
pub(crate) struct LruTracker {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as recently used (moves to tail).
    ///
    /// If key exists, it is unlinked and relinked at the tail.
    /// If key is new, it is appended at the tail.
    pub fn touch(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&idx) => {
                if self.tail != Some(idx) {
                    self.unlink(idx);
                    self.link_back(idx);
                }
            }
            None => {
                self.insert_new(key);
            }
        }
    }

    // == Insert ==
    /// Appends a key at the tail only if it is not tracked yet.
    ///
    /// Returns true when the key was added. An existing key keeps its position.
    pub fn insert(&mut self, key: &str) -> bool {
        if self.index.contains_key(key) {
            return false;
        }
        self.insert_new(key);
        true
    }

    // == Remove ==
    /// Removes a key from the tracker. Returns true if it was tracked.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.index.remove(key) {
            Some(idx) => {
                self.unlink(idx);
                self.release(idx);
                true
            }
            None => false,
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let idx = self.head?;
        self.unlink(idx);
        let node = self.release(idx)?;
        self.index.remove(&node.key);
        Some(node.key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    #[cfg(test)]
    pub fn peek_oldest(&self) -> Option<&str> {
        self.head.and_then(|idx| self.node(idx)).map(|n| n.key.as_str())
    }

    // == Iter ==
    /// Iterates keys from least to most recently used.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tracker: self,
            cursor: self.head,
        }
    }

    // == Length ==
    /// Returns the number of tracked keys.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Checks if a key is being tracked.
    #[cfg(test)]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Internals ==
    fn node(&self, idx: usize) -> Option<&Node> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    fn insert_new(&mut self, key: &str) {
        let node = Node {
            key: key.to_string(),
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.index.insert(key.to_string(), idx);
        self.link_back(idx);
    }

    fn release(&mut self, idx: usize) -> Option<Node> {
        let node = self.slots.get_mut(idx).and_then(Option::take);
        if node.is_some() {
            self.free.push(idx);
        }
        node
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.node(idx) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.node_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = None;
        }
    }

    fn link_back(&mut self, idx: usize) {
        let old_tail = self.tail;
        if let Some(node) = self.node_mut(idx) {
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(t) => {
                if let Some(node) = self.node_mut(t) {
                    node.next = Some(idx);
                }
            }
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }
}

// == Iterator ==
/// Oldest-to-newest iterator over tracked keys.
pub(crate) struct Iter<'a> {
    tracker: &'a LruTracker,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tracker.node(self.cursor?)?;
        self.cursor = node.next;
        Some(node.key.as_str())
    }
}
