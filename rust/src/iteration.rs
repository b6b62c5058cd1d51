//! Iterator implementations for BPlusTreeMap.
//!
//! This module contains all iterator types and their implementations for the B+ tree,
//! including basic iteration, range iteration, and optimized fast iteration.

use crate::types::{BPlusTreeMap, LeafNode, NodeId, NULL_NODE};
use std::ops::Bound;

// ============================================================================
// ITERATOR STRUCTS
// ============================================================================

/// Iterator over key-value pairs in the B+ tree using the leaf linked list.
///
/// Walks forward via `next` pointers and backward via `prev` pointers, so it
/// can be driven from either end without re-descending the tree.
pub struct ItemIterator<'a, K, V> {
    tree: &'a BPlusTreeMap<K, V>,
    current_leaf_id: Option<NodeId>,
    pub current_leaf_ref: Option<&'a LeafNode<K, V>>, // CACHED leaf reference
    current_leaf_index: usize,
    back_leaf_id: Option<NodeId>,
    back_leaf_ref: Option<&'a LeafNode<K, V>>,
    back_leaf_index: usize,
    // Total items left to yield from either end combined. `None` for
    // bounded (items_range) iterators, where `next_back` falls back to
    // walking the `prev` chain without a crossing check against the
    // front cursor.
    remaining: Option<usize>,
    end_key: Option<&'a K>,
    end_bound_key: Option<K>,
    end_inclusive: bool,
    finished: bool,
}

/// Fast iterator over key-value pairs using unsafe arena access for better performance.
pub struct FastItemIterator<'a, K, V> {
    tree: &'a BPlusTreeMap<K, V>,
    current_leaf_id: Option<NodeId>,
    pub current_leaf_ref: Option<&'a LeafNode<K, V>>, // CACHED leaf reference
    current_leaf_index: usize,
    finished: bool,
}

/// Iterator over keys in the B+ tree.
pub struct KeyIterator<'a, K, V> {
    items: ItemIterator<'a, K, V>,
}

/// Iterator over values in the B+ tree.
pub struct ValueIterator<'a, K, V> {
    items: ItemIterator<'a, K, V>,
}

/// Optimized iterator over a range of key-value pairs in the B+ tree.
/// Uses tree navigation to find start, then linked list traversal for efficiency.
pub struct RangeIterator<'a, K, V> {
    iterator: Option<ItemIterator<'a, K, V>>,
    skip_first: bool,
    first_key: Option<K>,
}

// ============================================================================
// BPLUSTREE ITERATOR METHODS
// ============================================================================

impl<K: Ord + Clone, V: Clone> BPlusTreeMap<K, V> {
    /// Returns an iterator over all key-value pairs in sorted order.
    pub fn items(&self) -> ItemIterator<'_, K, V> {
        ItemIterator::new(self)
    }

    /// Alias for [`items`](Self::items); the name `IntoIterator for &BPlusTreeMap`
    /// also delegates to.
    pub fn iter(&self) -> ItemIterator<'_, K, V> {
        self.items()
    }

    /// Find the entry for `key`, returning a `Cursor` positioned on it, or
    /// `None` if `key` is absent. Unlike an iterator, a `Cursor` is a plain
    /// position: it borrows the tree but holds no live traversal state.
    pub fn find(&self, key: &K) -> Option<Cursor<'_, K, V>> {
        let (leaf_id, index, matched) = self.find_leaf_for_key_with_match(key)?;
        matched.then_some(Cursor {
            tree: self,
            leaf_id,
            index,
        })
    }

    /// Returns a fast iterator over all key-value pairs using unsafe arena access.
    /// This provides better performance by skipping bounds checks.
    ///
    /// # Safety
    /// This is safe to use as long as the tree structure is valid and no concurrent
    /// modifications occur during iteration.
    pub fn items_fast(&self) -> FastItemIterator<'_, K, V> {
        FastItemIterator::new(self)
    }

    /// Returns an iterator over all keys in sorted order.
    pub fn keys(&self) -> KeyIterator<'_, K, V> {
        KeyIterator::new(self)
    }

    /// Returns an iterator over all values in key order.
    pub fn values(&self) -> ValueIterator<'_, K, V> {
        ValueIterator::new(self)
    }

    /// Returns an iterator over key-value pairs in a range.
    /// If start_key is None, starts from the beginning.
    /// If end_key is None, goes to the end.
    pub fn items_range<'a>(
        &'a self,
        start_key: Option<&K>,
        end_key: Option<&'a K>,
    ) -> RangeIterator<'a, K, V> {
        let start_bound = start_key.map_or(Bound::Unbounded, Bound::Included);
        let end_bound = end_key.map_or(Bound::Unbounded, Bound::Excluded);

        let (start_info, skip_first, end_info) =
            self.resolve_range_bounds((start_bound, end_bound));
        RangeIterator::new_with_skip_owned(self, start_info, skip_first, end_info)
    }
}

impl<'a, K: Ord + Clone, V: Clone> IntoIterator for &'a BPlusTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = ItemIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.items()
    }
}

// ============================================================================
// CURSOR
// ============================================================================

/// An external position into a tree: a `(leaf id, index)` pair. Obtained from
/// `find`, a `Cursor` is a snapshot of one entry's location rather than a
/// live traversal — `next`/`prev` each return a new, independent `Cursor`.
pub struct Cursor<'a, K, V> {
    tree: &'a BPlusTreeMap<K, V>,
    leaf_id: NodeId,
    index: usize,
}

impl<'a, K, V> Clone for Cursor<'a, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K, V> Copy for Cursor<'a, K, V> {}

impl<'a, K, V> PartialEq for Cursor<'a, K, V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.leaf_id == other.leaf_id && self.index == other.index
    }
}

impl<'a, K, V> Eq for Cursor<'a, K, V> {}

impl<'a, K: Ord + Clone, V: Clone> Cursor<'a, K, V> {
    /// The key at this position.
    pub fn get_key(&self) -> &'a K {
        self.tree
            .get_leaf(self.leaf_id)
            .and_then(|leaf| leaf.get_key(self.index))
            .expect("cursor always points at a live entry")
    }

    /// The value at this position.
    pub fn get_value(&self) -> &'a V {
        self.tree
            .get_leaf(self.leaf_id)
            .and_then(|leaf| leaf.get_value(self.index))
            .expect("cursor always points at a live entry")
    }

    /// The cursor for the next entry in key order, or `None` at the end.
    pub fn next(&self) -> Option<Cursor<'a, K, V>> {
        let leaf = self.tree.get_leaf(self.leaf_id)?;
        if self.index + 1 < leaf.keys_len() {
            return Some(Cursor {
                tree: self.tree,
                leaf_id: self.leaf_id,
                index: self.index + 1,
            });
        }
        if leaf.next != NULL_NODE {
            return Some(Cursor {
                tree: self.tree,
                leaf_id: leaf.next,
                index: 0,
            });
        }
        None
    }

    /// The cursor for the previous entry in key order, or `None` at the start.
    pub fn prev(&self) -> Option<Cursor<'a, K, V>> {
        if self.index > 0 {
            return Some(Cursor {
                tree: self.tree,
                leaf_id: self.leaf_id,
                index: self.index - 1,
            });
        }
        let leaf = self.tree.get_leaf(self.leaf_id)?;
        if leaf.prev != NULL_NODE {
            let prev_leaf = self.tree.get_leaf(leaf.prev)?;
            let prev_index = prev_leaf.keys_len().checked_sub(1)?;
            return Some(Cursor {
                tree: self.tree,
                leaf_id: leaf.prev,
                index: prev_index,
            });
        }
        None
    }
}

// ============================================================================
// ITEMITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K: Ord + Clone, V: Clone> ItemIterator<'a, K, V> {
    pub fn new(tree: &'a BPlusTreeMap<K, V>) -> Self {
        // Start with the first (leftmost) leaf in the tree
        let leftmost_id = tree.get_first_leaf_id();

        // Get the initial leaf reference if we have a starting leaf
        let current_leaf_ref = leftmost_id.and_then(|id| tree.get_leaf(id));

        let back_leaf_id = tree.get_last_leaf_id();
        let back_leaf_ref = back_leaf_id.and_then(|id| tree.get_leaf(id));
        let back_leaf_index = back_leaf_ref.map(|leaf| leaf.keys_len()).unwrap_or(0);

        Self {
            tree,
            current_leaf_id: leftmost_id,
            current_leaf_ref,
            current_leaf_index: 0,
            back_leaf_id,
            back_leaf_ref,
            back_leaf_index,
            remaining: Some(tree.len()),
            end_key: None,
            end_bound_key: None,
            end_inclusive: false,
            finished: false,
        }
    }

    pub fn new_from_position_with_bounds(
        tree: &'a BPlusTreeMap<K, V>,
        leaf_id: NodeId,
        index: usize,
        end_bound: Bound<&'a K>,
    ) -> Self {
        let current_leaf_ref = tree.get_leaf(leaf_id);

        let back_leaf_id = tree.get_last_leaf_id();
        let back_leaf_ref = back_leaf_id.and_then(|id| tree.get_leaf(id));
        let back_leaf_index = back_leaf_ref.map(|leaf| leaf.keys_len()).unwrap_or(0);

        let (end_key, end_bound_key, end_inclusive) = match end_bound {
            Bound::Included(key) => (Some(key), None, true),
            Bound::Excluded(key) => (Some(key), None, false),
            Bound::Unbounded => (None, None, false),
        };

        Self {
            tree,
            current_leaf_id: Some(leaf_id),
            current_leaf_ref,
            current_leaf_index: index,
            back_leaf_id,
            back_leaf_ref,
            back_leaf_index,
            remaining: None,
            end_key,
            end_bound_key,
            end_inclusive,
            finished: false,
        }
    }

    /// Helper method to try getting the next item from the current leaf
    fn try_get_next_item(&mut self, leaf: &'a LeafNode<K, V>) -> Option<(&'a K, &'a V)> {
        // Check if we have more items in the current leaf
        if self.current_leaf_index >= leaf.keys_len() {
            return None;
        }

        let key = leaf.get_key(self.current_leaf_index)?;
        let value = leaf.get_value(self.current_leaf_index)?;

        // Check if we've reached the end bound using Option combinators
        let beyond_end = self
            .end_key
            .map(|end| key >= end)
            .or_else(|| {
                self.end_bound_key.as_ref().map(|end| {
                    if self.end_inclusive {
                        key > end
                    } else {
                        key >= end
                    }
                })
            })
            .unwrap_or(false);

        if beyond_end {
            self.finished = true;
            return None;
        }

        self.current_leaf_index += 1;
        Some((key, value))
    }

    /// Helper method to advance to the next leaf
    /// Returns Some(true) if successfully advanced, Some(false) if no more leaves, None if invalid leaf
    fn advance_to_next_leaf(&mut self) -> Option<bool> {
        // Use cached leaf reference to get next leaf ID
        let leaf = self.current_leaf_ref?;

        let next_leaf_id = (leaf.next != NULL_NODE).then_some(leaf.next);

        // Update both ID and cached reference - this is the ONLY arena access during iteration
        self.current_leaf_id = next_leaf_id;
        self.current_leaf_ref = next_leaf_id.and_then(|id| self.tree.get_leaf(id));
        self.current_leaf_index = 0;

        Some(self.current_leaf_id.is_some())
    }
}

impl<'a, K: Ord + Clone, V: Clone> Iterator for ItemIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.remaining == Some(0) {
            self.finished = true;
            return None;
        }

        loop {
            // Use cached leaf reference - NO arena lookup here!
            let result = self
                .current_leaf_ref
                .and_then(|leaf| self.try_get_next_item(leaf));

            match result {
                Some(item) => {
                    if let Some(remaining) = self.remaining.as_mut() {
                        *remaining -= 1;
                    }
                    return Some(item);
                }
                None => {
                    // Either no current leaf or no more items in current leaf
                    if !self.advance_to_next_leaf().unwrap_or(false) {
                        self.finished = true;
                        return None;
                    }
                    // Continue loop with next leaf
                }
            }
        }
    }
}

impl<'a, K: Ord + Clone, V: Clone> DoubleEndedIterator for ItemIterator<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.finished || self.remaining == Some(0) {
            self.finished = true;
            return None;
        }

        loop {
            let leaf = self.back_leaf_ref?;

            if self.back_leaf_index == 0 {
                if leaf.prev == NULL_NODE {
                    self.finished = true;
                    return None;
                }
                self.back_leaf_id = Some(leaf.prev);
                self.back_leaf_ref = self.tree.get_leaf(leaf.prev);
                self.back_leaf_index = self.back_leaf_ref.map(|l| l.keys_len()).unwrap_or(0);
                continue;
            }

            let index = self.back_leaf_index - 1;

            // When we know the total remaining count, it already accounts
            // for the front/back crossing; when we don't (bounded range
            // iterators), fall back to a same-leaf index comparison.
            if self.remaining.is_none()
                && self.back_leaf_id == self.current_leaf_id
                && index < self.current_leaf_index
            {
                self.finished = true;
                return None;
            }

            self.back_leaf_index = index;
            let key = leaf.get_key(index)?;
            let value = leaf.get_value(index)?;

            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
            return Some((key, value));
        }
    }
}

// ============================================================================
// KEYITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K: Ord + Clone, V: Clone> KeyIterator<'a, K, V> {
    pub fn new(tree: &'a BPlusTreeMap<K, V>) -> Self {
        Self {
            items: ItemIterator::new(tree),
        }
    }
}

impl<'a, K: Ord + Clone, V: Clone> Iterator for KeyIterator<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(k, _)| k)
    }
}

impl<'a, K: Ord + Clone, V: Clone> DoubleEndedIterator for KeyIterator<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.items.next_back().map(|(k, _)| k)
    }
}

// ============================================================================
// VALUEITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K: Ord + Clone, V: Clone> ValueIterator<'a, K, V> {
    pub fn new(tree: &'a BPlusTreeMap<K, V>) -> Self {
        Self {
            items: ItemIterator::new(tree),
        }
    }
}

impl<'a, K: Ord + Clone, V: Clone> Iterator for ValueIterator<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(_, v)| v)
    }
}

impl<'a, K: Ord + Clone, V: Clone> DoubleEndedIterator for ValueIterator<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.items.next_back().map(|(_, v)| v)
    }
}

// ============================================================================
// RANGEITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K: Ord + Clone, V: Clone> RangeIterator<'a, K, V> {
    pub fn new_with_skip_owned(
        tree: &'a BPlusTreeMap<K, V>,
        start_info: Option<(NodeId, usize)>,
        skip_first: bool,
        end_info: Option<(K, bool)>, // (end_key, is_inclusive)
    ) -> Self {
        // Clone end_info to avoid borrowing issues
        let end_info_clone = end_info.clone();

        let (iterator, first_key) = start_info
            .map(move |(leaf_id, index)| {
                // Create iterator with unbounded end, we'll handle bounds in the iterator itself
                let end_bound = Bound::Unbounded;
                let mut iter =
                    ItemIterator::new_from_position_with_bounds(tree, leaf_id, index, end_bound);

                // Set the end bound using owned key if provided
                if let Some((key, is_inclusive)) = end_info_clone {
                    iter.end_bound_key = Some(key);
                    iter.end_inclusive = is_inclusive;
                }

                // Extract first key if needed for skipping, avoid redundant arena lookup
                let first_key = if skip_first {
                    tree.get_leaf(leaf_id)
                        .and_then(|leaf| leaf.get_key(index))
                        .cloned()
                } else {
                    None
                };

                (Some(iter), first_key)
            })
            .unwrap_or((None, None));

        Self {
            iterator,
            skip_first,
            first_key,
        }
    }
}

impl<'a, K: Ord + Clone, V: Clone> Iterator for RangeIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.iterator.as_mut()?.next()?;

            // Handle excluded start bound on first iteration
            if self.skip_first {
                self.skip_first = false;
                if let Some(ref first_key) = self.first_key {
                    if item.0 == first_key {
                        // Skip this item and continue to next
                        continue;
                    }
                }
            }

            return Some(item);
        }
    }
}

// ============================================================================
// FASTITEMITERATOR IMPLEMENTATION
// ============================================================================

impl<'a, K: Ord + Clone, V: Clone> FastItemIterator<'a, K, V> {
    pub fn new(tree: &'a BPlusTreeMap<K, V>) -> Self {
        // Start with the first (leftmost) leaf in the tree
        let leftmost_id = tree.get_first_leaf_id();

        // Get the initial leaf reference if we have a starting leaf
        let current_leaf_ref =
            leftmost_id.map(|id| unsafe { tree.get_leaf_unchecked(id) });

        Self {
            tree,
            current_leaf_id: leftmost_id,
            current_leaf_ref,
            current_leaf_index: 0,
            finished: false,
        }
    }
}

impl<'a, K: Ord + Clone, V: Clone> Iterator for FastItemIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            // Use cached leaf reference - NO arena lookup here!
            let leaf = self.current_leaf_ref?;

            if self.current_leaf_index < leaf.keys_len() {
                let key = leaf.get_key(self.current_leaf_index)?;
                let value = leaf.get_value(self.current_leaf_index)?;
                self.current_leaf_index += 1;
                return Some((key, value));
            } else {
                // Move to next leaf - this is the ONLY arena access during iteration
                if leaf.next != NULL_NODE {
                    self.current_leaf_id = Some(leaf.next);
                    self.current_leaf_ref =
                        unsafe { Some(self.tree.get_leaf_unchecked(leaf.next)) };
                    self.current_leaf_index = 0;
                } else {
                    self.finished = true;
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::BPlusTreeMap;

    #[test]
    fn items_iterate_forward_in_order() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..50 {
            tree.insert(i, i * 2);
        }
        let collected: Vec<_> = tree.items().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<_> = (0..50).map(|i| (i, i * 2)).collect();
        assert_eq!(collected, expected);
    }

    #[test]
    fn items_iterate_backward_in_order() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..50 {
            tree.insert(i, i * 2);
        }
        let collected: Vec<_> = tree.items().rev().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<_> = (0..50).rev().map(|i| (i, i * 2)).collect();
        assert_eq!(collected, expected);
    }

    #[test]
    fn items_meet_in_the_middle_from_both_ends() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..20 {
            tree.insert(i, i);
        }
        let mut iter = tree.items();
        let mut front = Vec::new();
        let mut back = Vec::new();
        loop {
            match (iter.next(), iter.next_back()) {
                (Some(f), Some(b)) => {
                    front.push(*f.0);
                    back.push(*b.0);
                }
                (Some(f), None) => {
                    front.push(*f.0);
                    break;
                }
                (None, _) => break,
            }
        }
        back.reverse();
        let mut all = front;
        all.extend(back);
        let expected: Vec<_> = (0..20).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn keys_and_values_support_reverse_iteration() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..10 {
            tree.insert(i, i * 10);
        }
        let keys: Vec<_> = tree.keys().rev().cloned().collect();
        assert_eq!(keys, (0..10).rev().collect::<Vec<_>>());

        let values: Vec<_> = tree.values().rev().cloned().collect();
        assert_eq!(values, (0..10).rev().map(|i| i * 10).collect::<Vec<_>>());
    }

    #[test]
    fn empty_tree_reverse_iteration_yields_nothing() {
        let tree = BPlusTreeMap::<i32, i32>::new(4).unwrap();
        assert_eq!(tree.items().rev().count(), 0);
    }

    #[test]
    fn into_iterator_and_iter_agree_with_items() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..30 {
            tree.insert(i, i * 2);
        }
        let via_items: Vec<_> = tree.items().map(|(k, v)| (*k, *v)).collect();
        let via_iter: Vec<_> = tree.iter().map(|(k, v)| (*k, *v)).collect();
        let via_into_iter: Vec<_> = (&tree).into_iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(via_items, via_iter);
        assert_eq!(via_items, via_into_iter);
    }

    #[test]
    fn find_locates_an_existing_key_and_rejects_a_missing_one() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..50 {
            tree.insert(i, i * 3);
        }
        let cursor = tree.find(&17).unwrap();
        assert_eq!(*cursor.get_key(), 17);
        assert_eq!(*cursor.get_value(), 51);
        assert!(tree.find(&999).is_none());
    }

    #[test]
    fn cursor_next_and_prev_walk_in_key_order() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..40 {
            tree.insert(i, i);
        }

        let mut cursor = tree.find(&0).unwrap();
        for expected in 0..40 {
            assert_eq!(*cursor.get_key(), expected);
            cursor = match cursor.next() {
                Some(c) => c,
                None => break,
            };
        }

        let mut cursor = tree.find(&39).unwrap();
        for expected in (0..40).rev() {
            assert_eq!(*cursor.get_key(), expected);
            cursor = match cursor.prev() {
                Some(c) => c,
                None => break,
            };
        }
    }

    #[test]
    fn cursor_equality_compares_position() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..20 {
            tree.insert(i, i);
        }
        let a = tree.find(&5).unwrap();
        let b = tree.find(&5).unwrap();
        let c = tree.find(&6).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
