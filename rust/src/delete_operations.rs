//! DELETE operations for BPlusTreeMap.
//!
//! This module contains all the deletion operations for the B+ tree, including
//! key-value removal, sibling redistribution, node coalescing, and tree
//! shrinking during deletions.

use crate::types::{BPlusTreeMap, NodeId, NodeRef, NULL_NODE};
use std::marker::PhantomData;

impl<K: Ord + Clone, V: Clone> BPlusTreeMap<K, V> {
    /// Remove a key, returning its value if it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree::BPlusTreeMap;
    ///
    /// let mut tree = BPlusTreeMap::new(16).unwrap();
    /// tree.insert(1, "one");
    /// assert_eq!(tree.remove(&1), Some("one"));
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (leaf_id, _index, matched) = self.find_leaf_for_key_with_match(key)?;
        if !matched {
            return None;
        }

        let leaf = self.get_leaf_mut(leaf_id)?;
        let (removed, now_underfull) = leaf.remove(key);

        if removed.is_some()
            && now_underfull
            && !self.is_root(NodeRef::Leaf(leaf_id, PhantomData))
        {
            self.rebalance_from(NodeRef::Leaf(leaf_id, PhantomData));
        }

        removed
    }

    /// Walk upward from `node`, redistributing or coalescing with a sibling
    /// until the tree's invariants are restored, or the root is reached.
    fn rebalance_from(&mut self, mut node: NodeRef<K, V>) {
        loop {
            if self.is_root(node) {
                self.collapse_root_if_needed();
                return;
            }

            if !self.node_is_sparse(node) {
                return;
            }

            let parent_id = self
                .find_parent_of(node)
                .expect("a non-root node must have a parent");
            let child_index = self
                .child_index_in(parent_id, node)
                .expect("node must appear among its parent's children");
            let (left, right) = self.sibling_ids(parent_id, child_index);

            if let Some(left_ref) = left {
                if self.try_redistribute(parent_id, child_index - 1, left_ref, node) {
                    return;
                }
            }
            if let Some(right_ref) = right {
                if self.try_redistribute(parent_id, child_index, node, right_ref) {
                    return;
                }
            }
            if let Some(left_ref) = left {
                if self.coalesce(left_ref, node, parent_id, child_index - 1) {
                    node = NodeRef::Branch(parent_id, PhantomData);
                    continue;
                }
            }
            if let Some(right_ref) = right {
                if self.coalesce(node, right_ref, parent_id, child_index) {
                    node = NodeRef::Branch(parent_id, PhantomData);
                    continue;
                }
            }

            // Capacity >= MIN_CAPACITY guarantees one of the four attempts
            // above always succeeds for a sparse non-root node.
            return;
        }
    }

    fn node_is_sparse(&self, node: NodeRef<K, V>) -> bool {
        match node {
            NodeRef::Leaf(id, _) => self.get_leaf(id).map(|l| l.is_underfull()).unwrap_or(false),
            NodeRef::Branch(id, _) => self
                .get_branch(id)
                .map(|b| b.is_underfull())
                .unwrap_or(false),
        }
    }

    fn child_index_in(&self, parent_id: NodeId, node: NodeRef<K, V>) -> Option<usize> {
        self.get_branch(parent_id)?
            .children
            .iter()
            .position(|c| c.id() == node.id() && c.is_leaf() == node.is_leaf())
    }

    /// Attempt to donate one entry between `left` and `right`, whichever has
    /// a surplus of at least two, fixing up the parent separator at
    /// `sep_index` in the process. Returns whether anything moved.
    fn try_redistribute(
        &mut self,
        parent_id: NodeId,
        sep_index: usize,
        left: NodeRef<K, V>,
        right: NodeRef<K, V>,
    ) -> bool {
        match (left, right) {
            (NodeRef::Leaf(l, _), NodeRef::Leaf(r, _)) => {
                if self.redistribute_leaves(l, r) {
                    self.fix_leaf_separator(parent_id, sep_index);
                    true
                } else {
                    false
                }
            }
            (NodeRef::Branch(l, _), NodeRef::Branch(r, _)) => {
                self.redistribute_branches(parent_id, sep_index, l, r)
            }
            _ => false,
        }
    }

    fn redistribute_leaves(&mut self, left_id: NodeId, right_id: NodeId) -> bool {
        let left_len = match self.get_leaf(left_id) {
            Some(l) => l.keys_len(),
            None => return false,
        };
        let right_len = match self.get_leaf(right_id) {
            Some(r) => r.keys_len(),
            None => return false,
        };

        if left_len >= right_len + 2 {
            let (k, v) = self
                .get_leaf_mut(left_id)
                .and_then(|l| l.borrow_last())
                .expect("surplus checked above");
            self.get_leaf_mut(right_id)
                .expect("right leaf vanished mid-redistribution")
                .accept_from_left(k, v);
            true
        } else if right_len >= left_len + 2 {
            let (k, v) = self
                .get_leaf_mut(right_id)
                .and_then(|r| r.borrow_first())
                .expect("surplus checked above");
            self.get_leaf_mut(left_id)
                .expect("left leaf vanished mid-redistribution")
                .accept_from_right(k, v);
            true
        } else {
            false
        }
    }

    /// After a leaf-level redistribution, the separator at `sep_index` in
    /// `parent_id` becomes the right leaf's new first key.
    fn fix_leaf_separator(&mut self, parent_id: NodeId, sep_index: usize) {
        let Some(parent) = self.get_branch(parent_id) else {
            return;
        };
        let NodeRef::Leaf(right_id, _) = parent.children[sep_index + 1] else {
            return;
        };
        let Some(new_key) = self.get_leaf(right_id).and_then(|l| l.first_key().cloned()) else {
            return;
        };
        self.get_branch_mut(parent_id).unwrap().keys[sep_index] = new_key;
    }

    fn redistribute_branches(
        &mut self,
        parent_id: NodeId,
        sep_index: usize,
        left_id: NodeId,
        right_id: NodeId,
    ) -> bool {
        let left_len = match self.get_branch(left_id) {
            Some(l) => l.len(),
            None => return false,
        };
        let right_len = match self.get_branch(right_id) {
            Some(r) => r.len(),
            None => return false,
        };

        if left_len >= right_len + 2 {
            let (moved_key, moved_child) = self
                .get_branch_mut(left_id)
                .and_then(|l| l.borrow_last())
                .expect("surplus checked above");
            let old_separator = self
                .get_branch(parent_id)
                .and_then(|p| p.keys.get(sep_index).cloned())
                .expect("separator index must be valid");
            let new_separator = self
                .get_branch_mut(right_id)
                .expect("right branch vanished mid-redistribution")
                .accept_from_left(old_separator, moved_key, moved_child);
            self.get_branch_mut(parent_id).unwrap().keys[sep_index] = new_separator;
            true
        } else if right_len >= left_len + 2 {
            let (moved_key, moved_child) = self
                .get_branch_mut(right_id)
                .and_then(|r| r.borrow_first())
                .expect("surplus checked above");
            let old_separator = self
                .get_branch(parent_id)
                .and_then(|p| p.keys.get(sep_index).cloned())
                .expect("separator index must be valid");
            let new_separator = self
                .get_branch_mut(left_id)
                .expect("left branch vanished mid-redistribution")
                .accept_from_right(old_separator, moved_key, moved_child);
            self.get_branch_mut(parent_id).unwrap().keys[sep_index] = new_separator;
            true
        } else {
            false
        }
    }

    /// Attempt to merge `right` into `left`, pulling the parent separator at
    /// `sep_index` down between them. Returns whether the merge happened.
    fn coalesce(
        &mut self,
        left: NodeRef<K, V>,
        right: NodeRef<K, V>,
        parent_id: NodeId,
        sep_index: usize,
    ) -> bool {
        match (left, right) {
            (NodeRef::Leaf(l, _), NodeRef::Leaf(r, _)) => {
                self.coalesce_leaves(l, r, parent_id, sep_index)
            }
            (NodeRef::Branch(l, _), NodeRef::Branch(r, _)) => {
                self.coalesce_branches(l, r, parent_id, sep_index)
            }
            _ => false,
        }
    }

    fn coalesce_leaves(
        &mut self,
        left_id: NodeId,
        right_id: NodeId,
        parent_id: NodeId,
        sep_index: usize,
    ) -> bool {
        let (left_len, right_len, capacity) = match (self.get_leaf(left_id), self.get_leaf(right_id)) {
            (Some(l), Some(r)) => (l.keys_len(), r.keys_len(), l.capacity),
            _ => return false,
        };
        if left_len + right_len > capacity {
            return false;
        }

        let mut right_owned = self
            .deallocate_leaf(right_id)
            .expect("right leaf must exist");
        let far_next = self
            .get_leaf_mut(left_id)
            .expect("left leaf vanished mid-coalesce")
            .merge_from(&mut right_owned);

        if far_next != NULL_NODE {
            if let Some(far) = self.get_leaf_mut(far_next) {
                far.prev = left_id;
            }
        }

        if let Some(parent) = self.get_branch_mut(parent_id) {
            parent.keys.remove(sep_index);
            parent.children.remove(sep_index + 1);
        }

        true
    }

    fn coalesce_branches(
        &mut self,
        left_id: NodeId,
        right_id: NodeId,
        parent_id: NodeId,
        sep_index: usize,
    ) -> bool {
        let (left_len, right_len, capacity) = match (self.get_branch(left_id), self.get_branch(right_id)) {
            (Some(l), Some(r)) => (l.len(), r.len(), l.capacity),
            _ => return false,
        };
        if left_len + 1 + right_len > capacity {
            return false;
        }

        let separator = self
            .get_branch(parent_id)
            .and_then(|p| p.keys.get(sep_index).cloned())
            .expect("separator index must be valid");

        let mut right_owned = self
            .deallocate_branch(right_id)
            .expect("right branch must exist");
        self.get_branch_mut(left_id)
            .expect("left branch vanished mid-coalesce")
            .merge_from(separator, &mut right_owned);

        if let Some(parent) = self.get_branch_mut(parent_id) {
            parent.keys.remove(sep_index);
            parent.children.remove(sep_index + 1);
        }

        true
    }

    /// If the root is a branch whose last separator was absorbed by
    /// coalescing, replace it with its sole remaining child, shrinking the
    /// tree's height by one level.
    fn collapse_root_if_needed(&mut self) {
        let NodeRef::Branch(root_id, _) = self.root else {
            return;
        };
        let Some(root) = self.get_branch(root_id) else {
            return;
        };
        if root.keys.is_empty() && root.children.len() == 1 {
            let only_child = root.children[0];
            self.deallocate_branch(root_id);
            self.root = only_child;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_missing_key_is_noop() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        tree.insert(1, "one");
        assert_eq!(tree.remove(&2), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn remove_from_root_leaf_never_rebalances() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        tree.insert(1, "one");
        tree.insert(2, "two");
        assert_eq!(tree.remove(&1), Some("one"));
        assert!(tree.is_leaf_root());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn insert_then_remove_everything_leaves_empty_tree() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..500 {
            tree.insert(i, i);
        }
        for i in 0..500 {
            assert_eq!(tree.remove(&i), Some(i));
            assert!(tree.check_invariants(), "invariants broken after removing {}", i);
        }
        assert!(tree.is_empty());
        assert!(tree.is_leaf_root());
    }

    #[test]
    fn remove_in_reverse_order_also_rebalances_cleanly() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..300 {
            tree.insert(i, i);
        }
        for i in (0..300).rev() {
            assert_eq!(tree.remove(&i), Some(i));
        }
        assert!(tree.is_empty());
        assert!(tree.check_invariants());
    }

    #[test]
    fn scattered_removal_preserves_ordering_of_survivors() {
        let mut tree = BPlusTreeMap::new(4).unwrap();
        for i in 0..100 {
            tree.insert(i, i);
        }
        for i in (0..100).step_by(2) {
            tree.remove(&i);
        }
        let keys: Vec<_> = tree.keys().cloned().collect();
        let expected: Vec<_> = (1..100).step_by(2).collect();
        assert_eq!(keys, expected);
        assert!(tree.check_invariants());
    }
}
